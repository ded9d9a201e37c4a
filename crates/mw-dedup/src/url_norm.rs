//! URL canonicalization for duplicate matching.

use url::Url;

const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "yclid", "mc_cid", "mc_eid", "igshid", "ref_src",
    "_ga", "_hsenc", "_hsmi",
];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Canonical form used for exact-URL matching: no scheme, no leading `www.`,
/// no fragment, no tracking parameters, no trailing slash, lowercase.
///
/// Strings that do not parse as absolute URLs go through the same steps
/// textually, so they still take part in exact matching.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    match parse_absolute(raw) {
        Some(url) => normalize_parsed(&url),
        None => normalize_text(raw),
    }
}

/// Hostname without a leading `www.`; `None` when `raw` is not an absolute
/// URL with a host.
pub fn hostname(raw: &str) -> Option<String> {
    let url = parse_absolute(raw.trim())?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

fn parse_absolute(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    match url.host_str() {
        Some(h) if !h.is_empty() => Some(url),
        _ => None,
    }
}

fn normalize_parsed(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let mut out = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path().trim_end_matches('/'));
    let query = strip_tracking(url.query().unwrap_or(""));
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }
    out.trim_end_matches('/').to_lowercase()
}

fn normalize_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let no_scheme = match lowered.find("://") {
        Some(pos) => &lowered[pos + 3..],
        None => lowered.as_str(),
    };
    let no_www = no_scheme.strip_prefix("www.").unwrap_or(no_scheme);
    let no_fragment = no_www.split('#').next().unwrap_or_default();
    let (path, query) = match no_fragment.split_once('?') {
        Some((p, q)) => (p, strip_tracking(q)),
        None => (no_fragment, String::new()),
    };
    let mut out = path.trim_end_matches('/').to_string();
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }
    out.trim_end_matches('/').to_string()
}

fn strip_tracking(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !is_tracking_param(key)
        })
        .collect::<Vec<_>>()
        .join("&")
}
