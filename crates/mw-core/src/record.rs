use crate::error::{MwError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A bookmark or note as handed over by the storage collaborator.
///
/// Records are read-only input: nothing in this workspace mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: None,
            tags: BTreeSet::new(),
            created_at: 0,
            description: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, millis: i64) -> Self {
        self.created_at = millis;
        self
    }

    /// Non-empty URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Parse a JSON array of records, rejecting empty or repeated ids.
pub fn load_records(json: &str) -> Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if record.id.is_empty() {
            return Err(MwError::InvalidRecord("record with empty id".into()));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(MwError::InvalidRecord(format!("duplicate record id: {}", record.id)));
        }
    }
    tracing::debug!(count = records.len(), "loaded records");
    Ok(records)
}
