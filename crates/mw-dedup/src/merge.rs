//! Merge callbacks from the UI: which record of a group to keep.

use crate::pipeline::{DuplicateGroup, DuplicateReport};
use mw_core::{MwError, Record, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeAction {
    pub keep_id: String,
    pub delete_ids: Vec<String>,
}

impl MergeAction {
    pub fn new(keep_id: impl Into<String>, delete_ids: Vec<String>) -> Self {
        Self { keep_id: keep_id.into(), delete_ids }
    }

    /// Keep the earliest-created member; ties go to the first listed.
    pub fn keep_oldest(group: &DuplicateGroup, records: &[Record]) -> Option<Self> {
        let keep = group
            .members
            .iter()
            .filter_map(|id| records.iter().find(|r| &r.id == id))
            .min_by_key(|r| r.created_at)?;
        let delete_ids = group.members.iter().filter(|m| **m != keep.id).cloned().collect();
        Some(Self::new(keep.id.clone(), delete_ids))
    }
}

impl DuplicateReport {
    /// Check that `action` only references members of group `group_id`.
    pub fn validate_merge(&self, group_id: &str, action: &MergeAction) -> Result<()> {
        let group = self
            .group(group_id)
            .ok_or_else(|| MwError::UnknownGroup { id: group_id.to_string() })?;
        if !group.contains(&action.keep_id) {
            return Err(MwError::InvalidMerge(format!("{} is not in group {group_id}", action.keep_id)));
        }
        if action.delete_ids.is_empty() {
            return Err(MwError::InvalidMerge("nothing to delete".into()));
        }
        let mut seen = HashSet::new();
        for id in &action.delete_ids {
            if id == &action.keep_id {
                return Err(MwError::InvalidMerge(format!("{id} is both kept and deleted")));
            }
            if !group.contains(id) {
                return Err(MwError::InvalidMerge(format!("{id} is not in group {group_id}")));
            }
            if !seen.insert(id.as_str()) {
                return Err(MwError::InvalidMerge(format!("{id} listed twice")));
            }
        }
        Ok(())
    }
}
