use crate::record::{ExternalSource, MediaKind, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A record as listed in a merge preview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeItem {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub media_type: Option<MediaKind>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<ExternalSource>,
    #[serde(default, deserialize_with = "crate::serde_util::opt_string_or_number")]
    pub external_id: Option<String>,
}

/// Records sharing one matched external id, folded into `keep_id` on commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeGroup {
    pub source: ExternalSource,
    #[serde(deserialize_with = "crate::serde_util::string_or_number")]
    pub external_id: String,
    pub keep_id: RecordId,
    pub items: Vec<MergeItem>,
}

impl MergeGroup {
    /// Members other than the survivor
    pub fn merge_ids(&self) -> Vec<RecordId> {
        self.items
            .iter()
            .map(|item| item.id.clone())
            .filter(|id| *id != self.keep_id)
            .collect()
    }

    pub fn to_commit(&self) -> MergeCommitGroup {
        MergeCommitGroup {
            keep_id: self.keep_id.clone(),
            merge_ids: self.merge_ids(),
        }
    }
}

/// Why the server left a record out of the merge preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExclusionReason {
    InvalidId,
    NotFound,
    /// The record lacks the external id its kind/category is matched on
    MissingExternal(ExternalSource),
    Other(String),
}

impl ExclusionReason {
    pub fn code(&self) -> String {
        match self {
            ExclusionReason::InvalidId => "invalid_id".to_string(),
            ExclusionReason::NotFound => "not_found".to_string(),
            ExclusionReason::MissingExternal(source) => format!("missing_{}", source.as_str()),
            ExclusionReason::Other(code) => code.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ExclusionReason::InvalidId => "Invalid id".to_string(),
            ExclusionReason::NotFound => "Record not found".to_string(),
            ExclusionReason::MissingExternal(source) => {
                format!("Missing {} id", source.as_str().to_uppercase())
            }
            ExclusionReason::Other(code) if code.is_empty() => "Excluded".to_string(),
            ExclusionReason::Other(code) => code.clone(),
        }
    }
}

impl From<String> for ExclusionReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "invalid_id" => ExclusionReason::InvalidId,
            "not_found" => ExclusionReason::NotFound,
            other => match other.strip_prefix("missing_").map(str::parse::<ExternalSource>) {
                Some(Ok(source)) => ExclusionReason::MissingExternal(source),
                _ => ExclusionReason::Other(value),
            },
        }
    }
}

impl From<ExclusionReason> for String {
    fn from(value: ExclusionReason) -> Self {
        value.code()
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcludedEntry {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    pub reason: ExclusionReason,
}

/// Server-side classification of a selection into duplicates, loners and rejects
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MergePreview {
    #[serde(default)]
    pub merge_groups: Vec<MergeGroup>,
    #[serde(default)]
    pub singletons: Vec<MergeItem>,
    #[serde(default)]
    pub excluded: Vec<ExcludedEntry>,
}

impl MergePreview {
    pub fn has_groups(&self) -> bool {
        !self.merge_groups.is_empty()
    }

    pub fn commit_groups(&self) -> Vec<MergeCommitGroup> {
        self.merge_groups.iter().map(MergeGroup::to_commit).collect()
    }

    /// Every non-survivor id across all groups
    pub fn merged_away_ids(&self) -> Vec<RecordId> {
        self.merge_groups.iter().flat_map(MergeGroup::merge_ids).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Groups: {} · No match: {} · Excluded: {}",
            self.merge_groups.len(),
            self.singletons.len(),
            self.excluded.len()
        )
    }
}

/// Commit payload for one group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeCommitGroup {
    pub keep_id: RecordId,
    pub merge_ids: Vec<RecordId>,
}
