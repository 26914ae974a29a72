use crate::record::{RecordId, Service};
use serde::{Deserialize, Serialize};

/// Parameters for pushing records to a downstream service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushOptions {
    pub root_folder: String,
    pub profile_id: u32,
    #[serde(default)]
    pub enable_search: bool,
    /// Series only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_specials: Option<bool>,
}

impl PushOptions {
    pub fn new(root_folder: impl Into<String>, profile_id: u32) -> Self {
        Self {
            root_folder: root_folder.into(),
            profile_id,
            enable_search: false,
            monitor_specials: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.root_folder.trim().is_empty() && self.profile_id > 0
    }
}

/// Whether a push creates the record downstream or refreshes an existing one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    Add,
    Update,
}

impl PushMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushMode::Add => "add",
            PushMode::Update => "update",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    Added,
    /// Already present downstream; nothing was sent
    Exists,
    Updated,
}

/// Outcome of a bulk push, per id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkPushResult {
    #[serde(default)]
    pub added: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub added_ids: Vec<RecordId>,
    #[serde(default)]
    pub skipped_ids: Vec<RecordId>,
    #[serde(default)]
    pub error_ids: Vec<RecordId>,
}

impl BulkPushResult {
    /// Ids the server either pushed or found already present
    pub fn touched_ids(&self) -> Vec<RecordId> {
        self.added_ids
            .iter()
            .chain(self.skipped_ids.iter())
            .cloned()
            .collect()
    }
}

/// Response of an external id assignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignOutcome {
    #[serde(default)]
    pub in_radarr: bool,
    #[serde(default)]
    pub in_sonarr: bool,
}

impl AssignOutcome {
    pub fn present_in(&self, service: Service) -> bool {
        match service {
            Service::Radarr => self.in_radarr,
            Service::Sonarr => self.in_sonarr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootFolder {
    pub path: String,
    #[serde(default, rename = "freeSpace", alias = "free_space")]
    pub free_space: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityProfile {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

/// Root folders and quality profiles a service accepts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceOptions {
    #[serde(default)]
    pub root_folders: Vec<RootFolder>,
    #[serde(default)]
    pub profiles: Vec<QualityProfile>,
}

impl ServiceOptions {
    pub fn has_root(&self, path: &str) -> bool {
        self.root_folders.iter().any(|r| r.path == path)
    }

    pub fn has_profile(&self, id: u32) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }
}

/// A catalog match offered when assigning an external id by hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupCandidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(deserialize_with = "crate::serde_util::string_or_number")]
    pub external_id: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl LookupCandidate {
    pub fn display_title(&self) -> String {
        let title = self.title.as_deref().unwrap_or("Untitled");
        match self.year {
            Some(year) => format!("{} ({})", title, year),
            None => title.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_result_touched_ids() {
        let result: BulkPushResult = serde_json::from_str(
            r#"{"ok": true, "added": 2, "skipped": 1, "errors": 1,
                "added_ids": [1, 2], "skipped_ids": [3], "error_ids": [4]}"#,
        )
        .unwrap();
        assert_eq!(
            result.touched_ids(),
            vec![RecordId::from("1"), RecordId::from("2"), RecordId::from("3")]
        );
    }

    #[test]
    fn test_push_options_serialization_skips_specials() {
        let options = PushOptions::new("/data/movies", 4);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["root_folder"], "/data/movies");
        assert!(json.get("monitor_specials").is_none());
        assert!(options.is_complete());
        assert!(!PushOptions::new(" ", 4).is_complete());
    }

    #[test]
    fn test_lookup_candidate_display() {
        let candidate: LookupCandidate =
            serde_json::from_str(r#"{"title": "Heat", "year": 1995, "external_id": 949}"#).unwrap();
        assert_eq!(candidate.external_id, "949");
        assert_eq!(candidate.display_title(), "Heat (1995)");
    }
}
