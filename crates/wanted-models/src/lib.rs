pub mod content;
pub mod merge;
pub mod push;
pub mod record;
pub mod serde_util;

pub use content::{WantedContent, WantedStats};
pub use merge::{ExcludedEntry, ExclusionReason, MergeCommitGroup, MergeGroup, MergeItem, MergePreview};
pub use push::{AssignOutcome, BulkPushResult, LookupCandidate, PushMode, PushOptions, PushStatus, QualityProfile, RootFolder, ServiceOptions};
pub use record::{DownloadState, ExternalIds, ExternalSource, MediaKind, RecordId, Service, ServicePaths, WantedRecord};
