use crate::error::ApiError;
use async_trait::async_trait;
use wanted_models::{
    AssignOutcome, BulkPushResult, ExternalSource, LookupCandidate, MergeCommitGroup, MergePreview,
    PushMode, PushOptions, PushStatus, RecordId, Service, ServiceOptions, WantedContent,
};

/// Server endpoints the wanted list talks to.
///
/// Every call either succeeds or fails as a whole; callers never retry
/// automatically.
#[async_trait]
pub trait WantedApi: Send + Sync {
    /// Full, unfiltered list plus aggregate counters
    async fn fetch_content(&self) -> Result<WantedContent, ApiError>;

    async fn assign_external(
        &self,
        id: &RecordId,
        source: ExternalSource,
        external_id: &str,
        link: Option<&str>,
    ) -> Result<AssignOutcome, ApiError>;

    /// Catalog candidates for a record, optionally narrowed by a free-text query
    async fn lookup(
        &self,
        id: &RecordId,
        source: ExternalSource,
        query: Option<&str>,
    ) -> Result<Vec<LookupCandidate>, ApiError>;

    async fn push(
        &self,
        service: Service,
        mode: PushMode,
        id: &RecordId,
        options: &PushOptions,
    ) -> Result<PushStatus, ApiError>;

    async fn bulk_push(
        &self,
        service: Service,
        mode: PushMode,
        ids: &[RecordId],
        options: &PushOptions,
    ) -> Result<BulkPushResult, ApiError>;

    /// Returns whether the record existed
    async fn delete(&self, id: &RecordId) -> Result<bool, ApiError>;

    /// Returns how many records were deleted
    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<usize, ApiError>;

    async fn merge_preview(&self, ids: &[RecordId]) -> Result<MergePreview, ApiError>;

    /// Returns how many records were folded into survivors
    async fn merge_commit(&self, groups: &[MergeCommitGroup]) -> Result<usize, ApiError>;

    async fn service_options(&self, service: Service) -> Result<ServiceOptions, ApiError>;
}
