use crate::error::PreconditionError;
use wanted_models::{MergeCommitGroup, MergePreview, RecordId};

/// Where the merge dialog stands
#[derive(Debug, Clone, PartialEq)]
pub enum MergeState {
    Idle,
    PreviewRequested { ids: Vec<RecordId> },
    PreviewShown(MergePreview),
    CommitRequested(MergePreview),
    Committed { merged: usize, removed: Vec<RecordId> },
    /// A request failed. A preview that was on screen stays committable.
    Failed { preview: Option<MergePreview>, message: String },
}

/// Preview/commit state machine for merging duplicate records.
///
/// Commit is only reachable from a shown preview (or a failed commit of one)
/// that has at least one group.
#[derive(Debug)]
pub struct MergeWorkflow {
    state: MergeState,
}

impl Default for MergeWorkflow {
    fn default() -> Self {
        Self { state: MergeState::Idle }
    }
}

impl MergeWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MergeState {
        &self.state
    }

    pub fn preview(&self) -> Option<&MergePreview> {
        match &self.state {
            MergeState::PreviewShown(preview) | MergeState::CommitRequested(preview) => Some(preview),
            MergeState::Failed { preview, .. } => preview.as_ref(),
            _ => None,
        }
    }

    pub fn can_commit(&self) -> bool {
        match &self.state {
            MergeState::PreviewShown(preview) => preview.has_groups(),
            MergeState::Failed { preview: Some(preview), .. } => preview.has_groups(),
            _ => false,
        }
    }

    pub fn request_preview(&mut self, ids: Vec<RecordId>) -> Result<(), PreconditionError> {
        if ids.is_empty() {
            return Err(PreconditionError::EmptySelection);
        }
        self.state = MergeState::PreviewRequested { ids };
        Ok(())
    }

    pub fn preview_loaded(&mut self, preview: MergePreview) {
        self.state = MergeState::PreviewShown(preview);
    }

    pub fn preview_failed(&mut self, message: impl Into<String>) {
        self.state = MergeState::Failed {
            preview: None,
            message: message.into(),
        };
    }

    /// Move to `CommitRequested` and hand back the payload to send
    pub fn begin_commit(&mut self) -> Result<Vec<MergeCommitGroup>, PreconditionError> {
        let preview = match &self.state {
            MergeState::PreviewShown(preview) => preview.clone(),
            MergeState::Failed { preview: Some(preview), .. } => preview.clone(),
            _ => return Err(PreconditionError::NoMergePreview),
        };
        if !preview.has_groups() {
            return Err(PreconditionError::NoMergeGroups);
        }
        let groups = preview.commit_groups();
        self.state = MergeState::CommitRequested(preview);
        Ok(groups)
    }

    /// Returns the ids folded into survivors
    pub fn commit_succeeded(&mut self, merged: usize) -> Vec<RecordId> {
        let removed = self
            .preview()
            .map(MergePreview::merged_away_ids)
            .unwrap_or_default();
        self.state = MergeState::Committed {
            merged,
            removed: removed.clone(),
        };
        removed
    }

    pub fn commit_failed(&mut self, message: impl Into<String>) {
        let preview = self.preview().cloned();
        self.state = MergeState::Failed {
            preview,
            message: message.into(),
        };
    }

    /// Dialog closed
    pub fn reset(&mut self) {
        self.state = MergeState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wanted_models::{ExternalSource, MergeGroup, MergeItem};

    fn item(id: &str) -> MergeItem {
        MergeItem {
            id: id.into(),
            title: format!("Item {}", id),
            year: None,
            media_type: None,
            category: None,
            source: None,
            external_id: None,
        }
    }

    fn preview_with_group() -> MergePreview {
        MergePreview {
            merge_groups: vec![MergeGroup {
                source: ExternalSource::Tmdb,
                external_id: "603".to_string(),
                keep_id: "1".into(),
                items: vec![item("1"), item("2"), item("3")],
            }],
            singletons: vec![item("4")],
            excluded: Vec::new(),
        }
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut workflow = MergeWorkflow::new();
        assert_eq!(workflow.request_preview(Vec::new()), Err(PreconditionError::EmptySelection));
        assert_eq!(workflow.state(), &MergeState::Idle);
    }

    #[test]
    fn test_commit_unreachable_without_groups() {
        let mut workflow = MergeWorkflow::new();
        assert_eq!(workflow.begin_commit(), Err(PreconditionError::NoMergePreview));

        workflow.request_preview(vec!["4".into()]).unwrap();
        workflow.preview_loaded(MergePreview {
            singletons: vec![item("4")],
            ..MergePreview::default()
        });
        assert!(!workflow.can_commit());
        assert_eq!(workflow.begin_commit(), Err(PreconditionError::NoMergeGroups));
    }

    #[test]
    fn test_commit_flow() {
        let mut workflow = MergeWorkflow::new();
        workflow.request_preview(vec!["1".into(), "2".into(), "3".into(), "4".into()]).unwrap();
        workflow.preview_loaded(preview_with_group());
        assert!(workflow.can_commit());

        let groups = workflow.begin_commit().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep_id, RecordId::from("1"));
        assert!(!workflow.can_commit());

        let removed = workflow.commit_succeeded(2);
        assert_eq!(removed, vec![RecordId::from("2"), RecordId::from("3")]);
        assert!(matches!(workflow.state(), MergeState::Committed { merged: 2, .. }));
    }

    #[test]
    fn test_failed_commit_can_retry() {
        let mut workflow = MergeWorkflow::new();
        workflow.request_preview(vec!["1".into()]).unwrap();
        workflow.preview_loaded(preview_with_group());
        workflow.begin_commit().unwrap();
        workflow.commit_failed("server error");
        assert!(workflow.can_commit());
        assert!(workflow.begin_commit().is_ok());

        workflow.reset();
        assert!(workflow.preview().is_none());
    }
}
