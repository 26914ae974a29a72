use std::collections::HashMap;
use std::fmt;
use wanted_models::{RecordId, Service};

/// Buttons whose enablement and label the engine drives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlId {
    BulkPush(Service),
    BulkDelete,
    Push(Service, RecordId),
    Delete(RecordId),
    AssignExternal(RecordId),
    MergePreview,
    MergeCommit,
}

impl ControlId {
    pub fn idle_label(&self) -> &'static str {
        match self {
            ControlId::BulkPush(_) | ControlId::Push(..) => "Send",
            ControlId::BulkDelete | ControlId::Delete(_) => "Delete",
            ControlId::AssignExternal(_) => "Save",
            ControlId::MergePreview => "Merge",
            ControlId::MergeCommit => "Run merge",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            ControlId::BulkPush(_) | ControlId::Push(..) => "Sending...",
            ControlId::BulkDelete | ControlId::Delete(_) => "Deleting...",
            ControlId::AssignExternal(_) => "Saving...",
            ControlId::MergePreview => "Loading...",
            ControlId::MergeCommit => "Merging...",
        }
    }

    pub fn done_label(&self) -> &'static str {
        match self {
            ControlId::BulkPush(_) | ControlId::Push(..) => "Sent",
            ControlId::BulkDelete | ControlId::Delete(_) => "Deleted",
            ControlId::AssignExternal(_) => "Saved",
            ControlId::MergePreview => "Merge",
            ControlId::MergeCommit => "Done",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlId::BulkPush(service) => write!(f, "bulk {} push", service.as_str()),
            ControlId::BulkDelete => f.write_str("bulk delete"),
            ControlId::Push(service, id) => write!(f, "{} push for {}", service.as_str(), id),
            ControlId::Delete(id) => write!(f, "delete for {}", id),
            ControlId::AssignExternal(id) => write!(f, "external id for {}", id),
            ControlId::MergePreview => f.write_str("merge preview"),
            ControlId::MergeCommit => f.write_str("merge commit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: String,
    pub in_flight: bool,
}

impl ControlState {
    fn idle(id: &ControlId) -> Self {
        Self {
            enabled: true,
            label: id.idle_label().to_string(),
            in_flight: false,
        }
    }
}

/// Enablement and labels of every control the engine has touched.
///
/// Controls never seen before read as enabled with their idle label.
#[derive(Debug, Default)]
pub struct Controls {
    states: HashMap<ControlId, ControlState>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &ControlId) -> ControlState {
        self.states
            .get(id)
            .cloned()
            .unwrap_or_else(|| ControlState::idle(id))
    }

    pub fn is_enabled(&self, id: &ControlId) -> bool {
        self.state(id).enabled
    }

    pub fn is_in_flight(&self, id: &ControlId) -> bool {
        self.states.get(id).map(|s| s.in_flight).unwrap_or(false)
    }

    pub fn label(&self, id: &ControlId) -> String {
        self.state(id).label
    }

    /// Enablement derived from selection state; ignored while a request is in flight.
    pub fn set_enabled(&mut self, id: ControlId, enabled: bool) {
        let entry = self
            .states
            .entry(id.clone())
            .or_insert_with(|| ControlState::idle(&id));
        if !entry.in_flight {
            entry.enabled = enabled;
        }
    }

    /// Disable the control for a request. Returns `false` when one is already running.
    pub fn begin(&mut self, id: &ControlId) -> bool {
        let entry = self
            .states
            .entry(id.clone())
            .or_insert_with(|| ControlState::idle(id));
        if entry.in_flight {
            return false;
        }
        entry.in_flight = true;
        entry.enabled = false;
        entry.label = id.busy_label().to_string();
        true
    }

    /// Show the success label while the control stays disabled.
    pub fn confirm(&mut self, id: &ControlId) {
        if let Some(entry) = self.states.get_mut(id) {
            entry.label = id.done_label().to_string();
        }
    }

    /// Re-enable and restore the idle label, whatever the outcome was.
    pub fn finish(&mut self, id: &ControlId) {
        self.states.insert(id.clone(), ControlState::idle(id));
    }

    /// Drop per-record controls whose row no longer exists
    pub fn forget_record(&mut self, record: &RecordId) {
        self.states.retain(|id, _| match id {
            ControlId::Push(_, r) | ControlId::Delete(r) | ControlId::AssignExternal(r) => r != record,
            _ => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_control_is_idle() {
        let controls = Controls::new();
        let id = ControlId::BulkDelete;
        assert!(controls.is_enabled(&id));
        assert_eq!(controls.label(&id), "Delete");
        assert!(!controls.is_in_flight(&id));
    }

    #[test]
    fn test_begin_blocks_second_request() {
        let mut controls = Controls::new();
        let id = ControlId::BulkPush(Service::Radarr);
        assert!(controls.begin(&id));
        assert!(!controls.is_enabled(&id));
        assert_eq!(controls.label(&id), "Sending...");
        assert!(!controls.begin(&id));

        controls.confirm(&id);
        assert_eq!(controls.label(&id), "Sent");
        assert!(!controls.is_enabled(&id));

        controls.finish(&id);
        assert!(controls.is_enabled(&id));
        assert_eq!(controls.label(&id), "Send");
        assert!(controls.begin(&id));
    }

    #[test]
    fn test_set_enabled_ignored_while_in_flight() {
        let mut controls = Controls::new();
        let id = ControlId::MergeCommit;
        controls.begin(&id);
        controls.set_enabled(id.clone(), true);
        assert!(!controls.is_enabled(&id));

        controls.finish(&id);
        controls.set_enabled(id.clone(), false);
        assert!(!controls.is_enabled(&id));
    }

    #[test]
    fn test_forget_record_keeps_bulk_controls() {
        let mut controls = Controls::new();
        let record = RecordId::from("7");
        controls.begin(&ControlId::Delete(record.clone()));
        controls.begin(&ControlId::BulkDelete);
        controls.forget_record(&record);
        assert!(!controls.is_in_flight(&ControlId::Delete(record)));
        assert!(controls.is_in_flight(&ControlId::BulkDelete));
    }
}
