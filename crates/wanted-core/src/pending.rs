use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use wanted_models::{DownloadState, RecordId};

/// Ids pushed to a service whose download status is not known yet.
///
/// The attempt counter restarts whenever the registry goes from empty to
/// non-empty.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    ids: HashSet<RecordId>,
    attempts: u32,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RecordId) -> bool {
        if self.ids.is_empty() {
            self.attempts = 0;
        }
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn record_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Drop ids whose status is now known or whose record is gone.
    ///
    /// `status` returns `None` for ids absent from the current list.
    pub fn resolve(&mut self, status: impl Fn(&RecordId) -> Option<DownloadState>) -> Vec<RecordId> {
        let resolved: Vec<RecordId> = self
            .ids()
            .into_iter()
            .filter(|id| status(id).map(|state| state.is_known()).unwrap_or(true))
            .collect();
        for id in &resolved {
            self.ids.remove(id);
        }
        resolved
    }

    /// Give up on every remaining id
    pub fn drain(&mut self) -> Vec<RecordId> {
        let ids = self.ids();
        self.ids.clear();
        ids
    }
}

/// Result of one timer firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing was pending; no reload happened
    Idle,
    /// Reloaded; `remaining` ids are still pending and another reload is scheduled
    Rescheduled { resolved: Vec<RecordId>, remaining: usize },
    /// Every pending id resolved
    Settled { resolved: Vec<RecordId> },
    /// Attempt ceiling reached; `abandoned` ids fall back to the placeholder
    GaveUp { resolved: Vec<RecordId>, abandoned: Vec<RecordId> },
}

/// Pending registry plus the single-slot timer driving its reloads
#[derive(Debug)]
pub struct PendingPoller {
    pub registry: PendingRegistry,
    max_attempts: u32,
    deadline: Option<Instant>,
    delay: Duration,
}

impl PendingPoller {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            registry: PendingRegistry::new(),
            max_attempts: max_attempts.max(1),
            deadline: None,
            delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Arm the timer, replacing any reload already scheduled
    pub fn schedule(&mut self, delay: Duration) {
        if self.deadline.is_some() {
            debug!("Replacing scheduled pending reload");
        }
        self.deadline = Some(Instant::now() + delay);
        self.delay = delay;
    }

    /// Re-arm with the delay of the last schedule
    pub fn reschedule(&mut self) {
        self.schedule(self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the attempt just recorded reached the ceiling
    pub fn exhausted(&self) -> bool {
        self.registry.attempts() >= self.max_attempts
    }
}
