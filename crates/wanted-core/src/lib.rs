pub mod capsule;
pub mod controller;
pub mod controls;
pub mod error;
pub mod filter;
pub mod grid;
pub mod memory_grid;
pub mod merge;
pub mod mutation;
pub mod notify;
pub mod pending;
pub mod selection;
pub mod settings;
pub mod snapshot;

pub use capsule::ReloadCapsule;
pub use controller::WantedController;
pub use controls::{ControlId, ControlState, Controls};
pub use error::{PreconditionError, WantedError};
pub use filter::{FilterComposer, FilterCriteria};
pub use grid::{DownloadMarker, GridEvent, GridRow, GridWidget, RowHandle, SortDirection, SortOrder};
pub use memory_grid::MemoryGrid;
pub use merge::{MergeState, MergeWorkflow};
pub use notify::{NoticeLevel, Notifier, TracingNotifier};
pub use pending::{PendingPoller, PendingRegistry, PollOutcome};
pub use selection::{BulkMode, BulkSummary, SelectionSet, ServiceEligibility};
pub use settings::EngineSettings;
pub use snapshot::RowSnapshotIndex;
