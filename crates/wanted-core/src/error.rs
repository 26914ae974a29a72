use crate::controls::ControlId;
use thiserror::Error;
use wanted_client::ApiError;
use wanted_models::{PushMode, RecordId, Service};

/// Local checks that stop an operation before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Selection has nothing eligible for {0}")]
    NothingEligible(Service),

    #[error("Selection mixes records to add and to update in {0}; narrow it to one kind")]
    MixedSelection(Service),

    #[error("{id} is not eligible to {} in {service}", .mode.as_str())]
    NotEligible {
        id: RecordId,
        service: Service,
        mode: PushMode,
    },

    #[error("Root folder and quality profile are required for {0}")]
    MissingPushOptions(Service),

    #[error("Merge preview has no groups to commit")]
    NoMergeGroups,

    #[error("No merge preview is open")]
    NoMergePreview,
}

#[derive(Debug, Error)]
pub enum WantedError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Unknown record: {0}")]
    UnknownRecord(RecordId),

    #[error("{0} already has a request in flight")]
    Busy(ControlId),
}

pub type Result<T> = std::result::Result<T, WantedError>;
