use thiserror::Error;

pub type Result<T> = std::result::Result<T, PinboardError>;

#[derive(Debug, Error)]
pub enum PinboardError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Checklist item text must not be empty")]
    EmptyChecklistText,

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Already at the boundary, nothing to move")]
    AtBoundary,

    #[error("No card is selected")]
    NoSelection,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PinboardError {
    /// True for errors that mean "the operation was a no-op" rather than a
    /// storage or configuration fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::EmptyChecklistText
                | Self::BoardNotFound(_)
                | Self::ListNotFound(_)
                | Self::CardNotFound(_)
                | Self::IndexOutOfRange { .. }
                | Self::AtBoundary
                | Self::NoSelection
                | Self::NoActiveDrag
        )
    }
}
