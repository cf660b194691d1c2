use crate::{domain::Board, error::Result};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;
pub mod persistence;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use persistence::PersistenceAdapter;

/// Storage trait for the single durable slot holding every board
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Loads all boards. An absent slot yields an empty collection; unreadable
    /// or malformed contents are reported as errors.
    async fn load_boards(&self) -> Result<Vec<Board>>;

    /// Replaces the slot with the given boards
    async fn save_boards(&self, boards: &[Board]) -> Result<()>;

    /// Checks whether the slot has been written at least once
    async fn is_initialized(&self) -> bool;
}

/// Serializes boards into the persisted JSON layout
pub fn encode_boards(boards: &[Board]) -> Result<String> {
    Ok(serde_json::to_string_pretty(boards)?)
}

/// Parses the persisted JSON layout. A literal `null` counts as empty.
pub fn decode_boards(contents: &str) -> Result<Vec<Board>> {
    let boards: Option<Vec<Board>> = serde_json::from_str(contents)?;
    Ok(boards.unwrap_or_default())
}
