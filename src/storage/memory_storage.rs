use crate::{
    domain::Board,
    error::{PinboardError, Result},
    storage::{decode_boards, encode_boards, Storage},
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Mutex;

/// In-process slot holding the serialized boards.
///
/// Clones share the same slot, so a test can keep a handle while the store
/// owns another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with raw slot contents, which need not be valid JSON
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
            ..Self::default()
        }
    }

    /// Raw slot contents
    pub async fn contents(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every following write fail, as a full or disabled store would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn load_boards(&self) -> Result<Vec<Board>> {
        match self.slot.lock().await.as_deref() {
            Some(contents) => decode_boards(contents),
            None => Ok(Vec::new()),
        }
    }

    async fn save_boards(&self, boards: &[Board]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PinboardError::StorageError(
                "storage quota exceeded".to_string(),
            ));
        }
        let json = encode_boards(boards)?;
        *self.slot.lock().await = Some(json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_slot() {
        let storage = MemoryStorage::new();
        assert!(!storage.is_initialized().await);
        assert!(storage.load_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_slot() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.save_boards(&[]).await.unwrap();
        assert!(handle.is_initialized().await);
        assert_eq!(handle.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_writes_keep_previous_contents() {
        let storage = MemoryStorage::with_contents("[]");
        storage.set_fail_writes(true);

        assert!(storage.save_boards(&[]).await.is_err());
        assert_eq!(storage.contents().await.as_deref(), Some("[]"));
        assert_eq!(storage.write_count(), 0);
    }
}
