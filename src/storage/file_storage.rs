use crate::{
    config::StorageConfig,
    domain::Board,
    error::Result,
    storage::{decode_boards, encode_boards, Storage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one JSON file per slot key
pub struct FileStorage {
    root_path: PathBuf,
    key: String,
}

impl FileStorage {
    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>, config: &StorageConfig) -> Self {
        Self {
            root_path: project_root.as_ref().join(&config.dir),
            key: config.key.clone(),
        }
    }

    /// FileStorage with the default directory and slot key
    pub fn with_defaults(project_root: impl AsRef<Path>) -> Self {
        Self::new(project_root, &StorageConfig::default())
    }

    pub fn slot_file(&self) -> PathBuf {
        self.root_path.join(format!("{}.json", self.key))
    }

    fn temp_file(&self) -> PathBuf {
        self.root_path.join(format!("{}.json.tmp", self.key))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn load_boards(&self) -> Result<Vec<Board>> {
        let slot = self.slot_file();

        if !slot.exists() {
            tracing::debug!(path = %slot.display(), "no saved boards");
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&slot).await?;
        decode_boards(&contents)
    }

    async fn save_boards(&self, boards: &[Board]) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = encode_boards(boards)?;
        // Write then rename so a crash never leaves a half-written slot.
        let temp = self.temp_file();
        fs::write(&temp, json).await?;
        fs::rename(&temp, self.slot_file()).await?;

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.slot_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::domain::IdGenerator;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_defaults(temp_dir.path());

        storage.initialize().await.unwrap();
        assert!(temp_dir.path().join(".pinboard").exists());
        assert!(!storage.is_initialized().await);

        storage.save_boards(&[]).await.unwrap();
        assert!(storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_boards_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_defaults(temp_dir.path());
        let mut ids = IdGenerator::new();
        let boards = vec![Board::seeded(&BoardConfig::default(), &mut ids)];

        storage.save_boards(&boards).await.unwrap();
        let loaded = storage.load_boards().await.unwrap();

        assert_eq!(loaded, boards);
        assert!(!storage.temp_file().exists());
    }

    #[tokio::test]
    async fn test_missing_slot_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_defaults(temp_dir.path());

        assert!(storage.load_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_defaults(temp_dir.path());
        storage.initialize().await.unwrap();
        std::fs::write(storage.slot_file(), "{ not json").unwrap();

        assert!(storage.load_boards().await.is_err());
    }

    #[tokio::test]
    async fn test_custom_slot_location() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            dir: "state".to_string(),
            key: "work".to_string(),
        };
        let storage = FileStorage::new(temp_dir.path(), &config);

        storage.save_boards(&[]).await.unwrap();
        assert!(temp_dir.path().join("state").join("work.json").exists());
    }
}
