use crate::error::{PinboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Settings for the board created when no saved state exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub title: String,
    pub lists: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            title: "My Board".to_string(),
            lists: vec!["To Do".to_string(), "Doing".to_string(), "Done".to_string()],
        }
    }
}

/// Location of the durable slot, relative to a project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".pinboard".to_string(),
            key: "pinboard_boards".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub board: BoardConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub const FILE_NAME: &'static str = "pinboard.toml";

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| PinboardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML config file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()).await {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.as_ref().display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.board.title.trim().is_empty() {
            return Err(PinboardError::ConfigError(
                "board.title must not be empty".to_string(),
            ));
        }
        if self.board.lists.iter().any(|title| title.trim().is_empty()) {
            return Err(PinboardError::ConfigError(
                "board.lists must not contain empty titles".to_string(),
            ));
        }
        if self.storage.key.trim().is_empty() {
            return Err(PinboardError::ConfigError(
                "storage.key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.board.title, "My Board");
        assert_eq!(config.board.lists, vec!["To Do", "Doing", "Done"]);
        assert_eq!(config.storage.key, "pinboard_boards");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [board]
            title = "Sprint"
            "#,
        )
        .unwrap();

        assert_eq!(config.board.title, "Sprint");
        assert_eq!(config.board.lists.len(), 3);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("board = 3"),
            Err(PinboardError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[board]\nlists = [\"ok\", \" \"]"),
            Err(PinboardError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[storage]\nkey = \"\""),
            Err(PinboardError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path().join(Config::FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(Config::FILE_NAME);
        std::fs::write(&path, "[storage]\ndir = \"state\"\nkey = \"boards\"\n").unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.storage.dir, "state");
        assert_eq!(config.storage.key, "boards");
    }
}
