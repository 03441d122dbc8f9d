//! State management for the deployed droplet
//!
//! Manages the `.tfstate` file which links the local configuration to the
//! remote droplet (`{"id": "...", "ip": "..."}`).

use crate::api::id_from_number_or_string;
use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_STATE_FILE: &str = ".tfstate";

/// Durable record of the created droplet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub ip: String,
}

impl PersistedState {
    pub fn new(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
        }
    }
}

/// State manager for reading/writing the state file
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl StateManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file written before the atomic rename
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from(DEFAULT_STATE_FILE));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the state
    pub async fn load(&self) -> Result<PersistedState> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.load_error(e.to_string()))?;
        let state: PersistedState =
            serde_json::from_str(&content).map_err(|e| self.load_error(e.to_string()))?;

        tracing::debug!("Loaded state for droplet {}", state.id);
        Ok(state)
    }

    /// Save the state (write to a temporary file, then rename)
    pub async fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
            tracing::debug!("Created state directory: {}", parent.display());
        }

        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&temp, content).await?;
        fs::rename(&temp, &self.path).await?;

        tracing::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    fn load_error(&self, reason: String) -> CloudError {
        CloudError::StateLoad {
            path: self.path.clone(),
            reason,
        }
    }
}
