use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ChurnError, Result};

/// Save any artifact as pretty JSON, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a JSON artifact. Every failure is an `ArtifactLoadFailure` naming the path.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ChurnError::ArtifactLoadFailure(format!(
            "artifact file not found: {}",
            path.display()
        )));
    }

    let data = fs::read(path).map_err(|e| {
        ChurnError::ArtifactLoadFailure(format!("cannot read {}: {}", path.display(), e))
    })?;

    serde_json::from_slice(&data).map_err(|e| {
        ChurnError::ArtifactLoadFailure(format!("corrupt artifact {}: {}", path.display(), e))
    })
}
