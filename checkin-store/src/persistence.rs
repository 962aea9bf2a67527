//! File persistence helpers.
//!
//! Handles loading and saving YAML documents with atomic, owner-only writes.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets restrictive file permissions (0o600) on Unix systems.
///
/// The credential document holds live tokens.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Creates missing parent directories.
async fn create_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(path = %parent.display(), "Creating directory");
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Saves data to a YAML file.
///
/// Writes to a sibling temp file first and renames it into place, so a
/// reader never sees a half-written document.
pub async fn save_yaml<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving YAML file");

    create_parent_dirs(path).await?;

    let yaml = serde_yaml::to_string(data)?;

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, &yaml).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "YAML file saved");
    Ok(())
}

/// Loads data from a YAML file.
pub async fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading YAML file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_yaml::from_str(&content)?;

    debug!(path = %path.display(), "YAML file loaded");
    Ok(data)
}

/// Loads data from a YAML file, returning the default if the file is missing
/// or empty.
///
/// Unlike a missing file, a document that fails to parse is an error: it is
/// about to be overwritten and its contents would be lost.
pub async fn load_yaml_or_default<T: DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "File not found, using defaults");
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    Ok(serde_yaml::from_str(&content)?)
}

/// Returns the temp path used while writing `path`.
pub(crate) fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_temp_path_sits_next_to_target() {
        let path = PathBuf::from("/data/config.yaml");
        assert_eq!(temp_path_for(&path), PathBuf::from("/data/config.yaml.tmp"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("config.yaml");

        save_yaml(&test_file, &serde_yaml::Value::Null).await.unwrap();

        let metadata = tokio::fs::metadata(&test_file).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
    }
}
