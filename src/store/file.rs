//! Reading and atomically rewriting the JSON user file.

use crate::error::{AppError, AppResult};
use crate::models::User;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read the user collection at `path`.
///
/// A missing or blank file is an empty collection; anything else that fails to
/// parse is a storage error.
pub async fn read_users(path: &Path) -> AppResult<Vec<User>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "user file absent, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(|e| {
        AppError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Replace the file at `path` with `users`.
///
/// Writes to a sibling `.tmp` file first and renames it over the target.
pub async fn write_users(path: &Path, users: &[User]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let json = serde_json::to_string_pretty(users)
        .map_err(|e| AppError::Storage(format!("Failed to serialize users: {}", e)))?;

    let tmp_path = path.with_extension("json.tmp");
    if let Err(e) = tokio::fs::write(&tmp_path, json).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(AppError::Storage(format!(
            "Failed to write {}: {}",
            tmp_path.display(),
            e
        )));
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(AppError::Storage(format!(
            "Failed to rename {} to {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )));
    }

    debug!(path = %path.display(), count = users.len(), "user file written");
    Ok(())
}
