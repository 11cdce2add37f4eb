use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file is created next to the target so the final rename
/// stays on one filesystem. Readers see either the old or the new content.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Creates a directory tree, reporting failures as storage errors.
pub fn ensure_dir(path: &Path) -> Result<(), InfrastructureError> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| InfrastructureError::Storage {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively removes a directory tree, reporting failures as storage errors.
pub fn remove_tree(path: &Path) -> Result<(), InfrastructureError> {
    fs::remove_dir_all(path).map_err(|source| InfrastructureError::Storage {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    let content = serde_yaml::to_string(value)?;
    atomic_write(path, content)
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
