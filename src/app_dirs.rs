//! Where hotel-cancel keeps its config file and logs.
//!
//! Everything lives under one `.hotel_cancel` folder in the OS config
//! directory. `HOTEL_CANCEL_HOME` replaces the OS directory, which tests and
//! containerised runs use to keep state inside a scratch folder.

use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the base directory.
pub const APP_DIR_NAME: &str = ".hotel_cancel";
/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "HOTEL_CANCEL_HOME";

#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the override nor the OS config directory is available.
    #[error("No suitable base directory available for hotel-cancel files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.hotel_cancel` root, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Default location of the log files.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("logs"))
}

pub(crate) fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn base_dir() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_folders() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let created = ensure_dir(nested.clone()).unwrap();
        assert_eq!(created, nested);
        assert!(nested.is_dir());
    }
}
