use std::path::{Path, PathBuf};

use crate::app_dirs;
use crate::fs_ops::atomic_write;

use super::{ConfigError, PipelineConfig};

/// File name of the default config inside the application directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config location, `.hotel_cancel/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(|error| match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    })?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Read and validate a config file that must exist.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PipelineConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load `explicit` when given; otherwise the default location, falling back
/// to built-in defaults when that file does not exist.
pub fn load_or_default(explicit: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = config_path()?;
    if path.exists() {
        load_config(&path)
    } else {
        tracing::debug!("No config at {}; using defaults", path.display());
        Ok(PipelineConfig::default())
    }
}

/// Write `config` as TOML, replacing `path` atomically.
pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
