//! Config file persistence
//!
//! Reads and writes [`AppConfig`] as JSON. Writes go through a temp file and
//! a rename so a crash never leaves a half-written config behind.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::AppConfig;
use super::error::{ConfigError, ConfigResult};

/// Default config file name
pub const CONFIG_FILE: &str = "invoke-itself.json";

/// Write data atomically to a file
///
/// Creates a temporary file, writes the data, syncs, then renames.
pub fn write_atomic(path: &Path, data: &[u8]) -> ConfigResult<()> {
    let temp_path = path.with_extension("tmp");
    let failed = |detail: String| ConfigError::AtomicWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let mut file = File::create(&temp_path)
        .map_err(|e| failed(format!("create {:?}: {}", temp_path, e)))?;
    file.write_all(data).map_err(|e| failed(format!("write: {}", e)))?;
    file.sync_all().map_err(|e| failed(format!("sync: {}", e)))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| failed(format!("rename {:?}: {}", temp_path, e)))?;

    // Sync parent directory
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = OpenOptions::new().read(true).open(parent)?;
        dir.sync_all()?;
    }

    Ok(())
}

/// Write configuration to `path`, creating parent directories
pub fn write_config(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(config)?;
    write_atomic(path, &json)
}

/// Load configuration from `path`
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let config: AppConfig = serde_json::from_slice(&data)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path` if given, defaults otherwise
pub fn load_or_default(path: Option<&Path>) -> ConfigResult<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    }
}

/// Default config location in the working directory
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}
