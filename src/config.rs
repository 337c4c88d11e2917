//! `srctrl.toml` - defaults for the command line

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::name::NameDelimiter;

/// Database used when neither `--database` nor the config names one
pub const DEFAULT_DATABASE: &str = "project.srctrldb";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SrctrlConfig {
    /// Path of the `.srctrldb` file
    pub database: Option<String>,
    /// Delimiter for symbols recorded from the command line
    pub delimiter: Option<NameDelimiter>,
}

impl SrctrlConfig {
    /// Pick the database: explicit argument, then config, then the default
    pub fn resolve_database(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("srctrl.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SrctrlConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SrctrlConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SrctrlConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
