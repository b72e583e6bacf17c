//! Path management for Taller configuration files.
//!
//! ```text
//! ~/.config/taller/            # Config directory (platform dependent)
//! └── config.toml              # Client configuration
//! ```

use std::path::PathBuf;

use taller_core::{Result, TallerError};

const APP_DIR: &str = "taller";
const CONFIG_FILE: &str = "config.toml";

pub struct TallerPaths;

impl TallerPaths {
    /// Returns the taller configuration directory.
    ///
    /// Uses the platform convention (XDG on Linux, `Application Support` on
    /// macOS, `AppData\Roaming` on Windows).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TallerError::config("Cannot find configuration directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
