use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::install::InstallError;
use crate::install::download::extract::ArchiveKind;

/// Environment variable overriding `download_base_url`
pub const MIRROR_ENV: &str = "FD_INSTALL_MIRROR";
/// Environment variable overriding `inactivity_timeout_secs`
pub const TIMEOUT_ENV: &str = "FD_INSTALL_TIMEOUT";

fn default_user_agent() -> String {
    format!("fd-install/{}", env!("CARGO_PKG_VERSION"))
}

/// Installer settings. Defaults install `fd` from its GitHub releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Tool name used in messages
    pub tool: String,
    /// Binary name inside the archive and under `bin/`
    pub command: String,
    /// GitHub `owner/name`
    pub repo: String,
    /// Release host; a `file://` URL points at a local mirror
    pub download_base_url: String,
    /// Asset container: `tar.gz`, `tgz` or a bare `gz` binary
    pub asset_extension: String,
    pub connect_timeout_secs: u64,
    pub inactivity_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tool: "fd".to_string(),
            command: "fd".to_string(),
            repo: "sharkdp/fd".to_string(),
            download_base_url: "https://github.com".to_string(),
            asset_extension: "tar.gz".to_string(),
            connect_timeout_secs: 30,
            inactivity_timeout_secs: 300,
            user_agent: default_user_agent(),
        }
    }
}

impl InstallerConfig {
    /// `<config dir>/fd-install/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fd-install").join("config.toml"))
    }

    pub fn from_toml(s: &str) -> Result<Self, InstallError> {
        let config: Self = toml::from_str(s).map_err(|e| InstallError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, InstallError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InstallError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents).map_err(|e| match e {
            InstallError::Config(msg) => InstallError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    fn validate(&self) -> Result<(), InstallError> {
        let sample_name = format!("asset.{}", self.asset_extension.trim_start_matches('.'));
        if ArchiveKind::from_filename(&sample_name).is_none() {
            return Err(InstallError::Config(format!(
                "unsupported asset_extension `{}` (expected tar.gz, tgz or gz)",
                self.asset_extension
            )));
        }
        if self.inactivity_timeout_secs == 0 {
            return Err(InstallError::Config(
                "inactivity_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from an explicit path, or from the default location when present
    ///
    /// An explicit path must exist; a missing default file just yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, InstallError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mirror) = lookup(MIRROR_ENV).filter(|s| !s.trim().is_empty()) {
            self.download_base_url = mirror;
        }
        match lookup(TIMEOUT_ENV).map(|s| s.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => self.inactivity_timeout_secs = secs,
            Some(_) => log::warn!("Ignoring invalid {TIMEOUT_ENV}"),
            None => {}
        }
    }
}
