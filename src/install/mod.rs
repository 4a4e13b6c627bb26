//! Release binary installation
//!
//! A run validates the request, maps the host onto release naming, downloads
//! the archive into a private workspace, unpacks it and moves the binary to
//! `{install_path}/bin`. Any failure after the workspace exists removes the
//! whole install path.

pub mod binary_staging;
pub mod download;
pub mod error;
pub mod runners;

pub use error::InstallError;
pub use runners::{InstalledBinary, Installer, Phase};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Requested installation mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallType {
    /// A tagged release
    Version,
    /// A source revision; never installable from prebuilt archives
    Ref,
}

impl FromStr for InstallType {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "version" => Ok(InstallType::Version),
            "ref" => Ok(InstallType::Ref),
            other => Err(InstallError::InvalidInstallType(other.to_string())),
        }
    }
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallType::Version => f.write_str("version"),
            InstallType::Ref => f.write_str("ref"),
        }
    }
}

/// One install invocation as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub install_type: String,
    pub version: String,
    pub install_path: PathBuf,
}

impl InstallRequest {
    pub fn new(
        install_type: impl Into<String>,
        version: impl Into<String>,
        install_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            install_type: install_type.into(),
            version: version.into(),
            install_path: install_path.into(),
        }
    }

    /// Only `version` installs pass
    pub fn validate(&self) -> Result<(), InstallError> {
        match self.install_type.parse::<InstallType>() {
            Ok(InstallType::Version) => Ok(()),
            _ => Err(InstallError::InvalidInstallType(self.install_type.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_version_installs_validate() {
        assert!(InstallRequest::new("version", "10.1.0", "/tmp/x").validate().is_ok());

        for kind in ["ref", "Version", "", "latest"] {
            let err = InstallRequest::new(kind, "10.1.0", "/tmp/x").validate().unwrap_err();
            assert!(matches!(err, InstallError::InvalidInstallType(ref s) if s == kind));
        }
    }

    #[test]
    fn install_type_round_trips_through_display() {
        assert_eq!("ref".parse::<InstallType>().unwrap().to_string(), "ref");
        assert!("tag".parse::<InstallType>().is_err());
    }
}
