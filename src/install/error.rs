//! Installer error taxonomy
//!
//! Every variant is terminal for the process. Errors raised before the
//! temporary workspace exists come back as-is; everything after that point is
//! wrapped in [`InstallError::InstallFailed`] once the install path has been
//! rolled back.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while installing a release binary
#[derive(Debug, Error)]
pub enum InstallError {
    /// Only tagged releases can be installed from prebuilt archives
    #[error("install type `{0}` is not supported, only `version` installs are available")]
    InvalidInstallType(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("could not download {tool} {version} from {url}: {reason}")]
    DownloadFailed {
        tool: String,
        version: String,
        url: String,
        reason: String,
    },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("could not extract {}: {reason}", archive.display())]
    ExtractionFailed { archive: PathBuf, reason: String },

    #[error("could not move {} to {}: {reason}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Catch-all for anything that failed after the workspace was created
    #[error("an error occurred while installing {tool} {version}")]
    InstallFailed {
        tool: String,
        version: String,
        #[source]
        source: Box<InstallError>,
    },
}

impl InstallError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Innermost error, unwrapping any `InstallFailed` layers
    pub fn root(&self) -> &InstallError {
        match self {
            InstallError::InstallFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
