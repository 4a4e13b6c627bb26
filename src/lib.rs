//! Installs a prebuilt `fd` release into a version manager's install directory.
//!
//! The host supplies an install type, a version and an install path. The
//! matching release archive for this machine is downloaded into a private
//! workspace, unpacked, and its binary lands at `{install_path}/bin/fd`.
//! Failures after the download starts remove the whole install path.

pub mod config;
pub mod install;

pub use config::InstallerConfig;
pub use install::{InstallError, InstallRequest, InstallType, InstalledBinary, Installer, Phase};
