use clap::Parser;
use std::path::PathBuf;

/// Positional arguments follow the version manager's install contract
#[derive(Parser, Debug)]
#[command(name = "fd-install")]
#[command(version, about = "Install a prebuilt fd release into a version manager directory")]
pub struct Args {
    /// Install type; only `version` is supported
    pub install_type: String,

    /// Release version, without the leading `v` (e.g. 10.1.0)
    #[arg(id = "release_version", value_name = "VERSION")]
    pub version: String,

    /// Directory prepared by the host for this install
    pub install_path: PathBuf,

    /// Path to configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Release host override; `file://` URLs read from a local mirror
    #[arg(long)]
    pub mirror: Option<String>,

    /// Expected SHA-256 of the release archive (hex)
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,
}
