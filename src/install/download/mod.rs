//! Release discovery, download and extraction
//!
//! ## Module Organization
//!
//! - `platform` - Host OS/CPU mapping to release target names
//! - `github` - Asset naming and GitHub release URLs
//! - `core` - Fetching archives over HTTP or from a local mirror
//! - `extract` - Unpacking `.tar.gz` and `.gz` assets

pub mod core;
pub mod extract;
pub mod github;
pub mod platform;

pub use self::core::{Fetch, ReleaseFetcher, verify_sha256};
pub use extract::extract_archive;
pub use github::{ArchiveRef, GitHubReleases, ResolveReleaseUrl, locate_archive};
pub use platform::{ArchTag, HostInfo, OsTag, Platform};
