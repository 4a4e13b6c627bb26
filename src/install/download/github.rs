//! Release asset naming and GitHub download URLs

use super::platform::Platform;

/// Turns a version and asset filename into a fetchable URL
pub trait ResolveReleaseUrl {
    fn resolve(&self, version: &str, filename: &str) -> String;
}

/// Tag-based GitHub release downloads: `{base}/{repo}/releases/download/v{version}/{filename}`
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    base_url: String,
    repo: String,
}

impl GitHubReleases {
    pub fn new(base_url: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            repo: repo.into(),
        }
    }
}

impl ResolveReleaseUrl for GitHubReleases {
    fn resolve(&self, version: &str, filename: &str) -> String {
        format!(
            "{}/{}/releases/download/v{}/{}",
            self.base_url.trim_end_matches('/'),
            self.repo.trim_matches('/'),
            version,
            filename
        )
    }
}

/// A located release archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRef {
    pub filename: String,
    pub url: String,
    /// Top-level directory the archive unpacks into
    pub root_dir: String,
}

/// Asset filename for `command` at `version` on `platform`, e.g. `fd-v10.1.0-x86_64-apple-darwin.tar.gz`
///
/// The version is used verbatim; a malformed one surfaces later as a failed download.
pub fn archive_filename(command: &str, version: &str, platform: &Platform, extension: &str) -> String {
    format!(
        "{}.{}",
        archive_root_dir(command, version, platform),
        extension.trim_start_matches('.')
    )
}

pub fn archive_root_dir(command: &str, version: &str, platform: &Platform) -> String {
    format!("{}-v{}-{}", command, version, platform.triple())
}

pub fn locate_archive(
    resolver: &impl ResolveReleaseUrl,
    command: &str,
    version: &str,
    platform: &Platform,
    extension: &str,
) -> ArchiveRef {
    let filename = archive_filename(command, version, platform, extension);
    let url = resolver.resolve(version, &filename);
    ArchiveRef {
        filename,
        url,
        root_dir: archive_root_dir(command, version, platform),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::download::platform::{ArchTag, OsTag};

    fn mac_intel() -> Platform {
        Platform {
            os: OsTag::AppleDarwin,
            arch: ArchTag::X86_64,
        }
    }

    #[test]
    fn filename_follows_release_layout() {
        assert_eq!(
            archive_filename("fd", "10.1.0", &mac_intel(), "tar.gz"),
            "fd-v10.1.0-x86_64-apple-darwin.tar.gz"
        );
    }

    #[test]
    fn extension_is_configurable() {
        assert_eq!(
            archive_filename("fd", "10.1.0", &mac_intel(), ".gz"),
            "fd-v10.1.0-x86_64-apple-darwin.gz"
        );
        assert_eq!(
            archive_root_dir("fd", "10.1.0", &mac_intel()),
            "fd-v10.1.0-x86_64-apple-darwin"
        );
    }

    #[test]
    fn github_url_is_keyed_on_v_tag() {
        let releases = GitHubReleases::new("https://github.com/", "sharkdp/fd");
        let archive = locate_archive(&releases, "fd", "10.1.0", &mac_intel(), "tar.gz");

        assert_eq!(
            archive.url,
            "https://github.com/sharkdp/fd/releases/download/v10.1.0/fd-v10.1.0-x86_64-apple-darwin.tar.gz"
        );
        assert_eq!(archive.root_dir, "fd-v10.1.0-x86_64-apple-darwin");
    }

    #[test]
    fn version_is_not_sanitized() {
        let linux_arm = Platform {
            os: OsTag::UnknownLinuxGnu,
            arch: ArchTag::Aarch64,
        };
        assert_eq!(
            archive_filename("fd", "not a version", &linux_arm, "tar.gz"),
            "fd-vnot a version-aarch64-unknown-linux-gnu.tar.gz"
        );
    }
}
