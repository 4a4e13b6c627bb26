//! Archive extraction into the temporary workspace
//!
//! Handles `.tar.gz`/`.tgz` release archives and single-binary `.gz` assets.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::install::error::InstallError;

/// Archive container, chosen from the asset filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Gz,
}

impl ArchiveKind {
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".gz") {
            Some(ArchiveKind::Gz)
        } else {
            None
        }
    }
}

fn extraction_failed(archive: &Path, reason: impl ToString) -> InstallError {
    InstallError::ExtractionFailed {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unpack_tar_gz(archive: &Path, workspace: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(workspace)
}

/// A bare `.gz` holds the binary itself; place it where a tarball would have put it
fn gunzip_binary(archive: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut decoder = GzDecoder::new(File::open(archive)?);
    let mut out = File::create(dest)?;
    io::copy(&mut decoder, &mut out)?;
    out.sync_all()
}

/// Extract `archive` into `workspace`
///
/// Returns the path where `command` is expected afterwards:
/// `{workspace}/{root_dir}/{command}`.
pub async fn extract_archive(
    archive: &Path,
    workspace: &Path,
    root_dir: &str,
    command: &str,
) -> Result<PathBuf, InstallError> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = ArchiveKind::from_filename(&name)
        .ok_or_else(|| extraction_failed(archive, format!("unsupported file type: {name}")))?;

    let binary_path = workspace.join(root_dir).join(command);

    // tar and gzip decoding are blocking
    let archive_owned = archive.to_path_buf();
    let workspace_owned = workspace.to_path_buf();
    let binary_owned = binary_path.clone();
    let result = tokio::task::spawn_blocking(move || match kind {
        ArchiveKind::TarGz => unpack_tar_gz(&archive_owned, &workspace_owned),
        ArchiveKind::Gz => gunzip_binary(&archive_owned, &binary_owned),
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(binary_path),
        Ok(Err(e)) => Err(extraction_failed(archive, e)),
        Err(join) => Err(extraction_failed(archive, join)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Build a release-shaped tarball: `{root_dir}/{command}` plus a README
    pub(crate) fn write_release_tarball(path: &Path, root_dir: &str, command: &str, body: &[u8]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::fast()));

        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{root_dir}/{command}"), body)
            .unwrap();

        let readme = b"fd release\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(readme.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{root_dir}/README.md"), &readme[..])
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn kind_follows_extension() {
        assert_eq!(ArchiveKind::from_filename("fd-v1-x.tar.gz"), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_filename("fd.tgz"), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_filename("fd.gz"), Some(ArchiveKind::Gz));
        assert_eq!(ArchiveKind::from_filename("fd.zip"), None);
    }

    #[tokio::test]
    async fn tarball_unpacks_to_known_layout() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("fd-v10.1.0-x86_64-unknown-linux-gnu.tar.gz");
        write_release_tarball(&archive, "fd-v10.1.0-x86_64-unknown-linux-gnu", "fd", b"#!fd");

        let binary = extract_archive(
            &archive,
            work.path(),
            "fd-v10.1.0-x86_64-unknown-linux-gnu",
            "fd",
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(&binary).unwrap(), b"#!fd");
        assert!(work.path().join("fd-v10.1.0-x86_64-unknown-linux-gnu/README.md").exists());
    }

    #[tokio::test]
    async fn single_gz_lands_in_root_dir() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("fd-v1.0.0-aarch64-apple-darwin.gz");
        let mut enc = GzEncoder::new(File::create(&archive).unwrap(), Compression::fast());
        enc.write_all(b"binary").unwrap();
        enc.finish().unwrap();

        let binary = extract_archive(&archive, work.path(), "fd-v1.0.0-aarch64-apple-darwin", "fd")
            .await
            .unwrap();
        assert_eq!(binary, work.path().join("fd-v1.0.0-aarch64-apple-darwin/fd"));
        assert_eq!(std::fs::read(binary).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn corrupt_archive_is_extraction_failure() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("fd.tar.gz");
        std::fs::write(&archive, b"this is not gzip").unwrap();

        let err = extract_archive(&archive, work.path(), "fd", "fd").await.unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_is_extraction_failure() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("fd.zip");
        std::fs::write(&archive, b"PK").unwrap();

        let err = extract_archive(&archive, work.path(), "fd", "fd").await.unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }
}
