//! Placing the extracted binary under `{install_path}/bin`

use log::debug;
use std::io;
use std::path::{Path, PathBuf};

use crate::install::error::InstallError;

/// `{install_path}/bin`, created if missing
pub async fn ensure_bin_dir(install_path: &Path) -> Result<PathBuf, InstallError> {
    let bin_dir = install_path.join("bin");
    tokio::fs::create_dir_all(&bin_dir)
        .await
        .map_err(|e| InstallError::MoveFailed {
            from: install_path.to_path_buf(),
            to: bin_dir.clone(),
            reason: format!("cannot create bin directory: {e}"),
        })?;
    Ok(bin_dir)
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

/// Move the binary to `{bin_dir}/{command}` and mark it executable
pub async fn install_binary(
    source: &Path,
    bin_dir: &Path,
    command: &str,
) -> Result<PathBuf, InstallError> {
    let dest = bin_dir.join(command);
    let move_failed = |reason: String| InstallError::MoveFailed {
        from: source.to_path_buf(),
        to: dest.clone(),
        reason,
    };

    if !tokio::fs::try_exists(source).await.unwrap_or(false) {
        return Err(move_failed("binary not found in archive".to_string()));
    }

    match tokio::fs::rename(source, &dest).await {
        Ok(()) => {}
        Err(e) if is_cross_device(&e) => {
            debug!("Rename crosses filesystems, copying {}", source.display());
            tokio::fs::copy(source, &dest)
                .await
                .map_err(|e| move_failed(e.to_string()))?;
            tokio::fs::remove_file(source)
                .await
                .map_err(|e| move_failed(e.to_string()))?;
        }
        Err(e) => return Err(move_failed(e.to_string())),
    }

    set_executable(&dest).await.map_err(|e| move_failed(format!("cannot set permissions: {e}")))?;
    Ok(dest)
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binary_is_moved_and_executable() {
        let work = tempfile::tempdir().unwrap();
        let install = tempfile::tempdir().unwrap();
        let source = work.path().join("fd");
        std::fs::write(&source, b"bin").unwrap();

        let bin_dir = ensure_bin_dir(install.path()).await.unwrap();
        let dest = install_binary(&source, &bin_dir, "fd").await.unwrap();

        assert_eq!(dest, install.path().join("bin/fd"));
        assert!(!source.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn missing_binary_is_move_failure() {
        let work = tempfile::tempdir().unwrap();
        let install = tempfile::tempdir().unwrap();
        let bin_dir = ensure_bin_dir(install.path()).await.unwrap();

        let err = install_binary(&work.path().join("nope/fd"), &bin_dir, "fd")
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::MoveFailed { .. }));
        assert!(!bin_dir.join("fd").exists());
    }

    #[tokio::test]
    async fn bin_dir_creation_is_idempotent() {
        let install = tempfile::tempdir().unwrap();
        let first = ensure_bin_dir(install.path()).await.unwrap();
        let second = ensure_bin_dir(install.path()).await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }
}
