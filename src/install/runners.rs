//! Install controller with all-or-nothing rollback, plus terminal reporting
//!
//! States run `Validating → Resolving → Downloading → Extracting → Installing`
//! and end in `Success` or `RolledBack`. Only failures after the workspace has
//! been created trigger a rollback; earlier ones leave the filesystem alone.

use log::{debug, info, warn};
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::binary_staging;
use super::download::{
    self, ArchiveRef, Fetch, GitHubReleases, HostInfo, Platform, ReleaseFetcher,
    ResolveReleaseUrl,
};
use super::error::InstallError;
use super::InstallRequest;
use crate::config::InstallerConfig;

/// Controller states reported to the phase observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Resolving,
    Downloading { url: String },
    Verifying,
    Extracting,
    Installing,
    Success,
    RolledBack,
}

type PhaseObserver = Box<dyn Fn(&Phase) + Send + Sync>;

/// Result of a successful install
#[derive(Debug, Clone)]
pub struct InstalledBinary {
    pub path: PathBuf,
    pub archive: ArchiveRef,
    pub bytes_downloaded: u64,
}

pub struct Installer<F, R> {
    config: InstallerConfig,
    fetcher: F,
    resolver: R,
    expected_sha256: Option<String>,
    observer: Option<PhaseObserver>,
}

impl Installer<ReleaseFetcher, GitHubReleases> {
    /// Network-backed installer for the configured repository
    pub fn from_config(config: InstallerConfig) -> Result<Self, InstallError> {
        let fetcher =
            ReleaseFetcher::new(&config).map_err(|e| InstallError::Config(format!("{e:#}")))?;
        let resolver = GitHubReleases::new(&config.download_base_url, &config.repo);
        Ok(Self::new(config, fetcher, resolver))
    }
}

impl<F: Fetch, R: ResolveReleaseUrl> Installer<F, R> {
    pub fn new(config: InstallerConfig, fetcher: F, resolver: R) -> Self {
        Self {
            config,
            fetcher,
            resolver,
            expected_sha256: None,
            observer: None,
        }
    }

    /// Require the downloaded archive to hash to `digest` (hex SHA-256)
    pub fn with_sha256(mut self, digest: Option<String>) -> Self {
        self.expected_sha256 = digest;
        self
    }

    pub fn on_phase(mut self, observer: impl Fn(&Phase) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn emit(&self, phase: Phase) {
        debug!("phase: {:?}", phase);
        if let Some(observer) = &self.observer {
            observer(&phase);
        }
    }

    /// Validate the request and locate its archive without touching disk or network
    pub fn plan(&self, request: &InstallRequest, host: &HostInfo) -> Result<ArchiveRef, InstallError> {
        self.emit(Phase::Validating);
        request.validate()?;

        self.emit(Phase::Resolving);
        let platform = Platform::resolve(host)?;
        let archive = download::locate_archive(
            &self.resolver,
            &self.config.command,
            &request.version,
            &platform,
            &self.config.asset_extension,
        );
        debug!("Resolved {} -> {}", archive.filename, archive.url);
        Ok(archive)
    }

    /// Run the whole install for `host`
    pub async fn install(
        &self,
        request: &InstallRequest,
        host: &HostInfo,
    ) -> Result<InstalledBinary, InstallError> {
        let archive = self.plan(request, host)?;

        match self.download_and_install(request, archive).await {
            Ok((installed, workspace)) => {
                let workspace_path = workspace.path().to_path_buf();
                if let Err(e) = workspace.close() {
                    warn!("Failed to remove workspace {}: {}", workspace_path.display(), e);
                }
                self.emit(Phase::Success);
                info!(
                    "Installed {} ({} bytes downloaded)",
                    installed.path.display(),
                    installed.bytes_downloaded
                );
                Ok(installed)
            }
            Err(e) => {
                rollback(&request.install_path).await;
                self.emit(Phase::RolledBack);
                Err(InstallError::InstallFailed {
                    tool: self.config.tool.clone(),
                    version: request.version.clone(),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Workspace-scoped half of the run; the workspace is dropped (and removed) on error
    async fn download_and_install(
        &self,
        request: &InstallRequest,
        archive: ArchiveRef,
    ) -> Result<(InstalledBinary, TempDir), InstallError> {
        let workspace = tempfile::Builder::new()
            .prefix(&format!("{}-install-", self.config.command))
            .tempdir()
            .map_err(|e| self.download_failed(request, &archive, format!("no workspace: {e}")))?;

        let archive_path = workspace.path().join(&archive.filename);

        self.emit(Phase::Downloading {
            url: archive.url.clone(),
        });
        let bytes = self
            .fetcher
            .fetch(&archive.url, &archive_path)
            .await
            .map_err(|e| self.download_failed(request, &archive, format!("{e:#}")))?;

        if let Some(expected) = &self.expected_sha256 {
            self.emit(Phase::Verifying);
            download::verify_sha256(&archive_path, expected)?;
        }

        let bin_dir = binary_staging::ensure_bin_dir(&request.install_path).await?;

        self.emit(Phase::Extracting);
        let extracted = download::extract_archive(
            &archive_path,
            workspace.path(),
            &archive.root_dir,
            &self.config.command,
        )
        .await?;

        self.emit(Phase::Installing);
        let path = binary_staging::install_binary(&extracted, &bin_dir, &self.config.command).await?;

        Ok((
            InstalledBinary {
                path,
                archive,
                bytes_downloaded: bytes,
            },
            workspace,
        ))
    }

    fn download_failed(
        &self,
        request: &InstallRequest,
        archive: &ArchiveRef,
        reason: String,
    ) -> InstallError {
        InstallError::DownloadFailed {
            tool: self.config.tool.clone(),
            version: request.version.clone(),
            url: archive.url.clone(),
            reason,
        }
    }
}

/// Remove the entire install path, including anything the host put there
async fn rollback(install_path: &Path) {
    match tokio::fs::remove_dir_all(install_path).await {
        Ok(()) => info!("Rolled back {}", install_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", install_path.display(), e),
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal && std::env::var_os("NO_COLOR").is_none() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print `Success: ...` in green on stdout
pub fn report_success(tool: &str, version: &str, installed: &InstalledBinary) {
    let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = write!(stdout, "Success:");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        " {} {} installed at {}",
        tool,
        version,
        installed.path.display()
    );
}

/// Print `Fail: ...` in red on stderr
pub fn report_failure(message: impl fmt::Display) {
    let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "Fail:");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {message}");
}

/// Install with the real fetcher, printing progress and the success line
///
/// Failures are returned for the caller to report.
pub async fn run_install(
    request: &InstallRequest,
    config: InstallerConfig,
    expected_sha256: Option<String>,
) -> Result<InstalledBinary, InstallError> {
    let tool = config.tool.clone();
    let installer = Installer::from_config(config)?
        .with_sha256(expected_sha256)
        .on_phase(|phase| {
            if let Phase::Downloading { url } = phase {
                println!("Downloading {url}...");
            }
        });

    let installed = installer.install(request, &HostInfo::detect()).await?;
    report_success(&tool, &request.version, &installed);
    Ok(installed)
}
