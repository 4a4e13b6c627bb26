//! Archive download with redirect following and stall detection

use anyhow::{anyhow, bail, Context, Result};
use futures_util::StreamExt;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use url::Url;

use crate::config::InstallerConfig;
use crate::install::error::InstallError;

const MAX_REDIRECTS: usize = 10;

/// Fetches a URL into a local file, returning the number of bytes written
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// HTTP(S) fetcher that also serves `file://` mirrors
#[derive(Debug, Clone)]
pub struct ReleaseFetcher {
    client: reqwest::Client,
    inactivity_timeout: Duration,
}

fn client_builder(config: &InstallerConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(config.user_agent.clone())
}

impl ReleaseFetcher {
    pub fn new(config: &InstallerConfig) -> Result<Self> {
        let client = client_builder(config)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(config, client))
    }

    fn with_client(config: &InstallerConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            inactivity_timeout: Duration::from_secs(config.inactivity_timeout_secs),
        }
    }

    async fn fetch_http(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            bail!("HTTP {}", response.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut stream = std::pin::pin!(response.bytes_stream());
        let mut downloaded: u64 = 0;

        loop {
            let chunk = match timeout(self.inactivity_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => break,
                Err(_) => {
                    return Err(anyhow!(
                        "no data received for {} seconds ({} bytes downloaded)",
                        self.inactivity_timeout.as_secs(),
                        downloaded
                    ));
                }
            };

            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(downloaded)
    }

    async fn fetch_file(&self, url: &Url, dest: &Path) -> Result<u64> {
        let source = url
            .to_file_path()
            .map_err(|_| anyhow!("not a local path: {url}"))?;
        let copied = tokio::fs::copy(&source, dest)
            .await
            .with_context(|| format!("Failed to copy {}", source.display()))?;
        Ok(copied)
    }
}

impl Fetch for ReleaseFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let parsed = Url::parse(url).with_context(|| format!("Invalid download URL: {url}"))?;
        let bytes = match parsed.scheme() {
            "http" | "https" => self.fetch_http(url, dest).await?,
            "file" => self.fetch_file(&parsed, dest).await?,
            other => bail!("unsupported URL scheme `{other}`"),
        };

        debug!("Fetched {} bytes from {}", bytes, url);
        Ok(bytes)
    }
}

/// Hex-encoded SHA-256 of a file
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compare a file's digest against an expected hex string (case-insensitive)
pub fn verify_sha256(path: &Path, expected: &str) -> Result<(), InstallError> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let actual = sha256_file(path).map_err(|e| InstallError::ChecksumMismatch {
        file: file.clone(),
        expected: expected.to_string(),
        actual: format!("<unreadable: {e}>"),
    })?;

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(InstallError::ChecksumMismatch {
            file,
            expected: expected.to_string(),
            actual,
        });
    }

    info!("Checksum verified for {}", file);
    Ok(())
}
