//! Platform detection for release asset selection

use std::fmt;

use crate::install::error::InstallError;

/// Raw host identification, read once from the running process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub arch: String,
}

impl HostInfo {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Describe the host this binary was compiled for
    ///
    /// Rust reports macOS as `macos`; release assets use the Darwin name.
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        Self::new(os, std::env::consts::ARCH)
    }
}

/// Operating system component of a release target triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsTag {
    AppleDarwin,
    UnknownLinuxGnu,
}

impl OsTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsTag::AppleDarwin => "apple-darwin",
            OsTag::UnknownLinuxGnu => "unknown-linux-gnu",
        }
    }

    /// Map an OS identifier (`darwin21`, `linux-gnu`, ...) to its tag
    pub fn from_os(os: &str) -> Result<Self, InstallError> {
        let normalized = os.trim().to_ascii_lowercase();
        if normalized.starts_with("darwin") {
            Ok(OsTag::AppleDarwin)
        } else if normalized.starts_with("linux") {
            Ok(OsTag::UnknownLinuxGnu)
        } else {
            Err(InstallError::UnsupportedPlatform(os.to_string()))
        }
    }
}

impl fmt::Display for OsTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU component of a release target triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchTag {
    X86_64,
    Aarch64,
}

impl ArchTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchTag::X86_64 => "x86_64",
            ArchTag::Aarch64 => "aarch64",
        }
    }

    pub fn from_machine(machine: &str) -> Result<Self, InstallError> {
        match machine.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "x86-64" | "x64" | "amd64" => Ok(ArchTag::X86_64),
            "aarch64" | "arm64" => Ok(ArchTag::Aarch64),
            _ => Err(InstallError::UnsupportedArchitecture(machine.to_string())),
        }
    }
}

impl fmt::Display for ArchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved target for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsTag,
    pub arch: ArchTag,
}

impl Platform {
    /// Resolve host identifiers into release naming. The OS is checked first.
    pub fn resolve(host: &HostInfo) -> Result<Self, InstallError> {
        let os = OsTag::from_os(&host.os)?;
        let arch = ArchTag::from_machine(&host.arch)?;
        Ok(Self { os, arch })
    }

    /// `{arch}-{os}` suffix used in asset names
    pub fn triple(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }
}
