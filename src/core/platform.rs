//! Host platform detection and vendor token lookup
//!
//! The platform is resolved once at startup and handed to every provider, so
//! asset naming never consults `std::env::consts` on its own.

use anyhow::Result;

use super::error::TinyenvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
}

/// Vendor-specific spelling of each supported OS and architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsArch {
    pub linux: &'static str,
    pub darwin: &'static str,
    pub amd64: &'static str,
    pub arm64: &'static str,
}

/// A supported OS/architecture pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the running platform
    pub fn current() -> Result<Self> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's `std::env::consts` spellings onto a supported pair
    pub fn from_consts(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || TinyenvError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };
        let os_kind = match os {
            "linux" => Os::Linux,
            "macos" => Os::Darwin,
            _ => return Err(unsupported().into()),
        };
        let arch_kind = match arch {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            _ => return Err(unsupported().into()),
        };
        Ok(Self::new(os_kind, arch_kind))
    }

    #[must_use]
    pub const fn os_token(self, table: &OsArch) -> &'static str {
        match self.os {
            Os::Linux => table.linux,
            Os::Darwin => table.darwin,
        }
    }

    #[must_use]
    pub const fn arch_token(self, table: &OsArch) -> &'static str {
        match self.arch {
            Arch::Amd64 => table.amd64,
            Arch::Arm64 => table.arm64,
        }
    }

    /// Returns `(os, arch)` tokens from a provider table
    #[must_use]
    pub const fn resolve(self, table: &OsArch) -> (&'static str, &'static str) {
        (self.os_token(table), self.arch_token(table))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let os = match self.os {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
        };
        let arch = match self.arch {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        };
        write!(f, "{os}/{arch}")
    }
}
