//! Platform identification.
//!
//! Platform tokens are the values the host shell reports for the running
//! operating system (`darwin`, `win32`, `linux`). Matching is exact and
//! case-sensitive; anything else is treated as unknown.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MACOS_TOKEN: &str = "darwin";
pub const WINDOWS_TOKEN: &str = "win32";
pub const LINUX_TOKEN: &str = "linux";

/// True iff `id` is exactly the macOS token.
pub fn is_macos(id: Option<&str>) -> bool {
    id == Some(MACOS_TOKEN)
}

/// True iff `id` is exactly the Windows token.
pub fn is_windows(id: Option<&str>) -> bool {
    id == Some(WINDOWS_TOKEN)
}

/// True iff `id` is exactly the Linux token.
pub fn is_linux(id: Option<&str>) -> bool {
    id == Some(LINUX_TOKEN)
}

/// Operating system category derived from a platform token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Unknown,
}

impl Platform {
    pub fn classify(id: Option<&str>) -> Self {
        if is_macos(id) {
            Platform::MacOs
        } else if is_windows(id) {
            Platform::Windows
        } else if is_linux(id) {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::classify(Self::token_for_os(std::env::consts::OS))
    }

    /// Token for a known platform, `None` for `Unknown`.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Platform::MacOs => Some(MACOS_TOKEN),
            Platform::Windows => Some(WINDOWS_TOKEN),
            Platform::Linux => Some(LINUX_TOKEN),
            Platform::Unknown => None,
        }
    }

    /// Map a Rust `std::env::consts::OS` value onto a platform token.
    fn token_for_os(os: &str) -> Option<&'static str> {
        match os {
            "macos" => Some(MACOS_TOKEN),
            "windows" => Some(WINDOWS_TOKEN),
            "linux" => Some(LINUX_TOKEN),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}
