//! Platform/architecture parsing and asset matching.

use std::fmt;
use std::str::FromStr;

use crate::github::ReleaseAsset;

/// Operating systems an installer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
        }
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "darwin" => Ok(Platform::Darwin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures an installer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl FromStr for Arch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x64" => Ok(Arch::X64),
            "arm64" => Ok(Arch::Arm64),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated download target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub platform: Platform,
    pub arch: Arch,
}

/// Match strategies, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    PlatformAndArch,
    PlatformOnly,
    ArchOnly,
}

const PATTERNS: [Pattern; 3] = [Pattern::PlatformAndArch, Pattern::PlatformOnly, Pattern::ArchOnly];

impl Pattern {
    fn matches(self, name: &str, target: &Target) -> bool {
        let name = name.to_ascii_lowercase();
        let platform = target.platform.as_str();
        let arch = target.arch.as_str();
        match self {
            // The arch has to follow the platform, as in `app-windows-x64`.
            Pattern::PlatformAndArch => name
                .find(platform)
                .is_some_and(|at| name[at + platform.len()..].contains(arch)),
            Pattern::PlatformOnly => name.contains(platform),
            Pattern::ArchOnly => name.contains(arch),
        }
    }
}

/// Pick the asset to serve for a target.
///
/// Patterns are tried in priority order; within a pattern the first asset in
/// listing order wins. Only `.zip` files are eligible.
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], target: &Target) -> Option<&'a ReleaseAsset> {
    PATTERNS.iter().find_map(|pattern| {
        assets
            .iter()
            .find(|asset| asset.name.ends_with(".zip") && pattern.matches(&asset.name, target))
    })
}
