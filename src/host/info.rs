//! Plugin metadata reported to the host

/// Name shown in the host's plugin list
pub const PLUGIN_NAME: &str = "Factorio";

pub const PLUGIN_AUTHOR: &str = "alifeee";

pub const PLUGIN_DESCRIPTION: &str =
    "Factorio plugin for Mumble's Positional Audio API. Requires Factorio positional audio mod.";

/// Feature bit for positional audio support
pub const FEATURE_POSITIONAL: u32 = 1 << 0;

/// Features this plugin implements
pub const fn plugin_features() -> u32 {
    FEATURE_POSITIONAL
}

/// Semantic version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

impl PluginVersion {
    /// Parse "MAJOR.MINOR.PATCH"; pre-release/build suffixes are ignored
    pub fn parse(version: &str) -> Option<Self> {
        let core = version.split(['-', '+']).next()?;
        let mut parts = core.split('.').map(|p| p.parse::<i32>().ok());
        let version = Self {
            major: parts.next()??,
            minor: parts.next()??,
            patch: parts.next()??,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(version)
    }
}

impl std::fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version of this build
pub fn plugin_version() -> PluginVersion {
    PluginVersion::parse(env!("CARGO_PKG_VERSION")).unwrap_or(PluginVersion {
        major: 0,
        minor: 0,
        patch: 0,
    })
}
