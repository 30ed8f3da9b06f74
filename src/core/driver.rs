//! Build mode configuration for production/development builds.

use serde::{Deserialize, Deserializer, de};

/// Build mode reported by the host build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Whether assets default to minified output.
    /// Drives the `auto` minify policy.
    pub minify_assets: bool,
}

impl BuildMode {
    /// Production mode: compact output.
    pub const PRODUCTION: Self = Self {
        minify_assets: true,
    };

    /// Development mode: readable output.
    pub const DEVELOPMENT: Self = Self {
        minify_assets: false,
    };

    /// Check if this is a production build.
    #[inline]
    pub const fn is_production(&self) -> bool {
        self.minify_assets
    }
}

/// Minify policy for serialized output.
///
/// `Auto` defers to the host build mode: minified in production,
/// pretty-printed otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinifyMode {
    On,
    Off,
    #[default]
    Auto,
}

impl MinifyMode {
    /// Resolve the policy against the host build mode.
    pub const fn resolve(self, mode: BuildMode) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Auto => mode.is_production(),
        }
    }
}

// Config files spell the policy as `true`, `false` or `"auto"`.
impl<'de> Deserialize<'de> for MinifyMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(Self::On),
            Repr::Flag(false) => Ok(Self::Off),
            Repr::Keyword(word) if word == "auto" => Ok(Self::Auto),
            Repr::Keyword(word) => Err(de::Error::custom(format!(
                "minify must be `true`, `false` or \"auto\", got \"{word}\""
            ))),
        }
    }
}
