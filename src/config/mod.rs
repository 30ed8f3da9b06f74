//! Plugin configuration.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error       # ConfigError, ConfigDiagnostics, FieldPath
//! ├── group       # Group, Source, GlobOptions, function hooks
//! └── mod.rs      # PluginConfig (this file)
//! ```
//!
//! The configuration is constructed once, validated eagerly, and read-only
//! afterwards: every group pipeline receives it behind an `Arc`, so there
//! is no shared mutable state between concurrent groups.
//!
//! Data fields (groups, destinations, glob options, minify policy) load
//! from TOML; function hooks (`merge_fn`, per-group transforms) exist only
//! in code and are attached through the builder methods.

mod error;
mod group;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use group::{FileTransform, GlobOptions, Group, MergeFn, Source, Transform};

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::MinifyMode;

/// Root plugin configuration.
///
/// ```toml
/// force = false
/// minify = "auto"
///
/// [[group]]
/// files = ["base.json", "override.json"]
/// to = "config.json"
///
/// [[group]]
/// pattern = "locales/*.json"
/// to = "locales.[contenthash].json"
/// ```
#[derive(Clone, Deserialize)]
pub struct PluginConfig {
    /// Working directory input paths and globs resolve against.
    /// Defaults to the host build context when unset.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Overwrite policy: replace an asset that already exists in the
    /// host's output set instead of skipping it.
    #[serde(default)]
    pub force: bool,

    /// Minify policy for serialized output.
    #[serde(default)]
    pub minify: MinifyMode,

    /// Plugin-wide default glob options.
    #[serde(default)]
    pub glob_options: GlobOptions,

    /// Configured groups, processed concurrently per build pass.
    #[serde(rename = "group", alias = "groups")]
    pub groups: Vec<Group>,

    /// Custom merge function (runtime only). Defaults to shallow merge.
    #[serde(skip)]
    pub merge_fn: Option<MergeFn>,
}

impl PluginConfig {
    /// Configuration with default options for the given groups.
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            cwd: None,
            force: false,
            minify: MinifyMode::Auto,
            glob_options: GlobOptions::default(),
            groups,
            merge_fn: None,
        }
    }

    /// Parse configuration from TOML, rejecting unknown fields.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;

        if !ignored.is_empty() {
            return Err(ConfigError::UnknownFields(ignored));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Set the working directory explicitly.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the overwrite policy.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the minify policy.
    pub fn with_minify(mut self, minify: MinifyMode) -> Self {
        self.minify = minify;
        self
    }

    /// Set the plugin-wide default glob options.
    pub fn with_glob_options(mut self, options: GlobOptions) -> Self {
        self.glob_options = options;
        self
    }

    /// Replace the default shallow merge with a custom merge function.
    pub fn with_merge_fn<F>(mut self, merge_fn: F) -> Self
    where
        F: Fn(serde_json::Value, serde_json::Value) -> serde_json::Value + Send + Sync + 'static,
    {
        self.merge_fn = Some(std::sync::Arc::new(merge_fn));
        self
    }

    /// Working directory for a build pass: explicit `cwd` wins, otherwise
    /// the host build context.
    pub fn resolve_cwd<'a>(&'a self, host_context: &'a Path) -> &'a Path {
        self.cwd.as_deref().unwrap_or(host_context)
    }

    /// Validate shape invariants, collecting every violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const GROUP: FieldPath = FieldPath::new("group");

        let mut diag = ConfigDiagnostics::new();

        if self.groups.is_empty() {
            diag.error(GROUP, "must contain at least one group");
        }

        for (idx, group) in self.groups.iter().enumerate() {
            if group.to.trim().is_empty() {
                diag.error(GROUP, format!("[{idx}] `to` must be a non-empty string"));
            }

            match &group.source {
                Source::Files(files) => {
                    if files.is_empty() {
                        diag.error(GROUP, format!("[{idx}] `files` must not be empty"));
                    }
                    for (entry, file) in files.iter().enumerate() {
                        if file.trim().is_empty() {
                            diag.error(
                                GROUP,
                                format!("[{idx}] files[{entry}] must be a non-empty string"),
                            );
                        }
                    }
                }
                Source::Patterns(patterns) => {
                    if patterns.is_empty() {
                        diag.error(GROUP, format!("[{idx}] `pattern` must not be empty"));
                    }
                    for (entry, pattern) in patterns.iter().enumerate() {
                        if pattern.trim().is_empty() {
                            diag.error(
                                GROUP,
                                format!("[{idx}] pattern[{entry}] must be a non-empty string"),
                            );
                        }
                    }
                }
            }
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("cwd", &self.cwd)
            .field("force", &self.force)
            .field("minify", &self.minify)
            .field("glob_options", &self.glob_options)
            .field("groups", &self.groups)
            .field("merge_fn", &self.merge_fn.as_ref().map(|_| ".."))
            .finish()
    }
}
