//! Group definitions: one group maps a set of input JSON files to one
//! output asset.
//!
//! A group's input is a tagged [`Source`]: either an explicit ordered file
//! list (order = merge precedence) or a set of glob patterns expanded
//! against the working directory at build time.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

// ============================================================================
// Function hooks
// ============================================================================

/// Binary merge function folding two JSON documents into one.
pub type MergeFn = Arc<dyn Fn(Value, Value) -> Value + Send + Sync>;

/// Async post-merge transform: receives the merged document, returns the
/// document to serialize.
pub type Transform =
    Arc<dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>> + Send + Sync>;

/// Per-file transform applied to each parsed document before the fold.
pub type FileTransform = Arc<dyn Fn(&Path, Value) -> Value + Send + Sync>;

// ============================================================================
// Source
// ============================================================================

/// Where a group's input files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Explicit ordered list of paths, resolved relative to the working
    /// directory. The list order determines merge precedence.
    Files(Vec<String>),
    /// Glob patterns expanded by the glob engine. Expansion order is
    /// whatever the engine yields, stable for a fixed filesystem state.
    Patterns(Vec<String>),
}

// ============================================================================
// GlobOptions
// ============================================================================

/// Pass-through options for glob expansion.
///
/// A per-group `glob_options` replaces the plugin-wide default wholesale;
/// the two are never field-merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlobOptions {
    /// Exclude files without a `.json` extension from glob matches.
    pub json_only: bool,
    /// Match files and directories starting with a dot.
    pub dot: bool,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Case-insensitive pattern matching.
    pub case_insensitive: bool,
    /// Maximum directory depth to descend, unlimited when unset.
    pub max_depth: Option<usize>,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            json_only: true,
            dot: false,
            follow_links: false,
            case_insensitive: false,
            max_depth: None,
        }
    }
}

// ============================================================================
// Group
// ============================================================================

/// One unit of work: a set of input JSON files merged into one output asset.
#[derive(Clone)]
pub struct Group {
    /// Input specification.
    pub source: Source,

    /// Destination path template. May contain a content-hash token,
    /// e.g. `merged.[contenthash].json`.
    pub to: String,

    /// Per-group glob options, overriding the plugin-wide default.
    pub glob_options: Option<GlobOptions>,

    /// Post-merge async transform (runtime only, not part of config files).
    pub transform: Option<Transform>,

    /// Per-file transform (runtime only, not part of config files).
    pub transform_file: Option<FileTransform>,
}

impl Group {
    /// Group from an explicit ordered file list.
    pub fn from_files<I, S>(files: I, to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: Source::Files(files.into_iter().map(Into::into).collect()),
            to: to.into(),
            glob_options: None,
            transform: None,
            transform_file: None,
        }
    }

    /// Group from one or more glob patterns.
    pub fn from_patterns<I, S>(patterns: I, to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: Source::Patterns(patterns.into_iter().map(Into::into).collect()),
            to: to.into(),
            glob_options: None,
            transform: None,
            transform_file: None,
        }
    }

    /// Group from a single glob pattern.
    pub fn from_pattern(pattern: impl Into<String>, to: impl Into<String>) -> Self {
        Self::from_patterns([pattern.into()], to)
    }

    /// Attach an async post-merge transform.
    pub fn with_transform<F, Fut>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.transform = Some(Arc::new(move |value| Box::pin(transform(value))));
        self
    }

    /// Attach a per-file transform, applied before merging.
    pub fn with_transform_file<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Path, Value) -> Value + Send + Sync + 'static,
    {
        self.transform_file = Some(Arc::new(transform));
        self
    }

    /// Override glob options for this group only.
    pub fn with_glob_options(mut self, options: GlobOptions) -> Self {
        self.glob_options = Some(options);
        self
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("source", &self.source)
            .field("to", &self.to)
            .field("glob_options", &self.glob_options)
            .field("transform", &self.transform.as_ref().map(|_| ".."))
            .field("transform_file", &self.transform_file.as_ref().map(|_| ".."))
            .finish()
    }
}

// ============================================================================
// Deserialization
// ============================================================================

/// `files`/`pattern` accept a single string or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(one) => vec![one],
            OneOrMany::Many(many) => many,
        }
    }
}

#[derive(Deserialize)]
struct GroupDe {
    #[serde(default)]
    files: Option<OneOrMany>,
    #[serde(default)]
    pattern: Option<OneOrMany>,
    #[serde(default)]
    to: String,
    #[serde(default)]
    glob_options: Option<GlobOptions>,
}

impl<'de> Deserialize<'de> for Group {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = GroupDe::deserialize(deserializer)?;

        let source = match (raw.files, raw.pattern) {
            (Some(files), None) => Source::Files(files.into()),
            (None, Some(patterns)) => Source::Patterns(patterns.into()),
            (Some(_), Some(_)) => {
                return Err(de::Error::custom(
                    "`files` and `pattern` are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(de::Error::custom("either `files` or `pattern` is required"));
            }
        };

        Ok(Self {
            source,
            to: raw.to,
            glob_options: raw.glob_options,
            transform: None,
            transform_file: None,
        })
    }
}
