//! Merge multiple JSON files into single build assets.
//!
//! Each configured [`Group`] resolves a set of input files (explicit list
//! or glob patterns), parses them as JSON, folds them into one document
//! with a merge function (shallow by default), optionally transforms the
//! result, serializes it pretty or minified, and registers it with the
//! host build system — with content-hash templating for cache-busting
//! names and skip/overwrite handling for existing assets.
//!
//! # Example
//!
//! ```ignore
//! use merge_json::{Group, MemoryHost, MergeJsonPlugin, PluginConfig};
//! use std::sync::Arc;
//!
//! let config = PluginConfig::new(vec![
//!     Group::from_files(["base.json", "override.json"], "config.json"),
//!     Group::from_pattern("locales/*.json", "locales.[contenthash].json"),
//! ]);
//!
//! let plugin = MergeJsonPlugin::new(config)?;
//! let host = Arc::new(MemoryHost::new("/project"));
//! let report = plugin.run(host).await;
//! assert!(!report.has_errors());
//! ```

pub mod asset;
pub mod config;
pub mod core;
pub mod host;
pub mod logger;
pub mod pipeline;
pub mod utils;

pub use crate::asset::{EmitOutcome, PreparedAsset};
pub use crate::config::{
    ConfigError, FileTransform, GlobOptions, Group, MergeFn, PluginConfig, Source, Transform,
};
pub use crate::core::{BuildError, BuildMode, MinifyMode};
pub use crate::host::{AssetInfo, BuildHost, HashAlgorithm, HashSettings, MemoryHost};
pub use crate::pipeline::merge::{deep, shallow};
pub use crate::pipeline::{BuildReport, GroupFailure, MergeJsonPlugin};
