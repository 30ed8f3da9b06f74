//! Pipeline error types.
//!
//! Group pipelines fail without halting the rest of the build pass: every
//! error lands in the pass-level [`BuildReport`](crate::pipeline::BuildReport)
//! instead of propagating out of the plugin.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside a group pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error when reading `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in `{}`", path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    #[error("transform failed for `{destination}`")]
    Transform {
        destination: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to serialize merged document for `{destination}`")]
    Serialize {
        destination: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pipeline task for `{0}` panicked")]
    Panicked(String),
}
