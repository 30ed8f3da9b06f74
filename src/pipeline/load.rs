//! JSON file loading.
//!
//! Existence is checked explicitly before reading, and the path is handed
//! to the host's dependency tracker as soon as that check passes — even
//! when the read or parse then fails, so an edit to a broken file still
//! triggers a rebuild.

use std::path::Path;

use serde_json::Value;

use crate::config::FileTransform;
use crate::core::BuildError;
use crate::debug;
use crate::host::BuildHost;

/// Load one input file: verify existence, track, read, parse.
pub async fn load(
    host: &dyn BuildHost,
    path: &Path,
    transform_file: Option<&FileTransform>,
) -> Result<Value, BuildError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => return Err(BuildError::FileNotFound(path.to_path_buf())),
        Err(source) => {
            return Err(BuildError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    host.add_file_dependency(path);

    debug!("read"; "loading {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("read"; "loaded {}", path.display());

    let value: Value =
        serde_json::from_str(&content).map_err(|source| BuildError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(match transform_file {
        Some(transform) => transform(path, value),
        None => value,
    })
}
