//! Input file resolution.
//!
//! Turns a group's [`Source`] into a concrete ordered list of absolute
//! paths. Explicit lists keep their order exactly as given (it determines
//! merge precedence); glob expansion walks the working directory on a
//! blocking thread and sorts the matches so a fixed filesystem state
//! always yields the same order.
//!
//! Zero matches are not an error here; the group driver decides what an
//! empty set means.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::config::{GlobOptions, Source};
use crate::core::BuildError;
use crate::debug;

/// Resolve a group source against the working directory.
pub async fn resolve(
    source: &Source,
    cwd: &Path,
    options: &GlobOptions,
) -> Result<Vec<PathBuf>, BuildError> {
    match source {
        Source::Files(files) => Ok(files
            .iter()
            .map(|file| {
                let path = Path::new(file);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    cwd.join(path)
                }
            })
            .collect()),
        Source::Patterns(patterns) => {
            let label = patterns_label(patterns);
            let cwd = cwd.to_path_buf();
            let patterns = patterns.clone();
            let options = options.clone();

            tokio::task::spawn_blocking(move || expand_patterns(&cwd, &patterns, &options))
                .await
                .unwrap_or_else(|_| Err(BuildError::Panicked(label)))
        }
    }
}

fn patterns_label(patterns: &[String]) -> String {
    if patterns.is_empty() {
        String::from("<glob>")
    } else {
        patterns.join(" ")
    }
}

/// Expand glob patterns below `cwd` into sorted matching file paths.
fn expand_patterns(
    cwd: &Path,
    patterns: &[String],
    options: &GlobOptions,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut builder = OverrideBuilder::new(cwd);

    if options.case_insensitive {
        builder
            .case_insensitive(true)
            .map_err(|source| BuildError::Pattern {
                pattern: patterns_label(patterns),
                source,
            })?;
    }

    for pattern in patterns {
        builder.add(pattern).map_err(|source| BuildError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
    }

    let overrides = builder.build().map_err(|source| BuildError::Pattern {
        pattern: patterns_label(patterns),
        source,
    })?;

    let mut walk = WalkBuilder::new(cwd);
    walk.standard_filters(false)
        .hidden(!options.dot)
        .follow_links(options.follow_links)
        .max_depth(options.max_depth)
        .overrides(overrides);

    let mut matches = Vec::new();
    for entry in walk.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("resolve"; "skipping unreadable entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ty| ty.is_file()) {
            continue;
        }

        if options.json_only
            && entry.path().extension().and_then(|ext| ext.to_str()) != Some("json")
        {
            continue;
        }

        matches.push(entry.into_path());
    }

    matches.sort();
    Ok(matches)
}
