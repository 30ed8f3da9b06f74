//! The merge-and-emit pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ per group, concurrently (tokio tasks)                     │
//! │  Resolve → Load (concurrent) → Reduce → Transform →       │
//! │  Serialize → Name                                         │
//! └───────────────────────────────────────────────────────────┘
//! ┌───────────────────────────────────────────────────────────┐
//! │ sequentially, in group declaration order                  │
//! │  Emit (check-then-act against the host asset store)       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Group pipelines are independent: a failed group lands in the pass
//! report and never halts the others. Emission is deliberately serialized
//! in declaration order so that two groups sharing a destination behave
//! deterministically — first declared wins without `force`, last declared
//! wins with it.

pub mod load;
pub mod merge;
pub mod resolve;

use std::sync::Arc;

use crate::asset::{EmitOutcome, PreparedAsset, emit, name, serialize};
use crate::config::{ConfigError, MergeFn, PluginConfig};
use crate::core::BuildError;
use crate::host::BuildHost;
use crate::{debug, log};

// =============================================================================
// Report
// =============================================================================

/// Failure of one group's pipeline.
#[derive(Debug)]
pub struct GroupFailure {
    /// The group's destination template, identifying it in the report.
    pub destination: String,
    /// Every error the group hit (all failed loads, not just the first).
    pub errors: Vec<BuildError>,
}

/// Result of one build pass.
///
/// A pass always runs to completion; callers inspect `failures` to detect
/// partial failure.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Emitter outcome per group that produced an artifact.
    pub emitted: Vec<EmitOutcome>,
    /// Non-fatal warnings, e.g. emit-collision skips.
    pub warnings: Vec<String>,
    /// Failed groups with their collected errors.
    pub failures: Vec<GroupFailure>,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

// =============================================================================
// Plugin
// =============================================================================

/// The plugin: merges each configured group of JSON files into one asset.
///
/// Construction validates the configuration eagerly; a build pass is one
/// [`run`](Self::run) call against a host.
///
/// ```ignore
/// let config = PluginConfig::new(vec![
///     Group::from_pattern("locales/*.json", "locales.[contenthash].json"),
/// ]);
/// let plugin = MergeJsonPlugin::new(config)?;
/// let report = plugin.run(host).await;
/// ```
#[derive(Debug, Clone)]
pub struct MergeJsonPlugin {
    config: Arc<PluginConfig>,
}

impl MergeJsonPlugin {
    /// Validate the configuration and build the plugin.
    pub fn new(config: PluginConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Run one build pass: process all groups concurrently, then emit in
    /// declaration order.
    pub async fn run(&self, host: Arc<dyn BuildHost>) -> BuildReport {
        let minify = self.config.minify.resolve(host.mode());

        debug!("merge"; "merging json groups");

        let mut handles = Vec::with_capacity(self.config.groups.len());
        for index in 0..self.config.groups.len() {
            let config = Arc::clone(&self.config);
            let host = Arc::clone(&host);
            handles.push(tokio::spawn(async move {
                run_group(config, host, index, minify).await
            }));
        }

        let mut report = BuildReport::default();
        for (index, handle) in handles.into_iter().enumerate() {
            let destination = self.config.groups[index].to.clone();
            match handle.await {
                Ok(Ok(Some(asset))) => {
                    let outcome = emit::emit(host.as_ref(), asset, self.config.force);
                    if let EmitOutcome::Skipped { name } = &outcome {
                        report
                            .warnings
                            .push(format!("skipping `{name}`: asset already exists"));
                    }
                    report.emitted.push(outcome);
                }
                // Empty resolution: the group was a no-op.
                Ok(Ok(None)) => {}
                Ok(Err(errors)) => report.failures.push(GroupFailure {
                    destination,
                    errors,
                }),
                Err(_) => {
                    let errors = vec![BuildError::Panicked(destination.clone())];
                    report.failures.push(GroupFailure {
                        destination,
                        errors,
                    });
                }
            }
        }

        for failure in &report.failures {
            for err in &failure.errors {
                log!("error"; "{err}");
            }
        }

        report
    }
}

// =============================================================================
// Group pipeline
// =============================================================================

/// Run one group up to (not including) emission.
///
/// `Ok(None)` means the group resolved to zero files and is a no-op.
async fn run_group(
    config: Arc<PluginConfig>,
    host: Arc<dyn BuildHost>,
    index: usize,
    minify: bool,
) -> Result<Option<PreparedAsset>, Vec<BuildError>> {
    let group = &config.groups[index];
    let cwd = config.resolve_cwd(host.context_dir()).to_path_buf();
    let glob_options = group.glob_options.as_ref().unwrap_or(&config.glob_options);

    let files = resolve::resolve(&group.source, &cwd, glob_options)
        .await
        .map_err(|err| vec![err])?;

    if files.is_empty() {
        log!("merge"; "no files to merge for `{}`", group.to);
        return Ok(None);
    }

    // Loads run concurrently; awaiting the handles in resolution order keeps
    // merge precedence equal to input order regardless of completion timing.
    let mut loads = Vec::with_capacity(files.len());
    for path in files {
        let host = Arc::clone(&host);
        let transform_file = group.transform_file.clone();
        loads.push(tokio::spawn(async move {
            load::load(host.as_ref(), &path, transform_file.as_ref()).await
        }));
    }

    let mut values = Vec::with_capacity(loads.len());
    let mut errors = Vec::new();
    for handle in loads {
        match handle.await {
            Ok(Ok(value)) => values.push(value),
            Ok(Err(err)) => errors.push(err),
            Err(_) => errors.push(BuildError::Panicked(group.to.clone())),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let merge_fn: MergeFn = match &config.merge_fn {
        Some(custom) => {
            debug!("merge"; "using custom merge function");
            Arc::clone(custom)
        }
        None => Arc::new(merge::shallow),
    };

    let Some(merged) = merge::reduce(values, |acc, value| merge_fn(acc, value)) else {
        return Ok(None);
    };

    let document = match &group.transform {
        Some(transform) => transform(merged).await.map_err(|source| {
            vec![BuildError::Transform {
                destination: group.to.clone(),
                source,
            }]
        })?,
        None => merged,
    };

    let rendered = serialize::render(&document, minify).map_err(|source| {
        vec![BuildError::Serialize {
            destination: group.to.clone(),
            source,
        }]
    })?;
    let source = rendered.into_bytes();

    let (name, mut info) = name::interpolate(&group.to, &source, host.hash_settings());
    info.minimized = minify;

    Ok(Some(PreparedAsset { name, source, info }))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlobOptions, Group};
    use crate::core::{BuildMode, MinifyMode};
    use crate::host::MemoryHost;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &Value) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    async fn run(config: PluginConfig, host: &Arc<MemoryHost>) -> BuildReport {
        MergeJsonPlugin::new(config)
            .unwrap()
            .run(host.clone())
            .await
    }

    #[tokio::test]
    async fn test_basic_merge() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1, "b": 1}));
        write(dir.path(), "b.json", &json!({"b": 2, "c": 3}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_files(
            ["a.json", "b.json"],
            "merged.json",
        )]);

        let report = run(config, &host).await;

        assert!(!report.has_errors());
        assert!(report.warnings.is_empty());
        assert_eq!(
            parse(&host.asset_source("merged.json").unwrap()),
            json!({"a": 1, "b": 2, "c": 3})
        );
        // Both inputs registered for rebuild tracking.
        assert_eq!(host.file_dependencies().len(), 2);
    }

    #[tokio::test]
    async fn test_merge_precedence_follows_input_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1, "b": 1}));
        write(dir.path(), "b.json", &json!({"b": 2, "c": 3}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_files(
            ["b.json", "a.json"],
            "merged.json",
        )]);

        run(config, &host).await;

        assert_eq!(
            parse(&host.asset_source("merged.json").unwrap()),
            json!({"a": 1, "b": 1, "c": 3})
        );
    }

    #[tokio::test]
    async fn test_missing_file_fails_group_only() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1}));
        write(dir.path(), "ok.json", &json!({"ok": true}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![
            Group::from_files(["a.json", "absent.json"], "broken.json"),
            Group::from_files(["ok.json"], "ok.json"),
        ]);

        let report = run(config, &host).await;

        assert!(report.has_errors());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].destination, "broken.json");
        assert!(
            format!("{}", report.failures[0].errors[0]).contains("absent.json")
        );

        // The failed group produced nothing; the healthy group is intact.
        assert!(host.asset_source("broken.json").is_none());
        assert!(host.asset_source("ok.json").is_some());
    }

    #[tokio::test]
    async fn test_all_group_errors_collected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{ nope").unwrap();

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_files(
            ["missing-one.json", "bad.json", "missing-two.json"],
            "merged.json",
        )]);

        let report = run(config, &host).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].errors.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_glob_resolution_is_noop() {
        let dir = TempDir::new().unwrap();

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_pattern("missing/*.json", "out.json")]);

        let report = run(config, &host).await;

        assert!(!report.has_errors());
        assert!(report.emitted.is_empty());
        assert_eq!(host.asset_count(), 0);
    }

    #[tokio::test]
    async fn test_glob_group_merges_sorted_matches() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "conf/10-base.json", &json!({"x": 1, "base": true}));
        write(dir.path(), "conf/20-extra.json", &json!({"x": 2}));
        write(dir.path(), "conf/readme.txt", &json!("not json"));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_pattern("conf/*", "conf.json")]);

        let report = run(config, &host).await;

        assert!(!report.has_errors());
        // Lexicographic order: 20-extra overrides 10-base; the txt file is
        // excluded by the default glob options.
        assert_eq!(
            parse(&host.asset_source("conf.json").unwrap()),
            json!({"x": 2, "base": true})
        );
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_asset() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_files(["a.json"], "merged.json")]);

        let first = run(config.clone(), &host).await;
        assert!(first.warnings.is_empty());
        let original = host.asset_source("merged.json").unwrap();

        let second = run(config, &host).await;
        assert_eq!(second.warnings.len(), 1);
        assert!(second.warnings[0].contains("merged.json"));
        assert!(!second.has_errors());
        assert_eq!(host.asset_source("merged.json").unwrap(), original);
    }

    #[tokio::test]
    async fn test_force_overwrites_shared_destination() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "first.json", &json!({"who": "first"}));
        write(dir.path(), "second.json", &json!({"who": "second"}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![
            Group::from_files(["first.json"], "out.json"),
            Group::from_files(["second.json"], "out.json"),
        ])
        .with_force(true);

        let report = run(config, &host).await;

        assert!(report.warnings.is_empty());
        // Emission is serialized in declaration order: last group wins.
        assert_eq!(host.journal(), vec!["emit:out.json", "update:out.json"]);
        assert_eq!(
            parse(&host.asset_source("out.json").unwrap()),
            json!({"who": "second"})
        );
    }

    #[tokio::test]
    async fn test_shared_destination_without_force_first_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "first.json", &json!({"who": "first"}));
        write(dir.path(), "second.json", &json!({"who": "second"}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![
            Group::from_files(["first.json"], "out.json"),
            Group::from_files(["second.json"], "out.json"),
        ]);

        let report = run(config, &host).await;

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            parse(&host.asset_source("out.json").unwrap()),
            json!({"who": "first"})
        );
    }

    #[tokio::test]
    async fn test_contenthash_destination() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config =
            PluginConfig::new(vec![Group::from_files(["a.json"], "merged.[contenthash].json")]);

        let report = run(config.clone(), &host).await;

        assert!(!report.has_errors());
        let names = host.asset_names();
        assert_eq!(names.len(), 1);
        let name = &names[0];
        assert!(name.starts_with("merged."));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "merged.".len() + 8 + ".json".len());

        let info = host.asset(name.as_str()).unwrap();
        assert!(info.immutable);
        assert_eq!(info.content_hash.as_deref().unwrap().len(), 8);

        // Unchanged content resolves to the same name on a rerun.
        let rerun_host = Arc::new(MemoryHost::new(dir.path()));
        run(config, &rerun_host).await;
        assert_eq!(host.asset_names(), rerun_host.asset_names());
    }

    #[tokio::test]
    async fn test_minify_auto_follows_build_mode() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": {"b": 1}}));

        let group = || vec![Group::from_files(["a.json"], "merged.json")];

        let prod = Arc::new(MemoryHost::new(dir.path()).with_mode(BuildMode::PRODUCTION));
        run(PluginConfig::new(group()), &prod).await;
        let minified = String::from_utf8(prod.asset_source("merged.json").unwrap()).unwrap();
        assert_eq!(minified.lines().count(), 1);
        assert!(prod.asset("merged.json").unwrap().minimized);

        let dev = Arc::new(MemoryHost::new(dir.path()));
        run(PluginConfig::new(group()), &dev).await;
        let pretty = String::from_utf8(dev.asset_source("merged.json").unwrap()).unwrap();
        assert!(pretty.lines().count() > 1);
        assert!(pretty.contains("  \"a\""));
        assert!(!dev.asset("merged.json").unwrap().minimized);

        // Explicit `minify` beats the build mode.
        let forced = Arc::new(MemoryHost::new(dir.path()).with_mode(BuildMode::PRODUCTION));
        run(
            PluginConfig::new(group()).with_minify(MinifyMode::Off),
            &forced,
        )
        .await;
        let output = String::from_utf8(forced.asset_source("merged.json").unwrap()).unwrap();
        assert!(output.lines().count() > 1);
    }

    #[tokio::test]
    async fn test_transform_replaces_merged_document() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1}));
        write(dir.path(), "b.json", &json!({"b": 2}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let group = Group::from_files(["a.json", "b.json"], "merged.json").with_transform(
            |merged| async move {
                Ok(json!({"wrapped": merged}))
            },
        );

        let report = run(PluginConfig::new(vec![group]), &host).await;

        assert!(!report.has_errors());
        assert_eq!(
            parse(&host.asset_source("merged.json").unwrap()),
            json!({"wrapped": {"a": 1, "b": 2}})
        );
    }

    #[tokio::test]
    async fn test_transform_error_fails_group() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"a": 1}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let group = Group::from_files(["a.json"], "merged.json")
            .with_transform(|_| async move { anyhow::bail!("rejected") });

        let report = run(PluginConfig::new(vec![group]), &host).await;

        assert!(report.has_errors());
        assert!(host.asset_source("merged.json").is_none());
    }

    #[tokio::test]
    async fn test_transform_file_runs_before_fold() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en.json", &json!({"hello": "hello"}));
        write(dir.path(), "de.json", &json!({"hello": "hallo"}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let group = Group::from_files(["en.json", "de.json"], "locales.json")
            .with_transform_file(|path, value| {
                let lang = path.file_stem().unwrap().to_str().unwrap().to_string();
                json!({ lang: value })
            });

        let report = run(PluginConfig::new(vec![group]), &host).await;

        assert!(!report.has_errors());
        assert_eq!(
            parse(&host.asset_source("locales.json").unwrap()),
            json!({"en": {"hello": "hello"}, "de": {"hello": "hallo"}})
        );
    }

    #[tokio::test]
    async fn test_custom_merge_fn() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &json!({"x": [1, 2]}));
        write(dir.path(), "b.json", &json!({"x": [3]}));

        let host = Arc::new(MemoryHost::new(dir.path()));
        let config = PluginConfig::new(vec![Group::from_files(
            ["a.json", "b.json"],
            "merged.json",
        )])
        .with_merge_fn(|base, next| match (base, next) {
            (Value::Object(mut base), Value::Object(next)) => {
                for (key, value) in next {
                    match (base.get_mut(&key), value) {
                        (Some(Value::Array(existing)), Value::Array(incoming)) => {
                            existing.extend(incoming);
                        }
                        (_, value) => {
                            base.insert(key, value);
                        }
                    }
                }
                Value::Object(base)
            }
            (_, next) => next,
        });

        run(config, &host).await;

        assert_eq!(
            parse(&host.asset_source("merged.json").unwrap()),
            json!({"x": [1, 2, 3]})
        );
    }

    #[tokio::test]
    async fn test_per_group_glob_options() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "conf/base.json", &json!({"base": true}));
        fs::write(dir.path().join("conf/extra.cfg"), r#"{"extra": true}"#).unwrap();

        let host = Arc::new(MemoryHost::new(dir.path()));
        let group = Group::from_pattern("conf/*", "everything.json").with_glob_options(
            GlobOptions {
                json_only: false,
                ..GlobOptions::default()
            },
        );

        let report = run(PluginConfig::new(vec![group]), &host).await;

        assert!(!report.has_errors());
        assert_eq!(
            parse(&host.asset_source("everything.json").unwrap()),
            json!({"base": true, "extra": true})
        );
    }

    #[tokio::test]
    async fn test_explicit_cwd_overrides_host_context() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "inputs/a.json", &json!({"a": 1}));

        // Host context points elsewhere; the config cwd wins.
        let host = Arc::new(MemoryHost::new("/nonexistent"));
        let config = PluginConfig::new(vec![Group::from_files(["a.json"], "merged.json")])
            .with_cwd(dir.path().join("inputs"));

        let report = run(config, &host).await;

        assert!(!report.has_errors());
        assert!(host.asset_source("merged.json").is_some());
    }
}
