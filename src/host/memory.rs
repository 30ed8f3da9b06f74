//! In-memory build host.
//!
//! Thread-safe asset and dependency storage for tests and for embedding
//! the pipeline outside a full build system.

use std::path::{Path, PathBuf};

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;

use super::{AssetInfo, BuildHost, HashSettings};
use crate::core::BuildMode;

/// An asset held by [`MemoryHost`].
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub source: Vec<u8>,
    pub info: AssetInfo,
}

/// [`BuildHost`] backed by in-process maps.
pub struct MemoryHost {
    context: PathBuf,
    mode: BuildMode,
    hashing: HashSettings,
    assets: DashMap<String, StoredAsset>,
    file_dependencies: DashSet<PathBuf>,
    /// Store mutations in call order, for inspecting emission ordering.
    journal: Mutex<Vec<String>>,
}

impl MemoryHost {
    /// Development-mode host rooted at `context`.
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            context: context.into(),
            mode: BuildMode::DEVELOPMENT,
            hashing: HashSettings::default(),
            assets: DashMap::new(),
            file_dependencies: DashSet::new(),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_hash_settings(mut self, hashing: HashSettings) -> Self {
        self.hashing = hashing;
        self
    }

    /// Stored asset by name.
    pub fn stored_asset(&self, name: &str) -> Option<StoredAsset> {
        self.assets.get(name).map(|entry| entry.value().clone())
    }

    /// Bytes of a stored asset by name.
    pub fn asset_source(&self, name: &str) -> Option<Vec<u8>> {
        self.assets.get(name).map(|entry| entry.source.clone())
    }

    /// Names of all registered assets.
    pub fn asset_names(&self) -> Vec<String> {
        self.assets.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// All tracked file dependencies.
    pub fn file_dependencies(&self) -> Vec<PathBuf> {
        self.file_dependencies
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Store mutations (`emit:<name>` / `update:<name>`) in call order.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

impl BuildHost for MemoryHost {
    fn context_dir(&self) -> &Path {
        &self.context
    }

    fn mode(&self) -> BuildMode {
        self.mode
    }

    fn hash_settings(&self) -> &HashSettings {
        &self.hashing
    }

    fn asset(&self, name: &str) -> Option<AssetInfo> {
        self.assets.get(name).map(|entry| entry.info.clone())
    }

    fn emit_asset(&self, name: &str, source: Vec<u8>, info: AssetInfo) {
        self.journal.lock().push(format!("emit:{name}"));
        self.assets
            .insert(name.to_string(), StoredAsset { source, info });
    }

    fn update_asset(&self, name: &str, source: Vec<u8>, info: AssetInfo) {
        self.journal.lock().push(format!("update:{name}"));
        self.assets
            .insert(name.to_string(), StoredAsset { source, info });
    }

    fn add_file_dependency(&self, path: &Path) {
        self.file_dependencies.insert(path.to_path_buf());
    }
}
