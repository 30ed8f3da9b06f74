//! Host build system collaborators.
//!
//! The pipeline never talks to the filesystem-as-output or a dependency
//! graph directly: everything it needs from the surrounding build system
//! goes through [`BuildHost`]. A concrete in-memory implementation,
//! [`MemoryHost`], ships for tests and standalone embedding.

mod memory;

pub use memory::{MemoryHost, StoredAsset};

use std::path::Path;

use crate::core::BuildMode;
use crate::utils::hash;

// ============================================================================
// AssetInfo
// ============================================================================

/// Metadata attached to an emitted asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetInfo {
    /// Output was serialized without whitespace.
    pub minimized: bool,
    /// Name contains a content hash, so the content never changes for a
    /// given name (safe to cache forever).
    pub immutable: bool,
    /// The content hash substituted into the name, when hashed.
    pub content_hash: Option<String>,
}

// ============================================================================
// Hashing
// ============================================================================

/// Hash algorithm for content digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// Cryptographic, collision-resistant. The default.
    #[default]
    Blake3,
    /// Fast 64-bit FxHash for builds where speed beats collision margin.
    Fx64,
}

/// Host-wide content hashing configuration.
///
/// Inherited by every hash-templated destination; the salt is mixed in
/// before the content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSettings {
    pub algorithm: HashAlgorithm,
    /// Hex chars kept when substituting a digest into a name.
    pub digest_length: usize,
    /// Optional salt, e.g. to force cache invalidation across releases.
    pub salt: Option<String>,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Blake3,
            digest_length: 8,
            salt: None,
        }
    }
}

impl HashSettings {
    /// Digest of `data` truncated to the configured length.
    pub fn digest(&self, data: &[u8]) -> String {
        self.digest_truncated(data, self.digest_length)
    }

    /// Digest of `data` truncated to `length` hex chars.
    pub fn digest_truncated(&self, data: &[u8], length: usize) -> String {
        let salt = self.salt.as_deref().map(str::as_bytes);
        let mut digest = match self.algorithm {
            HashAlgorithm::Blake3 => hash::blake3_hex(salt, data),
            HashAlgorithm::Fx64 => hash::fx_hex(salt, data),
        };
        digest.truncate(length);
        digest
    }
}

// ============================================================================
// BuildHost
// ============================================================================

/// Services the merge pipeline requires from the host build system.
///
/// The asset store is check-then-act per group: the pipeline calls
/// [`asset`](Self::asset) before deciding between
/// [`emit_asset`](Self::emit_asset) and [`update_asset`](Self::update_asset).
/// The file-dependency tracker has append-only set semantics, so concurrent
/// adds from different groups need no ordering.
pub trait BuildHost: Send + Sync {
    /// Build context directory, the default `cwd` for input resolution.
    fn context_dir(&self) -> &Path;

    /// Current build mode (drives the `auto` minify policy).
    fn mode(&self) -> BuildMode;

    /// Host-wide content hashing configuration.
    fn hash_settings(&self) -> &HashSettings;

    /// Metadata of an already-registered asset, if any.
    fn asset(&self, name: &str) -> Option<AssetInfo>;

    /// Register a new asset.
    fn emit_asset(&self, name: &str, source: Vec<u8>, info: AssetInfo);

    /// Replace an existing asset's content and metadata.
    fn update_asset(&self, name: &str, source: Vec<u8>, info: AssetInfo);

    /// Record an input path so the host rebuilds when it changes.
    /// Append-only set semantics.
    fn add_file_dependency(&self, path: &Path);
}
