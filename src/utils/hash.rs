//! Content hashing for asset fingerprints.
//!
//! Two hashers, picked by [`HashSettings`](crate::host::HashSettings):
//! - `rustc_hash::FxHasher` for a fast, deterministic 64-bit digest
//! - `blake3` when a cryptographic content hash is wanted (the default)
//!
//! Both return lowercase hex so digests can be spliced into file names.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Compute 64-bit FxHash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// 16 hex chars of FxHash, salt mixed in before the content.
pub fn fx_hex(salt: Option<&[u8]>, data: &[u8]) -> String {
    let mut hasher = FxHasher::default();
    if let Some(salt) = salt {
        hasher.write(salt);
    }
    hasher.write(data);
    format!("{:016x}", hasher.finish())
}

/// 64 hex chars of Blake3, salt mixed in before the content.
pub fn blake3_hex(salt: Option<&[u8]>, data: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    if let Some(salt) = salt {
        hasher.update(salt);
    }
    hasher.update(data);
    hex::encode(hasher.finalize().as_bytes())
}
