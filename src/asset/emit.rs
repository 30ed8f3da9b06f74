//! Asset emission with collision handling.
//!
//! Check-then-act against the host asset store, once per group per build
//! pass: an existing asset is skipped (with a warning) unless `force` is
//! set, in which case it is overwritten in place.

use crate::host::{AssetInfo, BuildHost};
use crate::log;

/// A serialized, named artifact ready for registration.
#[derive(Debug, Clone)]
pub struct PreparedAsset {
    pub name: String,
    pub source: Vec<u8>,
    pub info: AssetInfo,
}

/// What the emitter did with a prepared asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Registered as a new asset.
    Emitted { name: String },
    /// Overwrote an existing asset (`force`).
    Updated { name: String },
    /// Left an existing asset untouched (no `force`).
    Skipped { name: String },
}

impl EmitOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Emitted { name } | Self::Updated { name } | Self::Skipped { name } => name,
        }
    }
}

/// Register `asset` with the host, honoring the overwrite policy.
pub fn emit(host: &dyn BuildHost, asset: PreparedAsset, force: bool) -> EmitOutcome {
    let PreparedAsset { name, source, info } = asset;

    if host.asset(&name).is_some() {
        if force {
            host.update_asset(&name, source, info);
            log!("emit"; "file updated: `{name}`");
            return EmitOutcome::Updated { name };
        }

        log!("warning"; "skipping `{name}`: asset already exists");
        return EmitOutcome::Skipped { name };
    }

    host.emit_asset(&name, source, info);
    log!("emit"; "file written to `{name}`");
    EmitOutcome::Emitted { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn prepared(name: &str, content: &[u8]) -> PreparedAsset {
        PreparedAsset {
            name: name.to_string(),
            source: content.to_vec(),
            info: AssetInfo::default(),
        }
    }

    #[test]
    fn test_emit_new_asset() {
        let host = MemoryHost::new("/ctx");
        let outcome = emit(&host, prepared("out.json", b"{}"), false);

        assert_eq!(
            outcome,
            EmitOutcome::Emitted {
                name: "out.json".into()
            }
        );
        assert_eq!(host.asset_source("out.json").unwrap(), b"{}");
    }

    #[test]
    fn test_existing_asset_skipped_without_force() {
        let host = MemoryHost::new("/ctx");
        emit(&host, prepared("out.json", b"first"), false);
        let outcome = emit(&host, prepared("out.json", b"second"), false);

        assert_eq!(
            outcome,
            EmitOutcome::Skipped {
                name: "out.json".into()
            }
        );
        // Original bytes untouched.
        assert_eq!(host.asset_source("out.json").unwrap(), b"first");
    }

    #[test]
    fn test_existing_asset_overwritten_with_force() {
        let host = MemoryHost::new("/ctx");
        emit(&host, prepared("out.json", b"first"), true);
        let outcome = emit(&host, prepared("out.json", b"second"), true);

        assert_eq!(
            outcome,
            EmitOutcome::Updated {
                name: "out.json".into()
            }
        );
        assert_eq!(host.asset_source("out.json").unwrap(), b"second");
        assert_eq!(host.journal(), vec!["emit:out.json", "update:out.json"]);
    }
}
