//! Authorization and validity checks run before every mutation.

use ethers_core::types::Address;
use tracing::warn;

use crate::config::AtomConfig;
use crate::directory::AssetDirectory;
use crate::error::{AtomError, Result};

/// Only the configuration authority may pass.
pub fn require_authority(config: &AtomConfig, caller: &Address) -> Result<()> {
    if *caller != config.authority {
        warn!(?caller, "rejected config mutation from non-authority");
        return Err(AtomError::Unauthorized);
    }
    Ok(())
}

/// Only the recorded registrar may pass.
pub fn require_registrar(config: &AtomConfig, caller: &Address) -> Result<()> {
    if *caller != config.registrar {
        warn!(?caller, "rejected stats mutation from unknown caller");
        return Err(AtomError::UnauthorizedCaller);
    }
    Ok(())
}

/// Rejects score updates while paused.
pub fn require_active(config: &AtomConfig) -> Result<()> {
    if config.paused {
        return Err(AtomError::EnginePaused);
    }
    Ok(())
}

/// Verifies the agent ↔ collection ↔ owner relationship against the
/// directory before a stats record may be created.
///
/// Order matters: an account the directory does not hold is an invalid
/// collection; a directory account that is not the agent's collection (the
/// asset itself, say) is a mismatch.
pub fn validate_asset_binding<D: AssetDirectory + ?Sized>(
    directory: &D,
    owner: &Address,
    agent: &Address,
    claimed_collection: &Address,
) -> Result<()> {
    if directory.account(claimed_collection).is_none() {
        return Err(AtomError::InvalidCollection);
    }

    let canonical = directory
        .canonical_collection(agent)
        .ok_or(AtomError::InvalidAsset)?;
    if canonical != *claimed_collection {
        return Err(AtomError::CollectionMismatch);
    }

    match directory.owner_of(agent) {
        Some(recorded) if recorded == *owner => Ok(()),
        _ => Err(AtomError::Unauthorized),
    }
}
