//! Error types for the ATOM engine.
//!
//! Every variant carries a stable numeric code so hosts can surface a
//! structured failure alongside the human-readable message.

use thiserror::Error;

use crate::address::RecordAddress;
use crate::config::ConfigField;

/// Errors that can occur in engine operations.
///
/// A failed operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomError {
    /// Caller is not the configuration authority (or not the asset owner).
    #[error("Unauthorized: caller is not the authority for this operation")]
    Unauthorized,

    /// Caller is not the registrar recorded in the configuration.
    #[error("Unauthorized caller: only the registered registrar may mutate stats")]
    UnauthorizedCaller,

    /// A record already exists at the derived address.
    #[error("Account already initialized: {0}")]
    AlreadyInitialized(RecordAddress),

    /// A configuration field is outside its bound.
    #[error("Invalid config parameter: {0}")]
    InvalidConfigParameter(ConfigField),

    /// The claimed collection is not an account held by the asset directory.
    #[error("Invalid collection account")]
    InvalidCollection,

    /// The claimed collection is not the agent's canonical collection.
    #[error("Collection mismatch: claimed collection is not the agent's collection")]
    CollectionMismatch,

    /// The agent is not a registered asset.
    #[error("Invalid asset: agent is not registered in the asset directory")]
    InvalidAsset,

    /// Score updates are paused.
    #[error("Engine is paused")]
    EnginePaused,

    /// Arithmetic left its representable range.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// No record lives at the derived address.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordAddress),

    /// The global configuration has not been created yet.
    #[error("Engine config not initialized")]
    ConfigNotInitialized,
}

impl AtomError {
    /// Stable error code, offset like program custom errors.
    pub fn code(&self) -> u32 {
        match self {
            AtomError::Unauthorized => 6000,
            AtomError::UnauthorizedCaller => 6001,
            AtomError::AlreadyInitialized(_) => 6002,
            AtomError::InvalidConfigParameter(_) => 6003,
            AtomError::InvalidCollection => 6004,
            AtomError::CollectionMismatch => 6005,
            AtomError::InvalidAsset => 6006,
            AtomError::EnginePaused => 6007,
            AtomError::ArithmeticOverflow => 6008,
            AtomError::RecordNotFound(_) => 6009,
            AtomError::ConfigNotInitialized => 6010,
        }
    }

    /// Short variant name, as reported by on-chain error logs.
    pub fn name(&self) -> &'static str {
        match self {
            AtomError::Unauthorized => "Unauthorized",
            AtomError::UnauthorizedCaller => "UnauthorizedCaller",
            AtomError::AlreadyInitialized(_) => "AlreadyInitialized",
            AtomError::InvalidConfigParameter(_) => "InvalidConfigParameter",
            AtomError::InvalidCollection => "InvalidCollection",
            AtomError::CollectionMismatch => "CollectionMismatch",
            AtomError::InvalidAsset => "InvalidAsset",
            AtomError::EnginePaused => "EnginePaused",
            AtomError::ArithmeticOverflow => "ArithmeticOverflow",
            AtomError::RecordNotFound(_) => "RecordNotFound",
            AtomError::ConfigNotInitialized => "ConfigNotInitialized",
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AtomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_field() {
        let err = AtomError::InvalidConfigParameter(ConfigField::AlphaFast);
        assert!(err.to_string().contains("alpha_fast"));
        assert_eq!(err.name(), "InvalidConfigParameter");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            AtomError::Unauthorized,
            AtomError::UnauthorizedCaller,
            AtomError::AlreadyInitialized(RecordAddress::default()),
            AtomError::InvalidConfigParameter(ConfigField::Paused),
            AtomError::InvalidCollection,
            AtomError::CollectionMismatch,
            AtomError::InvalidAsset,
            AtomError::EnginePaused,
            AtomError::ArithmeticOverflow,
            AtomError::RecordNotFound(RecordAddress::default()),
            AtomError::ConfigNotInitialized,
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
