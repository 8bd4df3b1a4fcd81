//! CLI settings (`atom.toml`) and logging setup.

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Persisted CLI settings.
///
/// ```toml
/// [identity]
/// authority = "0x1111111111111111111111111111111111111111"
/// registrar = "0x2222222222222222222222222222222222222222"
///
/// [logging]
/// level = "info"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub identity: Identity,
    pub logging: Logging,
}

/// Default callers used when a command is not given `--caller`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over everything else,
/// then `--log-level`, then the settings file. Logs go to stderr.
pub fn init_logging(cli_level: Option<&str>, logging: &Logging) {
    let level = cli_level.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("atom={level},atom_engine={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Ignore a second init; the subscriber is process-global.
    let _ = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
