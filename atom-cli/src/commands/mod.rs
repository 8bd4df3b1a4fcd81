//! CLI command implementations.

pub mod address;
pub mod config;
pub mod directory;
pub mod init;
pub mod stats;

use atom_engine::{AtomEngine, AtomError};
use ethers_core::types::Address;

use crate::output;
use crate::settings::Settings;
use crate::state::{StateDir, StateError};

/// Shared command context.
pub struct Context {
    pub state: StateDir,
    pub settings: Settings,
}

impl Context {
    pub fn load_engine(&self) -> Result<AtomEngine, i32> {
        self.state.load_engine().map_err(state_failure)
    }

    /// Persists the engine and prints the events the call emitted.
    pub fn commit(&self, engine: &mut AtomEngine) -> i32 {
        if let Err(e) = self.state.save_engine(engine) {
            return state_failure(e);
        }
        output::events(&engine.take_events());
        0
    }
}

/// Picks the explicit caller, falling back to the configured identity.
pub fn resolve_caller(explicit: Option<Address>, configured: Option<Address>, role: &str) -> Result<Address, i32> {
    explicit.or(configured).ok_or_else(|| {
        output::error(&format!("No {} identity configured.", role));
        output::hint(&format!("Pass --caller or run `atom init` to record the {}.", role));
        1
    })
}

pub fn state_failure(err: StateError) -> i32 {
    output::error(&err.to_string());
    1
}

pub fn engine_failure(err: AtomError) -> i32 {
    output::engine_error(&err);
    1
}
