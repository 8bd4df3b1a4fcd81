use atom_engine::{config_address, stats_address};
use clap::{Args, Subcommand};
use ethers_core::types::Address;

use crate::output;

#[derive(Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub command: AddressCommands,
}

#[derive(Subcommand)]
pub enum AddressCommands {
    /// Derived address of the config record
    Config,
    /// Derived address of an agent's stats record
    Stats {
        /// Agent (asset) address
        agent: Address,
    },
}

/// Pure derivation; touches no state.
pub fn run(args: AddressArgs) -> i32 {
    let address = match args.command {
        AddressCommands::Config => config_address(),
        AddressCommands::Stats { agent } => stats_address(&agent),
    };
    println!("{}", address);
    output::hint("Derived as keccak256(\"atom_engine\" ‖ seed ‖ key).");
    0
}
