use atom_engine::{AtomConfig, ConfigUpdate};
use clap::{Args, Subcommand};
use ethers_core::types::Address;

use super::{engine_failure, resolve_caller, Context};
use crate::output;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current engine configuration
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update one or more configuration fields
    Set(SetArgs),
}

#[derive(Args)]
pub struct SetArgs {
    /// Caller (defaults to the recorded authority)
    #[arg(long)]
    pub caller: Option<Address>,

    #[arg(long)]
    pub alpha_fast: Option<u8>,
    #[arg(long)]
    pub alpha_slow: Option<u8>,
    #[arg(long)]
    pub alpha_volatility: Option<u8>,
    #[arg(long)]
    pub alpha_arrival: Option<u8>,

    #[arg(long)]
    pub weight_sybil: Option<u8>,
    #[arg(long)]
    pub weight_burst: Option<u8>,
    #[arg(long)]
    pub weight_stagnation: Option<u8>,
    #[arg(long)]
    pub weight_shock: Option<u8>,
    #[arg(long)]
    pub weight_volatility: Option<u8>,
    #[arg(long)]
    pub weight_arrival: Option<u8>,

    #[arg(long)]
    pub diversity_threshold: Option<u8>,
    /// Mean inter-arrival floor in seconds
    #[arg(long)]
    pub burst_threshold: Option<u32>,
    #[arg(long)]
    pub shock_threshold: Option<u16>,
    #[arg(long)]
    pub volatility_threshold: Option<u16>,

    /// Pause or resume score updates
    #[arg(long)]
    pub paused: Option<bool>,
}

impl SetArgs {
    fn update(&self) -> ConfigUpdate {
        ConfigUpdate {
            alpha_fast: self.alpha_fast,
            alpha_slow: self.alpha_slow,
            alpha_volatility: self.alpha_volatility,
            alpha_arrival: self.alpha_arrival,
            weight_sybil: self.weight_sybil,
            weight_burst: self.weight_burst,
            weight_stagnation: self.weight_stagnation,
            weight_shock: self.weight_shock,
            weight_volatility: self.weight_volatility,
            weight_arrival: self.weight_arrival,
            diversity_threshold: self.diversity_threshold,
            burst_threshold: self.burst_threshold,
            shock_threshold: self.shock_threshold,
            volatility_threshold: self.volatility_threshold,
            paused: self.paused,
        }
    }
}

pub fn run(ctx: Context, args: ConfigArgs) -> i32 {
    let mut engine = match ctx.load_engine() {
        Ok(e) => e,
        Err(code) => return code,
    };

    match args.command {
        ConfigCommands::Show { json } => {
            let config = match engine.config() {
                Ok(c) => c,
                Err(e) => return engine_failure(e),
            };
            if json {
                return output::json(config);
            }
            print_config(config);
            0
        }

        ConfigCommands::Set(set) => {
            let update = set.update();
            if update.is_empty() {
                output::warn("Nothing to update.");
                return 0;
            }
            let caller = match resolve_caller(set.caller, ctx.settings.identity.authority, "authority") {
                Ok(c) => c,
                Err(code) => return code,
            };
            match engine.update_config(caller, &update) {
                Ok(config) => output::success(&format!("Config updated to version {}.", config.version)),
                Err(e) => return engine_failure(e),
            }
            ctx.commit(&mut engine)
        }
    }
}

fn print_config(config: &AtomConfig) {
    output::header("Engine configuration");
    output::kv("Authority", &format!("{:?}", config.authority));
    output::kv("Registrar", &format!("{:?}", config.registrar));
    output::kv("Paused", &config.paused.to_string());
    output::kv("Version", &config.version.to_string());
    output::kv(
        "Alphas",
        &format!(
            "fast {} / slow {} / volatility {} / arrival {}",
            config.alpha_fast, config.alpha_slow, config.alpha_volatility, config.alpha_arrival
        ),
    );
    output::kv(
        "Weights",
        &format!(
            "sybil {} / burst {} / stagnation {} / shock {} / volatility {} / arrival {}",
            config.weight_sybil,
            config.weight_burst,
            config.weight_stagnation,
            config.weight_shock,
            config.weight_volatility,
            config.weight_arrival
        ),
    );
    output::kv("Diversity threshold", &format!("{}%", config.diversity_threshold));
    output::kv("Burst threshold", &format!("{}s", config.burst_threshold));
    output::kv("Shock threshold", &config.shock_threshold.to_string());
    output::kv("Volatility threshold", &config.volatility_threshold.to_string());
}
