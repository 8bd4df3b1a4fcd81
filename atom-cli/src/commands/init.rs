use clap::Args;
use ethers_core::types::Address;

use super::{engine_failure, state_failure, Context};
use crate::output;

#[derive(Args)]
pub struct InitArgs {
    /// Account allowed to change the engine configuration
    #[arg(short, long)]
    pub authority: Address,

    /// Account allowed to mutate stats records
    #[arg(short, long)]
    pub registrar: Address,
}

pub fn run(ctx: Context, args: InitArgs) -> i32 {
    let mut engine = match ctx.load_engine() {
        Ok(e) => e,
        Err(code) => return code,
    };

    let address = match engine.initialize_config(args.authority, args.registrar) {
        Ok(a) => a,
        Err(e) => return engine_failure(e),
    };

    // Settings name the identities, so they are written only once the
    // engine record they describe is on disk.
    if let Err(e) = ctx.state.save_engine(&engine) {
        return state_failure(e);
    }
    let mut settings = ctx.settings.clone();
    settings.identity.authority = Some(args.authority);
    settings.identity.registrar = Some(args.registrar);
    if let Err(e) = ctx.state.save_settings(&settings) {
        return state_failure(e);
    }

    output::success(&format!("Engine initialized in {}", ctx.state.root().display()));
    output::kv("Config", &address.to_string());
    output::kv("Authority", &format!("{:?}", args.authority));
    output::kv("Registrar", &format!("{:?}", args.registrar));
    output::events(&engine.take_events());
    0
}
