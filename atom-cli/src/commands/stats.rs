use std::path::PathBuf;

use atom_engine::{AtomStats, StatsEvent, TrustSnapshot};
use clap::{Args, Subcommand};
use ethers_core::types::Address;
use serde::Serialize;
use tracing::info;

use super::{engine_failure, resolve_caller, state_failure, Context};
use crate::output;

#[derive(Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommands,
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Create the stats record for a registered agent
    Init {
        /// Agent (asset) address
        #[arg(short, long)]
        agent: Address,
        /// Owner signing the request
        #[arg(short, long)]
        owner: Address,
        /// Collection the agent claims to belong to
        #[arg(short, long)]
        collection: Address,
    },
    /// Apply one feedback event
    Update {
        #[arg(short, long)]
        agent: Address,
        /// Client giving the feedback
        #[arg(long)]
        counterpart: Address,
        /// Feedback score, 0-100 (larger values saturate)
        #[arg(short, long)]
        score: u64,
        /// Unix timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<u64>,
        /// Caller (defaults to the recorded registrar)
        #[arg(long)]
        caller: Option<Address>,
    },
    /// Apply a JSON array of events in order; all or nothing
    Replay {
        #[arg(short, long)]
        agent: Address,
        /// File holding `[{"counterpart": "0x..", "magnitude": 90, "timestamp": 1700000000}, ..]`
        file: PathBuf,
        #[arg(long)]
        caller: Option<Address>,
    },
    /// Show a stats record and its current trust snapshot
    Show {
        #[arg(short, long)]
        agent: Address,
        /// Evaluate the snapshot at this unix time (defaults to now)
        #[arg(long)]
        now: Option<u64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a recent counterpart's feedback revoked
    RevokeFeedback {
        #[arg(short, long)]
        agent: Address,
        /// Client whose feedback is revoked
        #[arg(long)]
        counterpart: Address,
        #[arg(long)]
        caller: Option<Address>,
    },
    /// Close an agent's stats record
    Revoke {
        #[arg(short, long)]
        agent: Address,
        #[arg(long)]
        caller: Option<Address>,
    },
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    stats: &'a AtomStats,
    snapshot: &'a TrustSnapshot,
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

pub fn run(ctx: Context, args: StatsArgs) -> i32 {
    let mut engine = match ctx.load_engine() {
        Ok(e) => e,
        Err(code) => return code,
    };
    let registrar = ctx.settings.identity.registrar;

    match args.command {
        StatsCommands::Init { agent, owner, collection } => {
            let directory = match ctx.state.load_directory() {
                Ok(d) => d,
                Err(e) => return state_failure(e),
            };
            match engine.initialize_stats(owner, agent, collection, &directory) {
                Ok(address) => {
                    output::success(&format!("Stats record created for {:?}.", agent));
                    output::kv("Record", &address.to_string());
                }
                Err(e) => return engine_failure(e),
            }
        }

        StatsCommands::Update { agent, counterpart, score, timestamp, caller } => {
            let caller = match resolve_caller(caller, registrar, "registrar") {
                Ok(c) => c,
                Err(code) => return code,
            };
            let event = StatsEvent::new(counterpart, score, timestamp.unwrap_or_else(unix_now));
            match engine.update_stats(caller, agent, &event) {
                Ok(stats) => output::success(&format!(
                    "Event #{} applied: trust {} (tier {}), risk {}.",
                    stats.event_count, stats.trust_score, stats.trust_tier, stats.risk_score
                )),
                Err(e) => return engine_failure(e),
            }
        }

        StatsCommands::Replay { agent, file, caller } => {
            let caller = match resolve_caller(caller, registrar, "registrar") {
                Ok(c) => c,
                Err(code) => return code,
            };
            let content = match std::fs::read_to_string(&file) {
                Ok(c) => c,
                Err(e) => {
                    output::error(&format!("Failed to read file {}: {}", file.display(), e));
                    return 1;
                }
            };
            let events: Vec<StatsEvent> = match serde_json::from_str(&content) {
                Ok(v) => v,
                Err(e) => {
                    output::error(&format!("Failed to parse events: {}", e));
                    return 1;
                }
            };

            // Nothing is saved unless every event applies.
            for (index, event) in events.iter().enumerate() {
                if let Err(e) = engine.update_stats(caller, agent, event) {
                    output::error(&format!("Event {} rejected; nothing was saved.", index));
                    return engine_failure(e);
                }
            }
            info!(count = events.len(), "replayed events");

            match engine.stats(&agent) {
                Ok(stats) => output::success(&format!(
                    "Replayed {} events: trust {} (tier {}), risk {}.",
                    events.len(),
                    stats.trust_score,
                    stats.trust_tier,
                    stats.risk_score
                )),
                Err(e) => return engine_failure(e),
            }
        }

        StatsCommands::Show { agent, now, json } => {
            let now = now.unwrap_or_else(unix_now);
            let stats = match engine.stats(&agent) {
                Ok(s) => s,
                Err(e) => return engine_failure(e),
            };
            let snapshot = match engine.trust_snapshot(&agent, now) {
                Ok(s) => s,
                Err(e) => return engine_failure(e),
            };
            if json {
                return output::json(&ShowOutput {
                    stats,
                    snapshot: &snapshot,
                });
            }
            output::stats(stats);
            output::snapshot(&snapshot);
            return 0;
        }

        StatsCommands::RevokeFeedback { agent, counterpart, caller } => {
            let caller = match resolve_caller(caller, registrar, "registrar") {
                Ok(c) => c,
                Err(code) => return code,
            };
            match engine.revoke_feedback(caller, agent, counterpart) {
                Ok(true) => output::success(&format!("Feedback from {:?} revoked.", counterpart)),
                Ok(false) => {
                    output::warn(&format!("No recent feedback from {:?} to revoke.", counterpart));
                    return 0;
                }
                Err(e) => return engine_failure(e),
            }
        }

        StatsCommands::Revoke { agent, caller } => {
            let caller = match resolve_caller(caller, registrar, "registrar") {
                Ok(c) => c,
                Err(code) => return code,
            };
            match engine.revoke_stats(caller, agent) {
                Ok(removed) => output::success(&format!(
                    "Revoked stats for {:?} after {} events.",
                    agent, removed.event_count
                )),
                Err(e) => return engine_failure(e),
            }
        }
    }

    ctx.commit(&mut engine)
}
