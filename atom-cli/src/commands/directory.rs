use atom_engine::DirectoryAccount;
use clap::{Args, Subcommand};
use ethers_core::types::Address;

use super::{state_failure, Context};
use crate::output;

#[derive(Args)]
pub struct DirectoryArgs {
    #[command(subcommand)]
    pub command: DirectoryCommands,
}

#[derive(Subcommand)]
pub enum DirectoryCommands {
    /// Register a collection account
    AddCollection {
        /// Collection address
        collection: Address,
    },
    /// Register an agent into a collection
    AddAsset {
        /// Agent (asset) address
        #[arg(short, long)]
        asset: Address,
        /// Owner of the agent
        #[arg(short, long)]
        owner: Address,
        /// Collection the agent belongs to
        #[arg(short, long)]
        collection: Address,
    },
    /// List all accounts in the directory
    List,
}

pub fn run(ctx: Context, args: DirectoryArgs) -> i32 {
    let mut directory = match ctx.state.load_directory() {
        Ok(d) => d,
        Err(e) => return state_failure(e),
    };

    match args.command {
        DirectoryCommands::AddCollection { collection } => {
            directory.add_collection(collection);
            output::success(&format!("Added collection {:?}.", collection));
        }

        DirectoryCommands::AddAsset { asset, owner, collection } => {
            if !matches!(directory.accounts.get(&collection), Some(DirectoryAccount::Collection)) {
                output::warn(&format!("{:?} is not a known collection.", collection));
            }
            directory.add_asset(asset, owner, collection);
            output::success(&format!("Added agent {:?} (owner {:?}).", asset, owner));
        }

        DirectoryCommands::List => {
            if directory.is_empty() {
                output::info("Directory is empty.");
            } else {
                output::info(&format!("Directory contains {} accounts:", directory.len()));
                println!("{:<44} | {:<10} | {:<44} | {:<44}", "Account", "Kind", "Owner", "Collection");
                println!("{:-<44}-+-{:-<10}-+-{:-<44}-+-{:-<44}", "", "", "", "");
                for (address, account) in &directory.accounts {
                    match account {
                        DirectoryAccount::Collection => {
                            println!("{:<44} | {:<10} | {:<44} | {:<44}", format!("{:?}", address), "collection", "-", "-");
                        }
                        DirectoryAccount::Asset { owner, collection } => {
                            println!(
                                "{:<44} | {:<10} | {:<44} | {:<44}",
                                format!("{:?}", address),
                                "asset",
                                format!("{:?}", owner),
                                format!("{:?}", collection)
                            );
                        }
                    }
                }
            }
            return 0;
        }
    }

    if let Err(e) = ctx.state.save_directory(&directory) {
        return state_failure(e);
    }
    0
}
