//! Asset directory: the registrar's authoritative view of agents.
//!
//! The engine never registers agents itself. Before a stats record is created
//! it asks an `AssetDirectory` which accounts exist, which collection an agent
//! belongs to, and who owns it.

use std::collections::BTreeMap;

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

/// An account held by the asset directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectoryAccount {
    /// A collection that agents are minted into.
    Collection,
    /// A registered agent.
    Asset { owner: Address, collection: Address },
}

/// Read-only view over the registrar's account data.
pub trait AssetDirectory {
    /// Looks up an account held by the directory.
    fn account(&self, address: &Address) -> Option<DirectoryAccount>;

    /// Canonical collection of a registered agent.
    fn canonical_collection(&self, agent: &Address) -> Option<Address> {
        match self.account(agent) {
            Some(DirectoryAccount::Asset { collection, .. }) => Some(collection),
            _ => None,
        }
    }

    /// Recorded owner of a registered agent.
    fn owner_of(&self, agent: &Address) -> Option<Address> {
        match self.account(agent) {
            Some(DirectoryAccount::Asset { owner, .. }) => Some(owner),
            _ => None,
        }
    }
}

/// In-memory directory, used by the CLI and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryDirectory {
    pub accounts: BTreeMap<Address, DirectoryAccount>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection account.
    pub fn add_collection(&mut self, collection: Address) {
        self.accounts.insert(collection, DirectoryAccount::Collection);
    }

    /// Registers an agent into a collection.
    pub fn add_asset(&mut self, asset: Address, owner: Address, collection: Address) {
        self.accounts
            .insert(asset, DirectoryAccount::Asset { owner, collection });
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AssetDirectory for InMemoryDirectory {
    fn account(&self, address: &Address) -> Option<DirectoryAccount> {
        self.accounts.get(address).cloned()
    }
}
