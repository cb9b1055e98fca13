//! Chain identifiers and the per-chain parameter table.
//!
//! A [`Chain`] is only a partition key into the dataset. Everything that
//! differs between chains lives in [`ChainRegistry`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::ChecksumScheme;

pub const ETHEREUM: &str = "ethereum";
pub const CLASSIC: &str = "classic";
pub const POA: &str = "poa";
pub const TOMOCHAIN: &str = "tomochain";
pub const GOCHAIN: &str = "gochain";
pub const WANCHAIN: &str = "wanchain";
pub const THUNDERTOKEN: &str = "thundertoken";
pub const CALLISTO: &str = "callisto";
pub const SMARTCHAIN: &str = "smartchain";
pub const ROOTSTOCK: &str = "rootstock";

pub const BINANCE: &str = "binance";
pub const COSMOS: &str = "cosmos";
pub const HARMONY: &str = "harmony";
pub const IOTEX: &str = "iotex";
pub const KAVA: &str = "kava";
pub const TERRA: &str = "terra";
pub const TEZOS: &str = "tezos";
pub const TRON: &str = "tron";
pub const WAVES: &str = "waves";

/// Opaque chain identifier (directory name under `chains/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(String);

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Chain(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Chain {
    fn from(name: &str) -> Self {
        Chain::new(name)
    }
}

/// An Ethereum-style chain and the checksum scheme its asset directories use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthForkChain {
    pub chain: Chain,
    pub scheme: ChecksumScheme,
}

/// Static table of per-chain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRegistry {
    eth_forks: Vec<EthForkChain>,
    staking_chains: Vec<Chain>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        let eip55 = [
            ETHEREUM,
            CLASSIC,
            POA,
            TOMOCHAIN,
            GOCHAIN,
            WANCHAIN,
            THUNDERTOKEN,
            CALLISTO,
            SMARTCHAIN,
        ];
        let mut eth_forks: Vec<EthForkChain> = eip55
            .iter()
            .map(|name| EthForkChain {
                chain: Chain::from(*name),
                scheme: ChecksumScheme::Eip55,
            })
            .collect();
        eth_forks.push(EthForkChain {
            chain: Chain::from(ROOTSTOCK),
            scheme: ChecksumScheme::Eip1191 { chain_id: 30 },
        });

        let staking_chains = [COSMOS, HARMONY, IOTEX, KAVA, TERRA, TEZOS, TRON, WAVES]
            .iter()
            .map(|name| Chain::from(*name))
            .collect();

        Self {
            eth_forks,
            staking_chains,
        }
    }
}

impl ChainRegistry {
    /// Registry with no chains at all; build it up with the `with_*` methods.
    pub fn empty() -> Self {
        Self {
            eth_forks: Vec::new(),
            staking_chains: Vec::new(),
        }
    }

    /// Register (or re-parameterise) an Ethereum-style chain.
    pub fn with_eth_fork(mut self, chain: impl Into<Chain>, scheme: ChecksumScheme) -> Self {
        let chain = chain.into();
        self.eth_forks.retain(|f| f.chain != chain);
        self.eth_forks.push(EthForkChain { chain, scheme });
        self
    }

    /// Register a chain that carries a validator list.
    pub fn with_staking_chain(mut self, chain: impl Into<Chain>) -> Self {
        let chain = chain.into();
        if !self.staking_chains.contains(&chain) {
            self.staking_chains.push(chain);
        }
        self
    }

    pub fn eth_forks(&self) -> &[EthForkChain] {
        &self.eth_forks
    }

    pub fn staking_chains(&self) -> &[Chain] {
        &self.staking_chains
    }

    /// Checksum scheme for `chain`, if it is an Ethereum-style chain.
    pub fn checksum_scheme(&self, chain: &Chain) -> Option<ChecksumScheme> {
        self.eth_forks
            .iter()
            .find(|f| &f.chain == chain)
            .map(|f| f.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_schemes() {
        let registry = ChainRegistry::default();
        assert_eq!(
            registry.checksum_scheme(&Chain::from(ETHEREUM)),
            Some(ChecksumScheme::Eip55)
        );
        assert_eq!(
            registry.checksum_scheme(&Chain::from(ROOTSTOCK)),
            Some(ChecksumScheme::Eip1191 { chain_id: 30 })
        );
        assert_eq!(registry.checksum_scheme(&Chain::from(TRON)), None);
        assert_eq!(registry.staking_chains().len(), 8);
    }

    #[test]
    fn test_with_eth_fork_replaces_existing() {
        let registry = ChainRegistry::empty()
            .with_eth_fork(ETHEREUM, ChecksumScheme::Eip55)
            .with_eth_fork(ETHEREUM, ChecksumScheme::Eip1191 { chain_id: 1 });
        assert_eq!(registry.eth_forks().len(), 1);
        assert_eq!(
            registry.checksum_scheme(&Chain::from(ETHEREUM)),
            Some(ChecksumScheme::Eip1191 { chain_id: 1 })
        );
    }

    #[test]
    fn test_chain_serializes_as_plain_string() {
        let json = serde_json::to_string(&Chain::from(TEZOS)).unwrap();
        assert_eq!(json, "\"tezos\"");
    }
}
