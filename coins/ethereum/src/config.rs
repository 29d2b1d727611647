//! Adapter configuration, loaded once at startup.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xbridge_traits::{normalize_hash, ChainId, ChainInfo, WalletKind};

/// Configuration could not be read or is inconsistent.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for [`AdapterConfig`]
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but describes an impossible setup
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A token known to the static token registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Chain the token lives on
    pub chain_id: ChainId,
    /// Contract hash, hex with or without prefix
    pub hash: String,
    /// Display symbol
    pub symbol: String,
    /// Fixed-point precision
    pub decimals: u8,
}

/// Everything the adapter needs to know that is not discovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Wallet the adapter binds to
    #[serde(default)]
    pub wallet: WalletKind,
    /// EVM network id to logical bridge chain id
    #[serde(default = "default_network_chain_ids")]
    pub network_chain_ids: BTreeMap<u64, ChainId>,
    /// Chains and their bridge contracts
    #[serde(default)]
    pub chains: Vec<ChainInfo>,
    /// Tokens and their precision
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

fn default_network_chain_ids() -> BTreeMap<u64, ChainId> {
    // ethereum, bsc, heco, okex, polygon
    [(1, 2), (56, 6), (128, 7), (66, 12), (137, 17)]
        .into_iter()
        .map(|(network, chain)| (network, ChainId(chain)))
        .collect()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            wallet: WalletKind::default(),
            network_chain_ids: default_network_chain_ids(),
            chains: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

fn is_hex_address(hash: &str) -> bool {
    let hash = normalize_hash(hash);
    hash.len() == 40 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

impl AdapterConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks contract hashes and rejects duplicate entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chains = HashSet::new();
        for chain in &self.chains {
            if !chains.insert(chain.chain_id) {
                return Err(ConfigError::Invalid(format!(
                    "chain {} listed twice",
                    chain.chain_id
                )));
            }
            let contracts = std::iter::once(&chain.lock_contract_hash)
                .chain(chain.nft_lock_contract_hash.as_ref());
            for hash in contracts {
                if !is_hex_address(hash) {
                    return Err(ConfigError::Invalid(format!(
                        "chain {}: '{hash}' is not a contract address",
                        chain.chain_id
                    )));
                }
            }
        }

        let mut tokens = HashSet::new();
        for token in &self.tokens {
            if !is_hex_address(&token.hash) {
                return Err(ConfigError::Invalid(format!(
                    "token {}: '{}' is not a contract address",
                    token.symbol, token.hash
                )));
            }
            if !tokens.insert((token.chain_id, normalize_hash(&token.hash))) {
                return Err(ConfigError::Invalid(format!(
                    "token {} on chain {} listed twice",
                    token.hash, token.chain_id
                )));
            }
        }
        Ok(())
    }

    /// The network id table as a lookup helper.
    pub fn network_table(&self) -> NetworkTable {
        NetworkTable::new(self.network_chain_ids.clone())
    }
}

/// Maps the network ids a provider reports to logical chain ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkTable {
    entries: BTreeMap<u64, ChainId>,
}

impl NetworkTable {
    /// Creates a table from explicit entries.
    pub fn new(entries: BTreeMap<u64, ChainId>) -> Self {
        Self { entries }
    }

    /// Looks up a numeric network id.
    pub fn chain_id(&self, network_id: u64) -> Option<ChainId> {
        self.entries.get(&network_id).copied()
    }

    /// Looks up a network id as sent by the provider.
    ///
    /// Hex (`0x38`) and decimal (`56`) forms are accepted. Unknown or
    /// unparseable ids map to `None`.
    pub fn resolve(&self, network_id: &str) -> Option<ChainId> {
        let id = network_id.trim();
        let parsed = match id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => id.parse::<u64>().ok(),
        };
        parsed.and_then(|n| self.chain_id(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "wallet": "BinanceChain",
        "networkChainIds": { "97": 79 },
        "chains": [
            {
                "chainId": 79,
                "lockContractHash": "0x1111111111111111111111111111111111111111",
                "nftLockContractHash": "2222222222222222222222222222222222222222",
                "nftFeeName": "BNB"
            }
        ],
        "tokens": [
            { "chainId": 79, "hash": "0000000000000000000000000000000000000000", "symbol": "BNB", "decimals": 18 }
        ]
    }"#;

    #[test]
    fn test_default_network_table() {
        let table = AdapterConfig::default().network_table();
        assert_eq!(table.resolve("0x1"), Some(ChainId(2)));
        assert_eq!(table.resolve("0x38"), Some(ChainId(6)));
        assert_eq!(table.resolve("0x80"), Some(ChainId(7)));
        assert_eq!(table.resolve("0x42"), Some(ChainId(12)));
        assert_eq!(table.resolve("0x89"), Some(ChainId(17)));
        assert_eq!(table.resolve("137"), Some(ChainId(17)));
    }

    #[test]
    fn test_unknown_network_is_absent() {
        let table = AdapterConfig::default().network_table();
        assert_eq!(table.resolve("0x2a"), None);
        assert_eq!(table.resolve("not-a-number"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn test_from_json() {
        let config = AdapterConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.wallet, WalletKind::BinanceChain);
        assert_eq!(config.network_table().resolve("0x61"), Some(ChainId(79)));
        assert_eq!(config.network_table().resolve("0x1"), None);
        assert_eq!(config.chains[0].nft_fee_name.as_deref(), Some("BNB"));
        assert_eq!(config.tokens[0].decimals, 18);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config = AdapterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AdapterConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adapter.json");
        std::fs::write(&path, CONFIG).unwrap();
        let config = AdapterConfig::load(&path).unwrap();
        assert_eq!(config.chains.len(), 1);

        let missing = AdapterConfig::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            AdapterConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_chain() {
        let mut config = AdapterConfig::from_json_str(CONFIG).unwrap();
        config.chains.push(config.chains[0].clone());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_contract_hash() {
        let json = CONFIG.replace("0x1111111111111111111111111111111111111111", "0x1234");
        assert!(matches!(
            AdapterConfig::from_json_str(&json),
            Err(ConfigError::Invalid(_))
        ));
    }
}
