//! Config-backed token and chain registries, and the EVM address codec.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::primitives::Address;
use async_trait::async_trait;
use xbridge_error::{CodecError, LookupError};
use xbridge_traits::{
    normalize_hash, AddressCodec, ChainId, ChainInfo, ChainRegistry, TokenBasic, TokenRegistry,
    WalletKind,
};

use crate::config::AdapterConfig;

/// Token registry holding a fixed token list.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    tokens: HashMap<(ChainId, String), TokenBasic>,
}

impl StaticTokenRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from the config's token list.
    pub fn from_config(config: &AdapterConfig) -> Self {
        let mut registry = Self::new();
        for token in &config.tokens {
            registry.add_token(
                token.chain_id,
                &token.hash,
                TokenBasic {
                    symbol: token.symbol.clone(),
                    decimals: token.decimals,
                },
            );
        }
        registry
    }

    /// Add a token to the registry
    pub fn add_token(&mut self, chain_id: ChainId, token_hash: &str, token: TokenBasic) {
        self.tokens.insert((chain_id, normalize_hash(token_hash)), token);
    }

    /// Number of registered tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is registered
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenRegistry for StaticTokenRegistry {
    async fn token_basic(&self, chain_id: ChainId, token_hash: &str) -> Result<TokenBasic, LookupError> {
        self.tokens
            .get(&(chain_id, normalize_hash(token_hash)))
            .cloned()
            .ok_or_else(|| LookupError::TokenNotFound {
                chain_id: chain_id.0,
                token_hash: token_hash.to_string(),
            })
    }
}

/// Chain registry holding a fixed chain list.
#[derive(Debug, Clone, Default)]
pub struct StaticChainRegistry {
    chains: HashMap<ChainId, ChainInfo>,
}

impl StaticChainRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from the config's chain list.
    pub fn from_config(config: &AdapterConfig) -> Self {
        let mut registry = Self::new();
        for chain in &config.chains {
            registry.add_chain(chain.clone());
        }
        registry
    }

    /// Adds or replaces a chain.
    pub fn add_chain(&mut self, chain: ChainInfo) {
        self.chains.insert(chain.chain_id, chain);
    }
}

#[async_trait]
impl ChainRegistry for StaticChainRegistry {
    async fn chain(&self, chain_id: ChainId) -> Result<ChainInfo, LookupError> {
        self.chains
            .get(&chain_id)
            .cloned()
            .ok_or(LookupError::ChainNotFound(chain_id.0))
    }
}

/// Address codec for chains that use 20-byte EVM addresses.
///
/// Output is lowercase hex without a prefix. Addresses in any other format
/// are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmAddressCodec;

impl EvmAddressCodec {
    fn encode(address: &str) -> Option<String> {
        Address::from_str(address.trim())
            .ok()
            .map(|parsed| alloy::hex::encode(parsed.as_slice()))
    }
}

impl AddressCodec for EvmAddressCodec {
    fn address_to_hex(&self, chain_id: ChainId, address: &str) -> Result<String, CodecError> {
        Self::encode(address).ok_or_else(|| {
            CodecError(format!("'{address}' is not an address on chain {chain_id}"))
        })
    }

    fn wallet_address_to_hex(&self, _wallet: &WalletKind, address: &str) -> Option<String> {
        Self::encode(address)
    }
}
