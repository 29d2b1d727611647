//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use xbridge_ethereum::prelude::*;
use xbridge_ethereum::TokenConfig;
use xbridge_testing::{EdgeCaseAddresses, MockProvider, RecordingSink};
use xbridge_traits::{
    AddressCodec, ChainInfo, InMemorySessionStore, SessionStore, NATIVE_TOKEN_HASH,
};

/// Ethereum on the bridge
pub const ETH: ChainId = ChainId(2);
/// BSC on the bridge
pub const BSC: ChainId = ChainId(6);
/// A chain with no NFT bridge
pub const HECO: ChainId = ChainId(7);

pub const OWNER: &str = EdgeCaseAddresses::ETH_VALID_LOWER;
pub const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const USDT: &str = "dac17f958d2ee523a2206206994597c13d831ec7";
pub const NFT: &str = "60f80121c31a0d46b5279700f9df786054aa5ee5";
pub const LOCK_PROXY: &str = "250e76987d838a75310c34bf422ea9f1ac4cc906";
pub const NFT_LOCK_PROXY: &str = "2cdfc90250ef967036838da601099656e74bcfc5";

pub fn address(hex: &str) -> Address {
    Address::from_str(hex).unwrap()
}

pub fn config() -> AdapterConfig {
    AdapterConfig {
        chains: vec![
            ChainInfo {
                chain_id: ETH,
                lock_contract_hash: LOCK_PROXY.into(),
                nft_lock_contract_hash: Some(NFT_LOCK_PROXY.into()),
                nft_fee_name: Some("ETH".into()),
            },
            ChainInfo {
                chain_id: HECO,
                lock_contract_hash: LOCK_PROXY.into(),
                nft_lock_contract_hash: None,
                nft_fee_name: None,
            },
        ],
        tokens: vec![
            TokenConfig {
                chain_id: ETH,
                hash: NATIVE_TOKEN_HASH.into(),
                symbol: "ETH".into(),
                decimals: 18,
            },
            TokenConfig {
                chain_id: ETH,
                hash: USDT.into(),
                symbol: "USDT".into(),
                decimals: 6,
            },
            TokenConfig {
                chain_id: ETH,
                hash: NFT.into(),
                symbol: "SEASHELL".into(),
                decimals: 0,
            },
        ],
        ..AdapterConfig::default()
    }
}

/// A wallet wired to a mock provider, with handles on every collaborator.
pub struct Harness {
    pub wallet: Arc<EthereumBridgeWallet>,
    pub provider: MockProvider,
    pub sink: Arc<RecordingSink>,
    pub session: Arc<InMemorySessionStore>,
}

pub fn harness(provider: MockProvider) -> Harness {
    harness_with(provider, Arc::new(InMemorySessionStore::new()), None)
}

pub fn harness_with(
    provider: MockProvider,
    session: Arc<InMemorySessionStore>,
    codec: Option<Arc<dyn AddressCodec>>,
) -> Harness {
    let sink = Arc::new(RecordingSink::new());
    let mut builder = EthereumBridgeWallet::builder();
    builder
        .config(config())
        .provider(Arc::new(provider.clone()))
        .sink(sink.clone())
        .session_store(session.clone());
    if let Some(codec) = codec {
        builder.address_codec(codec);
    }
    Harness {
        wallet: Arc::new(builder.build().unwrap()),
        provider,
        sink,
        session,
    }
}

/// A wallet whose provider is absent.
pub fn not_installed() -> (EthereumBridgeWallet, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let wallet = EthereumBridgeWallet::builder()
        .config(config())
        .sink(sink.clone())
        .build()
        .unwrap();
    (wallet, sink)
}

/// A harness whose previous session is flagged, so startup restores it.
pub fn remembered(provider: MockProvider) -> Harness {
    let session = Arc::new(InMemorySessionStore::new());
    session.set_flag(&WalletKind::MetaMask.session_key(), true);
    harness_with(provider, session, None)
}
