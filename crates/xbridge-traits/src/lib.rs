//! # xbridge Traits
//!
//! Shared types and collaborator traits for the xbridge wallet adapter.
//!
//! The adapter talks to everything outside its core through the traits in
//! this crate:
//!
//! - [`WalletProvider`] - the browser-injected wallet (requests, events, submission)
//! - [`TokenRegistry`] / [`ChainRegistry`] - token and chain metadata lookups
//! - [`AddressCodec`] - cross-chain address encoding
//! - [`StateSink`] - write-only destination for connection state
//! - [`SessionStore`] - the per-session "previously connected" flag
//!
//! [`BridgeWallet`] is the surface a higher-level wallet registry consumes.
//!
//! ## Example
//!
//! ```ignore
//! use xbridge_traits::*;
//!
//! async fn locked<W: BridgeWallet>(wallet: &W, req: &LockRequest) -> xbridge_error::Result<TxHash> {
//!     wallet.lock(req).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;

use alloy::primitives::B256;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use xbridge_error::{CodecError, LookupError, Result};

mod provider;
pub use provider::{
    methods, ProviderEvent, Submission, SubmissionEvent, Subscription, WalletProvider,
};

/// Token hash reserved for a chain's native coin.
pub const NATIVE_TOKEN_HASH: &str = "0000000000000000000000000000000000000000";

/// Strips a `0x` prefix and lowercases a hex hash.
pub fn normalize_hash(hash: &str) -> String {
    let trimmed = hash
        .strip_prefix("0x")
        .or_else(|| hash.strip_prefix("0X"))
        .unwrap_or(hash);
    trimmed.to_ascii_lowercase()
}

/// Returns true when `token_hash` names the native coin.
pub fn is_native_token(token_hash: &str) -> bool {
    normalize_hash(token_hash) == NATIVE_TOKEN_HASH
}

/// Logical chain id used by the bridge, distinct from an EVM network id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The injected wallet an adapter instance is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    /// MetaMask and compatible `window.ethereum` providers
    #[default]
    MetaMask,
    /// Binance Chain Wallet (`window.BinanceChain`)
    BinanceChain,
    /// Any other injected EVM provider
    Other(String),
}

impl WalletKind {
    /// Returns the wallet's name.
    pub fn name(&self) -> &str {
        match self {
            WalletKind::MetaMask => "MetaMask",
            WalletKind::BinanceChain => "BinanceChain",
            WalletKind::Other(name) => name,
        }
    }

    /// Session key under which the "previously connected" flag is stored.
    pub fn session_key(&self) -> String {
        format!("{}_CONNECTED", self.name().to_uppercase())
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Snapshot of one wallet's connection, as published to the [`StateSink`].
///
/// `connected` is true exactly when `address` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    /// Wallet this state belongs to
    pub name: WalletKind,
    /// Whether a provider was injected into the page
    pub installed: bool,
    /// Whether an account is exposed
    pub connected: bool,
    /// Checksummed account address
    pub address: Option<String>,
    /// Account address in the bridge's hex form
    pub address_hex: Option<String>,
    /// Logical chain id of the selected network
    pub chain_id: Option<ChainId>,
}

impl ConnectionState {
    /// State of a wallet whose provider is absent.
    pub fn not_installed(name: WalletKind) -> Self {
        Self {
            name,
            installed: false,
            connected: false,
            address: None,
            address_hex: None,
            chain_id: None,
        }
    }

    /// State of a wallet whose provider is present but not yet queried.
    pub fn installed(name: WalletKind) -> Self {
        Self {
            installed: true,
            ..Self::not_installed(name)
        }
    }
}

/// Where a wallet sits in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionPhase {
    /// No provider; terminal for the process
    NotInstalled,
    /// Provider found, restore not yet attempted
    Installed,
    /// Provider found, no account exposed
    Disconnected,
    /// An account is exposed
    Connected,
}

/// Hash of a submitted transaction, in the bridge's canonical form:
/// lowercase hex without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Creates a TxHash, normalizing prefix and case.
    pub fn new(hash: impl AsRef<str>) -> Self {
        Self(normalize_hash(hash.as_ref()))
    }

    /// Returns the canonical hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `0x`-prefixed form JSON-RPC expects.
    pub fn to_rpc_hex(&self) -> String {
        format!("0x{}", self.0)
    }
}

impl From<B256> for TxHash {
    fn from(hash: B256) -> Self {
        Self(alloy::hex::encode(hash.as_slice()))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// No receipt yet
    Pending,
    /// Mined and succeeded
    Done,
    /// Mined and reverted
    Failed,
}

/// A query result for a concept that may not apply to every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenQuantity {
    /// Decimal amount
    Amount(String),
    /// The concept does not apply, e.g. the allowance of a native coin
    NotApplicable,
}

impl TokenQuantity {
    /// Returns the decimal amount, if applicable.
    pub fn amount(&self) -> Option<&str> {
        match self {
            TokenQuantity::Amount(value) => Some(value),
            TokenQuantity::NotApplicable => None,
        }
    }

    /// Returns true unless this is [`TokenQuantity::NotApplicable`].
    pub fn is_applicable(&self) -> bool {
        matches!(self, TokenQuantity::Amount(_))
    }
}

/// Token metadata from the token registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBasic {
    /// Token symbol (e.g., "USDT")
    pub symbol: String,
    /// Fixed-point precision
    pub decimals: u8,
}

/// Chain metadata from the chain registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// Logical chain id
    pub chain_id: ChainId,
    /// Fungible lock contract, hex without prefix
    pub lock_contract_hash: String,
    /// NFT lock contract, hex without prefix
    #[serde(default)]
    pub nft_lock_contract_hash: Option<String>,
    /// Display name of the NFT bridge fee coin
    #[serde(default)]
    pub nft_fee_name: Option<String>,
}

/// Parameters of an ERC-20 `approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    /// Chain the token lives on
    pub chain_id: ChainId,
    /// Owner address
    pub address: String,
    /// Token hash
    pub token_hash: String,
    /// Spender address
    pub spender: String,
    /// Decimal amount
    pub amount: String,
}

/// Parameters of an ERC-721 `approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftApproveRequest {
    /// Chain the token lives on
    pub chain_id: ChainId,
    /// Owner address
    pub address: String,
    /// NFT contract hash
    pub token_hash: String,
    /// Spender address
    pub spender: String,
    /// Token id, decimal
    pub token_id: String,
}

/// Parameters of a fungible bridge lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    /// Source chain
    pub from_chain_id: ChainId,
    /// Sender address on the source chain
    pub from_address: String,
    /// Destination chain
    pub to_chain_id: ChainId,
    /// Recipient address in the destination chain's format
    pub to_address: String,
    /// Source token hash
    pub token_hash: String,
    /// Decimal amount
    pub amount: String,
    /// Decimal fee in the source chain's native coin
    pub fee: String,
}

/// Parameters of an NFT bridge lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftLockRequest {
    /// Source chain
    pub from_chain_id: ChainId,
    /// Sender address on the source chain
    pub from_address: String,
    /// Destination chain
    pub to_chain_id: ChainId,
    /// Recipient address in the destination chain's format
    pub to_address: String,
    /// NFT contract hash
    pub token_hash: String,
    /// Token id, decimal
    pub token_id: String,
    /// Decimal fee in the source chain's native coin
    pub fee: String,
}

/// Token metadata lookup.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Returns the token registered under `chain_id` and `token_hash`.
    async fn token_basic(
        &self,
        chain_id: ChainId,
        token_hash: &str,
    ) -> std::result::Result<TokenBasic, LookupError>;
}

/// Chain metadata lookup.
#[async_trait]
pub trait ChainRegistry: Send + Sync {
    /// Returns the chain registered under `chain_id`.
    async fn chain(&self, chain_id: ChainId) -> std::result::Result<ChainInfo, LookupError>;
}

/// Address encoding across the bridged chains.
pub trait AddressCodec: Send + Sync {
    /// Encodes `address` in `chain_id`'s native hex form, without prefix.
    fn address_to_hex(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> std::result::Result<String, CodecError>;

    /// Normalizes a wallet's own address for matching across chains.
    fn wallet_address_to_hex(&self, wallet: &WalletKind, address: &str) -> Option<String>;
}

/// Write-only destination for connection state.
pub trait StateSink: Send + Sync {
    /// Receives the full state after every transition.
    fn update_wallet(&self, state: ConnectionState);
}

/// Session-scoped boolean flags.
pub trait SessionStore: Send + Sync {
    /// Returns the flag stored under `key`, false when unset.
    fn flag(&self, key: &str) -> bool;

    /// Stores the flag under `key`.
    fn set_flag(&self, key: &str, value: bool);
}

/// A [`SessionStore`] that lives as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    flags: DashMap<String, bool>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn flag(&self, key: &str) -> bool {
        self.flags.get(key).map(|v| *v).unwrap_or(false)
    }

    fn set_flag(&self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }
}

/// A bridge-capable wallet, as seen by a multi-wallet registry.
#[async_trait]
pub trait BridgeWallet: Send + Sync {
    /// Returns which wallet this is.
    fn kind(&self) -> &WalletKind;

    /// Returns the current connection state.
    async fn state(&self) -> ConnectionState;

    /// Prompts for account access and returns the resulting state.
    async fn connect(&self) -> Result<ConnectionState>;

    /// Decimal balance of `address` in `token_hash`.
    async fn balance(&self, chain_id: ChainId, address: &str, token_hash: &str) -> Result<String>;

    /// Decimal allowance `address` granted to `spender`.
    async fn allowance(
        &self,
        chain_id: ChainId,
        address: &str,
        token_hash: &str,
        spender: &str,
    ) -> Result<TokenQuantity>;

    /// Decimal total supply of `token_hash`.
    async fn total_supply(&self, chain_id: ChainId, token_hash: &str) -> Result<TokenQuantity>;

    /// Whether the NFT lock contract may move `token_id`.
    async fn nft_approved(&self, chain_id: ChainId, token_hash: &str, token_id: &str)
        -> Result<bool>;

    /// Submits an ERC-20 approval.
    async fn approve(&self, request: &ApproveRequest) -> Result<TxHash>;

    /// Submits an ERC-721 approval.
    async fn nft_approve(&self, request: &NftApproveRequest) -> Result<TxHash>;

    /// Submits a fungible lock.
    async fn lock(&self, request: &LockRequest) -> Result<TxHash>;

    /// Submits an NFT lock.
    async fn nft_lock(&self, request: &NftLockRequest) -> Result<TxHash>;

    /// Looks up the status of a submitted transaction.
    async fn transaction_status(&self, hash: &TxHash) -> Result<TransactionStatus>;
}
