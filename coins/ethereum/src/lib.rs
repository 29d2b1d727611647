//! # xbridge Ethereum Library
//!
//! Adapter between a browser-injected EVM wallet (MetaMask, Binance Chain
//! Wallet and compatible providers) and the xbridge cross-chain bridge.
//!
//! This library uses the [alloy](https://github.com/alloy-rs/alloy) framework for contract bindings and primitives.
//!
//! ## Quickstart Guide
//!
//! Use the [EthereumBridgeWallet] struct as a good starting point. It tracks
//! the wallet's connection, reads balances and allowances, and submits
//! approve and lock transactions.
//!
//! ### Amounts
//!
//! Amounts cross the API as decimal strings and are converted exactly, on
//! 256-bit integers, using the token's precision. Excess fraction digits are
//! truncated.
//! ```
//! use xbridge_ethereum::prelude::*;
//!
//! assert_eq!(decimal_to_integer("1.5", 18).unwrap(), "1500000000000000000");
//! assert_eq!(decimal_to_integer("1.239", 2).unwrap(), "123");
//! assert_eq!(integer_to_decimal("1500000", 6).unwrap(), "1.5");
//! ```
//!
//! ### Building a Wallet
//!
//! The provider, state sink and configuration are supplied by the host.
//! ```ignore
//! use std::sync::Arc;
//! use xbridge_ethereum::prelude::*;
//!
//! # async fn bridge(provider: Arc<dyn xbridge_traits::WalletProvider>, sink: Arc<dyn xbridge_traits::StateSink>) -> Result<(), WalletError> {
//! let config = AdapterConfig::load("bridge.json").map_err(|e| WalletError::unknown(e.to_string()))?;
//! let wallet = EthereumBridgeWallet::builder()
//!     .config(config)
//!     .provider(provider)
//!     .sink(sink)
//!     .build()?;
//! wallet.start().await;
//! let state = wallet.connect().await?;
//! println!("connected as {:?} on chain {:?}", state.address, state.chain_id);
//! # Ok(())
//! # }
//! ```
//!
//! ### Submitting a Lock
//!
//! Submission returns as soon as the wallet reports a hash; poll
//! [`BridgeWallet::transaction_status`](xbridge_traits::BridgeWallet::transaction_status)
//! for the outcome.
//! ```ignore
//! # use xbridge_ethereum::prelude::*;
//! # async fn lock(wallet: &EthereumBridgeWallet, request: LockRequest) -> Result<(), WalletError> {
//! let hash = wallet.lock(&request).await?;
//! match wallet.transaction_status(&hash).await? {
//!     TransactionStatus::Pending => println!("{hash} not mined yet"),
//!     TransactionStatus::Done => println!("{hash} succeeded"),
//!     TransactionStatus::Failed => println!("{hash} reverted"),
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod abi;
pub use abi::ContractKind;
mod amount;
pub use amount::{
    decimal_to_integer, format_units, integer_to_decimal, parse_units, AmountError, TokenAmount,
    NATIVE_DECIMALS,
};
mod config;
pub use config::{AdapterConfig, ConfigError, NetworkTable, TokenConfig};
mod connection;
pub use connection::ConnectionLifecycle;
mod context;
pub use context::{parse_address, parse_quantity, token_address, AdapterContext};
mod query;
pub use query::ContractQuery;
mod registry;
pub use registry::{EvmAddressCodec, StaticChainRegistry, StaticTokenRegistry};
mod status;
pub use status::{receipt_status, TransactionStatusPoller};
mod submit;
pub use submit::{confirm_later, TransactionSubmitter};
mod adapter;
pub use adapter::{EthereumBridgeWallet, EthereumBridgeWalletBuilder};
pub use alloy;
pub mod prelude;

// Unified traits implementation
mod traits_impl;

/// Re-export xbridge-traits for convenience
pub use xbridge_traits;
/// Re-export xbridge-error for convenience
pub use xbridge_error;
