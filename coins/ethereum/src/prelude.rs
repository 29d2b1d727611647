//! This prelude module simplifies importing many useful items from the xbridge_ethereum crate using a glob import.
//!
//! To use this prelude, add the following to your code:
//! ```
//! use xbridge_ethereum::prelude::*;
//! ```

pub use crate::{
    decimal_to_integer, integer_to_decimal, AdapterConfig, ConnectionLifecycle, ContractQuery,
    EthereumBridgeWallet, EthereumBridgeWalletBuilder, TokenAmount, TransactionStatusPoller,
    TransactionSubmitter,
};

pub use alloy::primitives::{Address, B256, U256};
pub use xbridge_error::{ErrorKind, WalletError};
pub use xbridge_traits::{
    ApproveRequest, BridgeWallet, ChainId, ConnectionState, LockRequest, NftApproveRequest,
    NftLockRequest, TokenQuantity, TransactionStatus, TxHash, WalletKind,
};
