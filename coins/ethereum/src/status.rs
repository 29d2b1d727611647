//! Receipt lookup for submitted transactions.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;
use xbridge_error::{Result, WalletError};
use xbridge_traits::{methods, TransactionStatus, TxHash};

use crate::context::{parse_quantity, AdapterContext};

/// Caller-driven status lookup. Nothing is cached; every call reads the
/// receipt again.
#[derive(Debug, Clone)]
pub struct TransactionStatusPoller {
    context: Arc<AdapterContext>,
}

impl TransactionStatusPoller {
    /// Creates a poller over a shared context.
    pub fn new(context: Arc<AdapterContext>) -> Self {
        Self { context }
    }

    /// Current status of `hash`.
    pub async fn transaction_status(&self, hash: &TxHash) -> Result<TransactionStatus> {
        let receipt = self
            .context
            .request(methods::ETH_GET_TRANSACTION_RECEIPT, json!([hash.to_rpc_hex()]))
            .await?;
        let status = receipt_status(&receipt)?;
        debug!(hash = %hash, ?status, "receipt status");
        Ok(status)
    }
}

/// Maps a raw receipt to a status.
///
/// A null receipt is pending. Receipts without a `status` field predate
/// Byzantium and only exist for mined transactions, so they count as done.
pub fn receipt_status(receipt: &Value) -> Result<TransactionStatus> {
    if receipt.is_null() {
        return Ok(TransactionStatus::Pending);
    }
    let Some(receipt) = receipt.as_object() else {
        return Err(WalletError::unknown(format!("Malformed receipt {receipt}")));
    };

    let succeeded = match receipt.get("status") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => !parse_quantity(other)?.is_zero(),
    };
    Ok(if succeeded {
        TransactionStatus::Done
    } else {
        TransactionStatus::Failed
    })
}
