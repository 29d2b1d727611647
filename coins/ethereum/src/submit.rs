//! Approve and lock submissions.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use tracing::{debug, info};
use xbridge_error::{Classify, ProviderError, Result, WalletError};
use xbridge_traits::{
    is_native_token, normalize_hash, ApproveRequest, ChainId, LockRequest, NftApproveRequest,
    NftLockRequest, Submission, SubmissionEvent, TxHash,
};

use crate::abi::{ILockProxy, INftLockProxy, IERC20, IERC721};
use crate::amount::{parse_units, NATIVE_DECIMALS};
use crate::context::{parse_address, token_address, AdapterContext};

/// Waits for the hash of a submitted transaction.
///
/// Resolves on the first hash, rejects on the first error and skips
/// confirmations. The submission is consumed, so its listeners are released
/// as soon as this returns.
pub async fn confirm_later(mut submission: Submission) -> std::result::Result<TxHash, ProviderError> {
    while let Some(event) = submission.recv().await {
        match event {
            SubmissionEvent::Hash(hash) => return Ok(TxHash::from(hash)),
            SubmissionEvent::Error(err) => return Err(err),
            SubmissionEvent::Confirmation { confirmations } => {
                debug!(confirmations, "ignoring confirmation before hash");
            }
        }
    }
    Err(ProviderError::new(
        "Submission ended before a transaction hash was assigned",
    ))
}

/// Builds and submits state-changing calls.
///
/// Each call returns once the wallet reports a transaction hash; block
/// confirmation is left to [`TransactionStatusPoller`](crate::TransactionStatusPoller).
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    context: Arc<AdapterContext>,
}

impl TransactionSubmitter {
    /// Creates a submitter over a shared context.
    pub fn new(context: Arc<AdapterContext>) -> Self {
        Self { context }
    }

    /// ERC-20 `approve(spender, amount)`.
    pub async fn approve(&self, request: &ApproveRequest) -> Result<TxHash> {
        if is_native_token(&request.token_hash) {
            return Err(WalletError::unknown("The native coin has no allowance to approve"));
        }
        let decimals = self
            .context
            .decimals(request.chain_id, &request.token_hash)
            .await?;
        let amount = parse_units(&request.amount, decimals)?;
        let from = parse_address(&request.address)?;
        let token = token_address(&request.token_hash)?;
        let spender = parse_address(&request.spender)?;

        let call = IERC20::approveCall { spender, amount };
        self.submit("approve", from, token, call, U256::ZERO).await
    }

    /// ERC-721 `approve(spender, tokenId)`.
    pub async fn nft_approve(&self, request: &NftApproveRequest) -> Result<TxHash> {
        let from = parse_address(&request.address)?;
        let token = token_address(&request.token_hash)?;
        let spender = parse_address(&request.spender)?;
        let token_id = parse_units(&request.token_id, 0)?;

        let call = IERC721::approveCall {
            to: spender,
            tokenId: token_id,
        };
        self.submit("nft_approve", from, token, call, U256::ZERO).await
    }

    /// Locks a fungible token in the source chain's bridge contract.
    ///
    /// For the native coin the transaction value is the amount itself;
    /// otherwise the value carries only the fee.
    pub async fn lock(&self, request: &LockRequest) -> Result<TxHash> {
        let chain = self.context.chain(request.from_chain_id).await?;
        let lock_contract = parse_address(&chain.lock_contract_hash)?;
        let decimals = self
            .context
            .decimals(request.from_chain_id, &request.token_hash)
            .await?;
        let amount = parse_units(&request.amount, decimals)?;
        let fee = parse_units(&request.fee, NATIVE_DECIMALS)?;
        let from = parse_address(&request.from_address)?;
        let from_asset = token_address(&request.token_hash)?;
        let to_address = self.destination(request.to_chain_id, &request.to_address)?;

        let value = if is_native_token(&request.token_hash) {
            amount
        } else {
            fee
        };
        let call = ILockProxy::lockCall {
            fromAssetHash: from_asset,
            toChainId: request.to_chain_id.0,
            toAddress: to_address,
            amount,
            fee,
            id: U256::ZERO,
        };
        self.submit("lock", from, lock_contract, call, value).await
    }

    /// Locks an NFT in the source chain's NFT bridge contract. The fee is
    /// paid in the native coin and sent as the transaction value.
    pub async fn nft_lock(&self, request: &NftLockRequest) -> Result<TxHash> {
        let chain = self.context.chain(request.from_chain_id).await?;
        let lock_contract = chain.nft_lock_contract_hash.as_deref().ok_or_else(|| {
            WalletError::unknown(format!(
                "Chain {} has no NFT lock contract",
                request.from_chain_id
            ))
        })?;
        let lock_contract = parse_address(lock_contract)?;
        let token_id = parse_units(&request.token_id, 0)?;
        let fee = parse_units(&request.fee, NATIVE_DECIMALS)?;
        let from = parse_address(&request.from_address)?;
        let from_asset = token_address(&request.token_hash)?;
        let to_address = self.destination(request.to_chain_id, &request.to_address)?;

        let call = INftLockProxy::lockCall {
            fromAsset: from_asset,
            toChainId: request.to_chain_id.0,
            toAddress: to_address,
            toTokenId: token_id,
            feeToken: Address::ZERO,
            fee,
            id: U256::ZERO,
        };
        self.submit("nft_lock", from, lock_contract, call, fee).await
    }

    /// Recipient address in the destination chain's encoding, as raw bytes.
    fn destination(&self, to_chain_id: ChainId, to_address: &str) -> Result<Bytes> {
        let encoded = self.context.address_to_hex(to_chain_id, to_address)?;
        let bytes = hex::decode(normalize_hash(&encoded)).map_err(|e| {
            WalletError::unknown(format!("Codec produced invalid hex '{encoded}'")).with_cause(e)
        })?;
        Ok(Bytes::from(bytes))
    }

    async fn submit<C: SolCall>(
        &self,
        label: &'static str,
        from: Address,
        to: Address,
        call: C,
        value: U256,
    ) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(to)
            .value(value)
            .input(call.abi_encode().into());

        let submission = self.context.send_transaction(tx).await?;
        let hash = confirm_later(submission)
            .await
            .classify_with(self.context.classifier())?;
        info!(kind = label, %to, %value, hash = %hash, "transaction submitted");
        Ok(hash)
    }
}
