//! Implementation of xbridge-traits for EthereumBridgeWallet

use async_trait::async_trait;
use xbridge_error::Result;
use xbridge_traits::{
    ApproveRequest, BridgeWallet, ChainId, ConnectionState, LockRequest, NftApproveRequest,
    NftLockRequest, TokenQuantity, TransactionStatus, TxHash, WalletKind,
};

use crate::EthereumBridgeWallet;

#[async_trait]
impl BridgeWallet for EthereumBridgeWallet {
    fn kind(&self) -> &WalletKind {
        self.context().kind()
    }

    async fn state(&self) -> ConnectionState {
        self.lifecycle().state().await
    }

    async fn connect(&self) -> Result<ConnectionState> {
        self.lifecycle().connect().await
    }

    async fn balance(&self, chain_id: ChainId, address: &str, token_hash: &str) -> Result<String> {
        self.query().balance(chain_id, address, token_hash).await
    }

    async fn allowance(
        &self,
        chain_id: ChainId,
        address: &str,
        token_hash: &str,
        spender: &str,
    ) -> Result<TokenQuantity> {
        self.query()
            .allowance(chain_id, address, token_hash, spender)
            .await
    }

    async fn total_supply(&self, chain_id: ChainId, token_hash: &str) -> Result<TokenQuantity> {
        self.query().total_supply(chain_id, token_hash).await
    }

    async fn nft_approved(
        &self,
        chain_id: ChainId,
        token_hash: &str,
        token_id: &str,
    ) -> Result<bool> {
        self.query().nft_approved(chain_id, token_hash, token_id).await
    }

    async fn approve(&self, request: &ApproveRequest) -> Result<TxHash> {
        self.submitter().approve(request).await
    }

    async fn nft_approve(&self, request: &NftApproveRequest) -> Result<TxHash> {
        self.submitter().nft_approve(request).await
    }

    async fn lock(&self, request: &LockRequest) -> Result<TxHash> {
        self.submitter().lock(request).await
    }

    async fn nft_lock(&self, request: &NftLockRequest) -> Result<TxHash> {
        self.submitter().nft_lock(request).await
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TransactionStatus> {
        self.poller().transaction_status(hash).await
    }
}
