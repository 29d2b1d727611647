//! Read-only balance, allowance, supply and NFT approval queries.

use std::sync::Arc;

use alloy::primitives::U256;
use serde_json::json;
use tracing::debug;
use xbridge_error::{Result, WalletError};
use xbridge_traits::{is_native_token, methods, ChainId, TokenQuantity};

use crate::abi::{IERC20, IERC721};
use crate::amount::{format_units, parse_units};
use crate::context::{parse_address, parse_quantity, token_address, AdapterContext};

/// Contract reads. Every amount comes back as a decimal string scaled by
/// the token's registered precision.
#[derive(Debug, Clone)]
pub struct ContractQuery {
    context: Arc<AdapterContext>,
}

impl ContractQuery {
    /// Creates a query component over a shared context.
    pub fn new(context: Arc<AdapterContext>) -> Self {
        Self { context }
    }

    /// Balance of `address`. The native coin is read with `eth_getBalance`
    /// instead of a contract call.
    pub async fn balance(&self, chain_id: ChainId, address: &str, token_hash: &str) -> Result<String> {
        let decimals = self.context.decimals(chain_id, token_hash).await?;
        let owner = parse_address(address)?;

        let raw = if is_native_token(token_hash) {
            let balance = self
                .context
                .request(methods::ETH_GET_BALANCE, json!([owner.to_string(), "latest"]))
                .await?;
            parse_quantity(&balance)?
        } else {
            let token = token_address(token_hash)?;
            self.context
                .call(token, IERC20::balanceOfCall { owner })
                .await?
        };

        debug!(%chain_id, token_hash, %raw, "balance read");
        Ok(format_units(raw, decimals))
    }

    /// Amount `address` lets `spender` move. Not applicable to the native coin.
    pub async fn allowance(
        &self,
        chain_id: ChainId,
        address: &str,
        token_hash: &str,
        spender: &str,
    ) -> Result<TokenQuantity> {
        if is_native_token(token_hash) {
            return Ok(TokenQuantity::NotApplicable);
        }
        let decimals = self.context.decimals(chain_id, token_hash).await?;
        let owner = parse_address(address)?;
        let spender = parse_address(spender)?;
        let token = token_address(token_hash)?;

        let raw: U256 = self
            .context
            .call(token, IERC20::allowanceCall { owner, spender })
            .await?;
        Ok(TokenQuantity::Amount(format_units(raw, decimals)))
    }

    /// Total supply of a token. Not applicable to the native coin.
    pub async fn total_supply(&self, chain_id: ChainId, token_hash: &str) -> Result<TokenQuantity> {
        if is_native_token(token_hash) {
            return Ok(TokenQuantity::NotApplicable);
        }
        let decimals = self.context.decimals(chain_id, token_hash).await?;
        let token = token_address(token_hash)?;

        let raw: U256 = self.context.call(token, IERC20::totalSupplyCall {}).await?;
        Ok(TokenQuantity::Amount(format_units(raw, decimals)))
    }

    /// Whether the chain's NFT lock contract is the approved operator of
    /// `token_id`. Addresses are compared as parsed 20-byte values.
    pub async fn nft_approved(&self, chain_id: ChainId, token_hash: &str, token_id: &str) -> Result<bool> {
        let chain = self.context.chain(chain_id).await?;
        let lock_contract = chain.nft_lock_contract_hash.as_deref().ok_or_else(|| {
            WalletError::unknown(format!("Chain {chain_id} has no NFT lock contract"))
        })?;
        let lock_contract = parse_address(lock_contract)?;
        let token = token_address(token_hash)?;
        let token_id = parse_units(token_id, 0)?;

        let approved = self
            .context
            .call(token, IERC721::getApprovedCall { tokenId: token_id })
            .await?;
        Ok(approved == lock_contract)
    }
}
