//! The provider-bound client every component shares.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use serde_json::{json, Value};
use xbridge_error::{Classify, ErrorClassifier, Result, WalletError};
use xbridge_traits::{
    is_native_token, methods, normalize_hash, AddressCodec, ChainId, ChainInfo, ChainRegistry,
    Submission, Subscription, TokenRegistry, WalletKind, WalletProvider,
};

/// Provider, registries, codec and classifier, built once per adapter.
///
/// Components hold it behind an `Arc`; nothing in it is mutated after
/// construction.
pub struct AdapterContext {
    kind: WalletKind,
    provider: Option<Arc<dyn WalletProvider>>,
    tokens: Arc<dyn TokenRegistry>,
    chains: Arc<dyn ChainRegistry>,
    codec: Arc<dyn AddressCodec>,
    classifier: ErrorClassifier,
}

impl AdapterContext {
    /// Creates a context. `provider` is `None` when no wallet was injected.
    pub fn new(
        kind: WalletKind,
        provider: Option<Arc<dyn WalletProvider>>,
        tokens: Arc<dyn TokenRegistry>,
        chains: Arc<dyn ChainRegistry>,
        codec: Arc<dyn AddressCodec>,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            kind,
            provider,
            tokens,
            chains,
            codec,
            classifier,
        }
    }

    /// Wallet this context is bound to.
    pub fn kind(&self) -> &WalletKind {
        &self.kind
    }

    /// Whether a provider was injected.
    pub fn is_installed(&self) -> bool {
        self.provider.is_some()
    }

    /// The classifier every fallible path goes through.
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// The address codec.
    pub fn codec(&self) -> &dyn AddressCodec {
        self.codec.as_ref()
    }

    /// Classifies any raw error with this context's rules.
    pub fn classify(&self, error: impl Into<xbridge_error::BoxError>) -> WalletError {
        self.classifier.classify(error)
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| WalletError::unknown(format!("{} is not installed", self.kind)))
    }

    /// Sends a JSON-RPC request through the provider.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let provider = self.provider()?;
        provider
            .request(method, params)
            .await
            .classify_with(&self.classifier)
    }

    /// Runs a read-only contract call and decodes its return value.
    pub async fn call<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return> {
        let data = call.abi_encode();
        let params = json!([
            { "to": to.to_string(), "data": format!("0x{}", hex::encode(&data)) },
            "latest"
        ]);
        let result = self.request(methods::ETH_CALL, params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| WalletError::unknown(format!("eth_call returned {result}")))?;
        let bytes = hex::decode(normalize_hash(raw)).map_err(|e| self.classify(e))?;
        C::abi_decode_returns(&bytes).map_err(|e| self.classify(e))
    }

    /// Attaches a listener for account and chain events, if installed.
    pub fn subscribe(&self) -> Option<Subscription> {
        self.provider.as_ref().map(|provider| provider.subscribe())
    }

    /// Hands a transaction to the wallet for signing and submission.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<Submission> {
        let provider = self.provider()?;
        provider
            .send_transaction(tx)
            .await
            .classify_with(&self.classifier)
    }

    /// Precision of a token, from the token registry.
    pub async fn decimals(&self, chain_id: ChainId, token_hash: &str) -> Result<u8> {
        let token = self
            .tokens
            .token_basic(chain_id, token_hash)
            .await
            .classify_with(&self.classifier)?;
        Ok(token.decimals)
    }

    /// Chain metadata, from the chain registry.
    pub async fn chain(&self, chain_id: ChainId) -> Result<ChainInfo> {
        self.chains
            .chain(chain_id)
            .await
            .classify_with(&self.classifier)
    }

    /// Encodes `address` in `chain_id`'s native hex form.
    pub fn address_to_hex(&self, chain_id: ChainId, address: &str) -> Result<String> {
        self.codec
            .address_to_hex(chain_id, address)
            .classify_with(&self.classifier)
    }
}

impl fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterContext")
            .field("kind", &self.kind)
            .field("installed", &self.is_installed())
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

/// Parses an EVM address, with or without prefix, ignoring checksum case.
pub fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address.trim()).map_err(|e| {
        WalletError::unknown(format!("Invalid address '{address}'")).with_cause(e)
    })
}

/// Contract address of a token hash. The native sentinel maps to the zero address.
pub fn token_address(token_hash: &str) -> Result<Address> {
    if is_native_token(token_hash) {
        return Ok(Address::ZERO);
    }
    parse_address(token_hash)
}

/// Parses a JSON-RPC quantity (`"0x1a"`) into an integer.
pub fn parse_quantity(value: &Value) -> Result<U256> {
    match value {
        Value::String(s) => {
            let digits = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .ok_or_else(|| WalletError::unknown(format!("Invalid quantity '{s}'")))?;
            if digits.is_empty() {
                return Ok(U256::ZERO);
            }
            U256::from_str_radix(digits, 16).map_err(|e| {
                WalletError::unknown(format!("Invalid quantity '{s}'")).with_cause(e)
            })
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| WalletError::unknown(format!("Invalid quantity {n}"))),
        other => Err(WalletError::unknown(format!("Invalid quantity {other}"))),
    }
}
