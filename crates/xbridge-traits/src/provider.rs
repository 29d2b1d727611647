//! The seam between the adapter and an injected EIP-1193 wallet provider.
//!
//! Long-lived event listeners and per-transaction submission listeners are
//! both modelled as channel-backed handles. Dropping a handle releases the
//! listener; a provider notices through the closed channel and, for bindings
//! that hold foreign resources, through the optional release hook.

use std::fmt;

use alloy::primitives::B256;
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use xbridge_error::ProviderError;

/// JSON-RPC method names the adapter sends through [`WalletProvider::request`].
pub mod methods {
    /// Accounts already exposed to the page, without prompting.
    pub const ETH_ACCOUNTS: &str = "eth_accounts";
    /// Prompts the user to expose accounts.
    pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    /// Network id of the selected network, hex encoded.
    pub const ETH_CHAIN_ID: &str = "eth_chainId";
    /// Native balance of an address.
    pub const ETH_GET_BALANCE: &str = "eth_getBalance";
    /// Read-only contract call.
    pub const ETH_CALL: &str = "eth_call";
    /// Receipt of a mined transaction, or null.
    pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Events a provider pushes without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed account list changed; empty when the wallet disconnected.
    AccountsChanged(Vec<String>),
    /// The selected network changed; carries the hex network id.
    ChainChanged(String),
}

/// Signals emitted for one submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// The transaction entered the pool and was assigned this hash.
    Hash(B256),
    /// The transaction gained a confirmation.
    Confirmation {
        /// Confirmations observed so far
        confirmations: u64,
    },
    /// Submission failed before or after signing.
    Error(ProviderError),
}

type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// Runs the release hook when dropped.
struct Release(Option<ReleaseHook>);

impl Drop for Release {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            hook();
        }
    }
}

/// A disposable handle on the provider's account and chain events.
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) detaches the
/// listener.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ProviderEvent>,
    _release: Release,
}

impl Subscription {
    /// Wraps the receiving half of an event channel.
    pub fn new(events: mpsc::UnboundedReceiver<ProviderEvent>) -> Self {
        Self {
            events,
            _release: Release(None),
        }
    }

    /// Registers a hook run once when the subscription is released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self._release = Release(Some(Box::new(hook)));
        self
    }

    /// Creates a connected sender and subscription pair.
    pub fn channel() -> (mpsc::UnboundedSender<ProviderEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Waits for the next event; `None` once the provider side is gone.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        self.events.recv().await
    }

    /// Returns an already delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<ProviderEvent> {
        self.events.try_recv().ok()
    }

    /// Detaches the listener.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// The listeners attached to one submitted transaction.
///
/// Hash, confirmation and error signals share one channel, so dropping the
/// handle retires all three together.
pub struct Submission {
    events: mpsc::UnboundedReceiver<SubmissionEvent>,
    _release: Release,
}

impl Submission {
    /// Wraps the receiving half of a submission channel.
    pub fn new(events: mpsc::UnboundedReceiver<SubmissionEvent>) -> Self {
        Self {
            events,
            _release: Release(None),
        }
    }

    /// Registers a hook run once when the listeners are released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self._release = Release(Some(Box::new(hook)));
        self
    }

    /// Creates a connected sender and submission pair.
    pub fn channel() -> (mpsc::UnboundedSender<SubmissionEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Waits for the next signal; `None` once the provider side is gone.
    pub async fn recv(&mut self) -> Option<SubmissionEvent> {
        self.events.recv().await
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission").finish_non_exhaustive()
    }
}

/// A browser-injected wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Sends a JSON-RPC request and returns its `result` value.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Attaches a listener for account and chain change events.
    fn subscribe(&self) -> Subscription;

    /// Asks the wallet to sign and submit `tx`.
    ///
    /// An error here means the submission never started; later failures
    /// arrive as [`SubmissionEvent::Error`].
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<Submission, ProviderError>;
}
