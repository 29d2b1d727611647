//! A scriptable in-process wallet provider.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use xbridge_error::ProviderError;
use xbridge_traits::{
    methods, normalize_hash, ProviderEvent, Submission, SubmissionEvent, Subscription,
    WalletProvider,
};

/// What the next `send_transaction` does.
#[derive(Debug, Clone)]
enum Script {
    /// Deliver these events and keep the channel open
    Open(Vec<SubmissionEvent>),
    /// Deliver these events, then drop the sender
    Closed(Vec<SubmissionEvent>),
    /// Fail before a submission exists
    Reject(ProviderError),
}

#[derive(Default)]
struct State {
    accounts: Vec<String>,
    granted: Option<Vec<String>>,
    network_id: String,
    balances: HashMap<Address, U256>,
    call_results: HashMap<[u8; 4], Vec<u8>>,
    failures: HashMap<String, ProviderError>,
    receipts: HashMap<String, Value>,
    scripts: VecDeque<Script>,
    requests: Vec<(String, Value)>,
    sent: Vec<TransactionRequest>,
    event_senders: Vec<UnboundedSender<ProviderEvent>>,
    submission_senders: Vec<UnboundedSender<SubmissionEvent>>,
}

/// An EIP-1193 provider whose answers are set up by the test.
///
/// Unscripted submissions answer with a hash derived from their sequence
/// number and stay open, so later confirmations can still be pushed.
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<Mutex<State>>,
    live_subscriptions: Arc<AtomicUsize>,
    live_submissions: Arc<AtomicUsize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A provider on network `0x1` with no exposed accounts.
    pub fn new() -> Self {
        let state = State {
            network_id: "0x1".to_string(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            live_subscriptions: Arc::new(AtomicUsize::new(0)),
            live_submissions: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    /// Accounts `eth_accounts` reports.
    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        self.set_accounts(accounts);
        self
    }

    /// Replaces the exposed accounts.
    pub fn set_accounts(&self, accounts: &[&str]) {
        self.state().accounts = accounts.iter().map(|a| a.to_string()).collect();
    }

    /// Accounts the user grants when `eth_requestAccounts` prompts.
    pub fn grant_on_request(self, accounts: &[&str]) -> Self {
        self.state().granted = Some(accounts.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Network id `eth_chainId` reports.
    pub fn with_network(self, network_id: &str) -> Self {
        self.state().network_id = network_id.to_string();
        self
    }

    /// Native balance `eth_getBalance` reports for `address`.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state().balances.insert(address, balance);
    }

    /// Raw return data for `eth_call`s whose input starts with `selector`.
    pub fn set_call_result(&self, selector: [u8; 4], data: Vec<u8>) {
        self.state().call_results.insert(selector, data);
    }

    /// ABI-encoded `uint256` return for `selector`.
    pub fn set_uint_result(&self, selector: [u8; 4], value: U256) {
        self.set_call_result(selector, value.abi_encode());
    }

    /// ABI-encoded `address` return for `selector`.
    pub fn set_address_result(&self, selector: [u8; 4], value: Address) {
        self.set_call_result(selector, value.abi_encode());
    }

    /// Makes every request for `method` fail with `error`.
    pub fn fail_method(&self, method: &str, error: ProviderError) {
        self.state().failures.insert(method.to_string(), error);
    }

    /// Receipt returned for `hash`; unknown hashes get `null`.
    pub fn set_receipt(&self, hash: &str, receipt: Value) {
        self.state().receipts.insert(normalize_hash(hash), receipt);
    }

    /// Next submission delivers `events` and stays open.
    pub fn script_submission(&self, events: Vec<SubmissionEvent>) {
        self.state().scripts.push_back(Script::Open(events));
    }

    /// Next submission delivers `events`, then closes.
    pub fn script_submission_then_close(&self, events: Vec<SubmissionEvent>) {
        self.state().scripts.push_back(Script::Closed(events));
    }

    /// Next `send_transaction` fails outright.
    pub fn reject_submission(&self, error: ProviderError) {
        self.state().scripts.push_back(Script::Reject(error));
    }

    // ------------------------------------------------------------------
    // Pushing
    // ------------------------------------------------------------------

    /// Pushes an event to every live subscription. Returns how many got it.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        let mut state = self.state();
        state.event_senders.retain(|tx| !tx.is_closed());
        state
            .event_senders
            .iter()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }

    /// Pushes a signal to every open submission. Returns how many got it.
    pub fn push_submission_event(&self, event: SubmissionEvent) -> usize {
        let mut state = self.state();
        state.submission_senders.retain(|tx| !tx.is_closed());
        state
            .submission_senders
            .iter()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Requests received for `method`.
    pub fn request_count(&self, method: &str) -> usize {
        self.state().requests.iter().filter(|(m, _)| m == method).count()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.state().requests.clone()
    }

    /// Every transaction handed to `send_transaction`, in order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    /// Subscriptions handed out and not yet released.
    pub fn live_subscriptions(&self) -> usize {
        self.live_subscriptions.load(Ordering::SeqCst)
    }

    /// Submissions handed out and not yet released.
    pub fn live_submission_listeners(&self) -> usize {
        self.live_submissions.load(Ordering::SeqCst)
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state();
        state.requests.push((method.to_string(), params.clone()));
        if let Some(error) = state.failures.get(method) {
            return Err(error.clone());
        }

        match method {
            methods::ETH_ACCOUNTS => Ok(json!(state.accounts)),
            methods::ETH_REQUEST_ACCOUNTS => {
                if let Some(granted) = state.granted.clone() {
                    state.accounts = granted;
                }
                Ok(json!(state.accounts))
            }
            methods::ETH_CHAIN_ID => Ok(json!(state.network_id)),
            methods::ETH_GET_BALANCE => {
                let address = param_str(params, 0)
                    .and_then(|a| Address::from_str(a).ok())
                    .ok_or_else(|| ProviderError::with_code(-32602, "invalid address"))?;
                let balance = state.balances.get(&address).copied().unwrap_or_default();
                Ok(json!(format!("0x{balance:x}")))
            }
            methods::ETH_CALL => {
                let data = params
                    .get(0)
                    .and_then(|call| call.get("data"))
                    .and_then(Value::as_str)
                    .and_then(|d| hex::decode(normalize_hash(d)).ok())
                    .ok_or_else(|| ProviderError::with_code(-32602, "invalid call"))?;
                let selector: [u8; 4] = data
                    .get(..4)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| ProviderError::with_code(-32602, "missing selector"))?;
                match state.call_results.get(&selector) {
                    Some(result) => Ok(json!(format!("0x{}", hex::encode(result)))),
                    None => Err(ProviderError::with_code(-32000, "execution reverted")),
                }
            }
            methods::ETH_GET_TRANSACTION_RECEIPT => {
                let hash = param_str(params, 0).map(normalize_hash).unwrap_or_default();
                Ok(state.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(ProviderError::with_code(
                -32601,
                format!("the method {other} does not exist"),
            )),
        }
    }
}

fn param_str(params: &Value, index: usize) -> Option<&str> {
    params.get(index).and_then(Value::as_str)
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.answer(method, &params)
    }

    fn subscribe(&self) -> Subscription {
        let (tx, subscription) = Subscription::channel();
        self.state().event_senders.push(tx);
        self.live_subscriptions.fetch_add(1, Ordering::SeqCst);
        let live = self.live_subscriptions.clone();
        subscription.on_release(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        })
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<Submission, ProviderError> {
        let mut state = self.state();
        state.sent.push(tx);
        let sequence = state.sent.len();

        let script = state.scripts.pop_front().unwrap_or_else(|| {
            Script::Open(vec![SubmissionEvent::Hash(B256::with_last_byte(sequence as u8))])
        });
        let (events, keep_open) = match script {
            Script::Reject(error) => return Err(error),
            Script::Open(events) => (events, true),
            Script::Closed(events) => (events, false),
        };

        let (sender, submission) = Submission::channel();
        for event in events {
            let _ = sender.send(event);
        }
        if keep_open {
            state.submission_senders.push(sender);
        }

        self.live_submissions.fetch_add(1, Ordering::SeqCst);
        let live = self.live_submissions.clone();
        Ok(submission.on_release(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_requests() {
        let provider = MockProvider::new().with_accounts(&["0xab"]);
        provider.request(methods::ETH_ACCOUNTS, json!([])).await.unwrap();
        provider.request(methods::ETH_CHAIN_ID, json!([])).await.unwrap();
        assert_eq!(provider.request_count(methods::ETH_ACCOUNTS), 1);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_method() {
        let provider = MockProvider::new();
        provider.fail_method(methods::ETH_CHAIN_ID, ProviderError::new("boom"));
        let err = provider.request(methods::ETH_CHAIN_ID, json!([])).await.unwrap_err();
        assert_eq!(err.message, "boom");
    }

    #[tokio::test]
    async fn test_subscription_release_is_counted() {
        let provider = MockProvider::new();
        let subscription = provider.subscribe();
        assert_eq!(provider.live_subscriptions(), 1);
        assert_eq!(provider.emit(ProviderEvent::ChainChanged("0x38".into())), 1);
        drop(subscription);
        assert_eq!(provider.live_subscriptions(), 0);
        assert_eq!(provider.emit(ProviderEvent::ChainChanged("0x1".into())), 0);
    }

    #[tokio::test]
    async fn test_default_submission_yields_hash() {
        let provider = MockProvider::new();
        let mut submission = provider
            .send_transaction(TransactionRequest::default())
            .await
            .unwrap();
        assert_eq!(
            submission.recv().await,
            Some(SubmissionEvent::Hash(B256::with_last_byte(1)))
        );
        assert_eq!(provider.live_submission_listeners(), 1);
        drop(submission);
        assert_eq!(provider.live_submission_listeners(), 0);
        assert_eq!(
            provider.push_submission_event(SubmissionEvent::Confirmation { confirmations: 1 }),
            0
        );
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        let provider = MockProvider::new();
        provider.reject_submission(ProviderError::with_code(4001, "User denied"));
        assert!(provider
            .send_transaction(TransactionRequest::default())
            .await
            .is_err());
        assert_eq!(provider.sent_transactions().len(), 1);
        assert_eq!(provider.live_submission_listeners(), 0);
    }
}
