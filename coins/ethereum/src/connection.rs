//! Wallet presence, account and network tracking.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::{json, Value};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use xbridge_error::{Result, WalletError};
use xbridge_traits::{
    methods, ConnectionPhase, ConnectionState, ProviderEvent, SessionStore, StateSink,
    Subscription,
};

use crate::config::NetworkTable;
use crate::context::AdapterContext;

struct Inner {
    phase: ConnectionPhase,
    state: ConnectionState,
    started: bool,
}

/// Owns the wallet's [`ConnectionState`] and is its only writer.
///
/// Every transition runs under one async lock, so pushed events and caller
/// initiated connects are applied one at a time and in arrival order. The
/// full state is published to the [`StateSink`] once per transition, after
/// all derived fields are computed.
pub struct ConnectionLifecycle {
    context: Arc<AdapterContext>,
    networks: NetworkTable,
    sink: Arc<dyn StateSink>,
    session: Arc<dyn SessionStore>,
    inner: Mutex<Inner>,
    subscription: Mutex<Option<Subscription>>,
    ready: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
}

impl ConnectionLifecycle {
    /// Creates a lifecycle in the `NotInstalled` phase; call [`start`](Self::start) next.
    pub fn new(
        context: Arc<AdapterContext>,
        networks: NetworkTable,
        sink: Arc<dyn StateSink>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let state = ConnectionState::not_installed(context.kind().clone());
        Self {
            context,
            networks,
            sink,
            session,
            inner: Mutex::new(Inner {
                phase: ConnectionPhase::NotInstalled,
                state,
                started: false,
            }),
            subscription: Mutex::new(None),
            ready: watch::channel(false).0,
            shutdown: watch::channel(false).0,
        }
    }

    /// Detects the provider, attaches the event listener and restores a
    /// previous session.
    ///
    /// Always fires the ready signal, even when the restore fails. A restore
    /// failure leaves the wallet `Disconnected` and is only logged. Calling
    /// this twice returns the current state.
    pub async fn start(&self) -> ConnectionState {
        let state = self.initialize().await;
        self.ready.send_replace(true);
        state
    }

    async fn initialize(&self) -> ConnectionState {
        let mut inner = self.inner.lock().await;
        if inner.started {
            return inner.state.clone();
        }
        inner.started = true;

        let kind = self.context.kind().clone();
        if !self.context.is_installed() {
            info!(wallet = %kind, "wallet not installed");
            inner.state = ConnectionState::not_installed(kind);
            self.publish(&inner);
            return inner.state.clone();
        }

        inner.phase = ConnectionPhase::Installed;
        inner.state = ConnectionState::installed(kind.clone());
        self.publish(&inner);

        *self.subscription.lock().await = self.context.subscribe();

        if !self.session.flag(&kind.session_key()) {
            inner.phase = ConnectionPhase::Disconnected;
            debug!(wallet = %kind, "no previous session to restore");
            return inner.state.clone();
        }

        match self.query_state().await {
            Ok(state) => self.apply(&mut inner, state),
            Err(err) => {
                warn!(wallet = %kind, error = %err, "failed to restore previous session");
                inner.phase = ConnectionPhase::Disconnected;
            }
        }
        inner.state.clone()
    }

    /// Waits until [`start`](Self::start) has finished.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // the sender lives as long as self, so this only returns once ready
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Whether [`start`](Self::start) has finished.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Prompts the user for account access and records the session.
    ///
    /// On failure the state is left as it was and the classified error is
    /// returned; nothing is retried. Runs [`start`](Self::start) first if it
    /// has not run yet.
    pub async fn connect(&self) -> Result<ConnectionState> {
        self.start().await;
        let mut inner = self.inner.lock().await;
        let kind = self.context.kind().clone();
        if !self.context.is_installed() {
            return Err(WalletError::unknown(format!("{kind} is not installed")));
        }

        self.context
            .request(methods::ETH_REQUEST_ACCOUNTS, json!([]))
            .await?;
        let state = self.query_state().await?;
        if state.connected {
            self.session.set_flag(&kind.session_key(), true);
        }
        self.apply(&mut inner, state);
        Ok(inner.state.clone())
    }

    /// Applies one provider event.
    pub async fn handle_event(&self, event: ProviderEvent) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.phase == ConnectionPhase::NotInstalled {
            debug!(?event, "ignoring event for a wallet that is not installed");
            return Ok(());
        }

        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                let (address, address_hex) = self.derive_address(&accounts)?;
                let state = ConnectionState {
                    connected: address.is_some(),
                    address,
                    address_hex,
                    ..inner.state.clone()
                };
                self.apply(&mut inner, state);
            }
            ProviderEvent::ChainChanged(network_id) => {
                let chain_id = self.networks.resolve(&network_id);
                if chain_id.is_none() {
                    debug!(network_id = %network_id, "network not bridged");
                }
                let state = ConnectionState {
                    chain_id,
                    ..inner.state.clone()
                };
                self.apply(&mut inner, state);
            }
        }
        Ok(())
    }

    /// Applies pushed events in delivery order until [`shutdown`](Self::shutdown)
    /// is called or the provider goes away.
    ///
    /// Waits for [`start`](Self::start) first, so a listener spawned before
    /// startup still sees every event. A failing event is logged and skipped;
    /// later events still apply.
    pub async fn listen(&self) {
        let mut shutdown = self.shutdown.subscribe();
        tokio::select! {
            _ = self.ready() => {}
            _ = shutdown.wait_for(|stopped| *stopped) => return,
        }

        let mut guard = self.subscription.lock().await;
        let Some(subscription) = guard.as_mut() else {
            debug!(wallet = %self.context.kind(), "no event subscription to listen on");
            return;
        };

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                event = subscription.recv() => match event {
                    Some(event) => {
                        if let Err(err) = self.handle_event(event).await {
                            warn!(error = %err, "failed to apply provider event");
                        }
                    }
                    None => {
                        debug!("provider event stream closed");
                        break;
                    }
                },
            }
        }
    }

    /// Applies the events already delivered, without waiting for more.
    ///
    /// Returns how many events were taken off the stream. While
    /// [`listen`](Self::listen) is running it owns the stream, so this
    /// returns 0 at once.
    pub async fn pump_pending(&self) -> usize {
        let Ok(mut guard) = self.subscription.try_lock() else {
            debug!("event stream is being listened on, nothing to pump");
            return 0;
        };
        let Some(subscription) = guard.as_mut() else {
            return 0;
        };

        let mut applied = 0;
        while let Some(event) = subscription.try_recv() {
            applied += 1;
            if let Err(err) = self.handle_event(event).await {
                warn!(error = %err, "failed to apply provider event");
            }
        }
        applied
    }

    /// Stops [`listen`](Self::listen) and releases the event subscription.
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        if self.subscription.lock().await.take().is_some() {
            debug!(wallet = %self.context.kind(), "event subscription released");
        }
    }

    /// Current state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.lock().await.state.clone()
    }

    /// Current phase.
    pub async fn phase(&self) -> ConnectionPhase {
        self.inner.lock().await.phase
    }

    /// Reads accounts and network from the provider and derives a full state.
    async fn query_state(&self) -> Result<ConnectionState> {
        let accounts = self.context.request(methods::ETH_ACCOUNTS, json!([])).await?;
        let accounts = parse_accounts(accounts)?;
        let network_id = self.context.request(methods::ETH_CHAIN_ID, json!([])).await?;
        let chain_id = match &network_id {
            Value::String(id) => self.networks.resolve(id),
            Value::Number(id) => id.as_u64().and_then(|id| self.networks.chain_id(id)),
            _ => None,
        };

        let (address, address_hex) = self.derive_address(&accounts)?;
        Ok(ConnectionState {
            name: self.context.kind().clone(),
            installed: true,
            connected: address.is_some(),
            address,
            address_hex,
            chain_id,
        })
    }

    /// Checksummed address and bridge hex form of the first account.
    fn derive_address(&self, accounts: &[String]) -> Result<(Option<String>, Option<String>)> {
        let Some(account) = accounts.iter().find(|a| !a.trim().is_empty()) else {
            return Ok((None, None));
        };
        let parsed = Address::from_str(account.trim()).map_err(|e| {
            WalletError::unknown(format!("Provider reported invalid account '{account}'"))
                .with_cause(e)
        })?;
        let address = parsed.to_checksum(None);
        let address_hex = self
            .context
            .codec()
            .wallet_address_to_hex(self.context.kind(), &address);
        Ok((Some(address), address_hex))
    }

    fn apply(&self, inner: &mut Inner, state: ConnectionState) {
        inner.phase = if state.connected {
            ConnectionPhase::Connected
        } else {
            ConnectionPhase::Disconnected
        };
        inner.state = state;
        self.publish(inner);
    }

    fn publish(&self, inner: &Inner) {
        info!(
            wallet = %inner.state.name,
            phase = ?inner.phase,
            connected = inner.state.connected,
            chain_id = ?inner.state.chain_id,
            "wallet state changed"
        );
        self.sink.update_wallet(inner.state.clone());
    }
}

fn parse_accounts(value: Value) -> Result<Vec<String>> {
    serde_json::from_value(value)
        .map_err(|e| WalletError::unknown("Provider returned malformed accounts").with_cause(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accounts() {
        assert_eq!(
            parse_accounts(json!(["0xab"])).unwrap(),
            vec!["0xab".to_string()]
        );
        assert!(parse_accounts(json!([])).unwrap().is_empty());
        assert!(parse_accounts(json!("0xab")).is_err());
    }
}
