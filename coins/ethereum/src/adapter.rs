//! The wallet facade and its builder.

use std::sync::Arc;

use xbridge_error::{ErrorClassifier, Result, WalletError};
use xbridge_traits::{
    AddressCodec, ChainRegistry, ConnectionPhase, ConnectionState, InMemorySessionStore,
    SessionStore, StateSink, TokenRegistry, WalletKind, WalletProvider,
};

use crate::config::AdapterConfig;
use crate::connection::ConnectionLifecycle;
use crate::context::AdapterContext;
use crate::query::ContractQuery;
use crate::registry::{EvmAddressCodec, StaticChainRegistry, StaticTokenRegistry};
use crate::status::TransactionStatusPoller;
use crate::submit::TransactionSubmitter;

/// Builder for [EthereumBridgeWallet], allows for specification of the collaborators the adapter uses
#[derive(Clone, Default)]
pub struct EthereumBridgeWalletBuilder {
    config: AdapterConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    sink: Option<Arc<dyn StateSink>>,
    session: Option<Arc<dyn SessionStore>>,
    tokens: Option<Arc<dyn TokenRegistry>>,
    chains: Option<Arc<dyn ChainRegistry>>,
    codec: Option<Arc<dyn AddressCodec>>,
    classifier: ErrorClassifier,
}

impl EthereumBridgeWalletBuilder {
    /// Creates a new EthereumBridgeWalletBuilder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the EthereumBridgeWallet with the specified options
    ///
    /// Only the state sink is required. Registries default to the config's
    /// token and chain lists, the codec to [`EvmAddressCodec`] and the session
    /// store to an in-memory one. Leaving out the provider yields a wallet
    /// that reports itself as not installed.
    pub fn build(&self) -> Result<EthereumBridgeWallet> {
        self.config
            .validate()
            .map_err(|e| WalletError::unknown(e.to_string()).with_cause(e))?;
        let sink = self
            .sink
            .clone()
            .ok_or_else(|| WalletError::unknown("The state sink was not provided"))?;

        let tokens: Arc<dyn TokenRegistry> = match &self.tokens {
            Some(tokens) => tokens.clone(),
            None => Arc::new(StaticTokenRegistry::from_config(&self.config)),
        };
        let chains: Arc<dyn ChainRegistry> = match &self.chains {
            Some(chains) => chains.clone(),
            None => Arc::new(StaticChainRegistry::from_config(&self.config)),
        };
        let codec: Arc<dyn AddressCodec> = match &self.codec {
            Some(codec) => codec.clone(),
            None => Arc::new(EvmAddressCodec),
        };
        let session: Arc<dyn SessionStore> = match &self.session {
            Some(session) => session.clone(),
            None => Arc::new(InMemorySessionStore::new()),
        };

        let context = Arc::new(AdapterContext::new(
            self.config.wallet.clone(),
            self.provider.clone(),
            tokens,
            chains,
            codec,
            self.classifier.clone(),
        ));

        Ok(EthereumBridgeWallet {
            lifecycle: ConnectionLifecycle::new(
                context.clone(),
                self.config.network_table(),
                sink,
                session,
            ),
            query: ContractQuery::new(context.clone()),
            submitter: TransactionSubmitter::new(context.clone()),
            poller: TransactionStatusPoller::new(context.clone()),
            context,
        })
    }

    /// Allows specification of the adapter configuration
    pub fn config(&mut self, config: AdapterConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Allows specification of the wallet kind, overriding the config's
    pub fn wallet(&mut self, wallet: WalletKind) -> &mut Self {
        self.config.wallet = wallet;
        self
    }

    /// Allows specification of the injected provider
    pub fn provider(&mut self, provider: Arc<dyn WalletProvider>) -> &mut Self {
        self.provider = Some(provider);
        self
    }

    /// Allows specification of where connection state is published
    pub fn sink(&mut self, sink: Arc<dyn StateSink>) -> &mut Self {
        self.sink = Some(sink);
        self
    }

    /// Allows specification of the session flag store
    pub fn session_store(&mut self, session: Arc<dyn SessionStore>) -> &mut Self {
        self.session = Some(session);
        self
    }

    /// Allows specification of an external token registry
    pub fn token_registry(&mut self, tokens: Arc<dyn TokenRegistry>) -> &mut Self {
        self.tokens = Some(tokens);
        self
    }

    /// Allows specification of an external chain registry
    pub fn chain_registry(&mut self, chains: Arc<dyn ChainRegistry>) -> &mut Self {
        self.chains = Some(chains);
        self
    }

    /// Allows specification of the cross-chain address codec
    pub fn address_codec(&mut self, codec: Arc<dyn AddressCodec>) -> &mut Self {
        self.codec = Some(codec);
        self
    }

    /// Allows specification of the error classification rules
    pub fn classifier(&mut self, classifier: ErrorClassifier) -> &mut Self {
        self.classifier = classifier;
        self
    }
}

/// A bridge wallet backed by one injected EVM provider.
///
/// Owns the connection lifecycle and hands the shared [`AdapterContext`] to
/// the query, submission and status components.
pub struct EthereumBridgeWallet {
    context: Arc<AdapterContext>,
    lifecycle: ConnectionLifecycle,
    query: ContractQuery,
    submitter: TransactionSubmitter,
    poller: TransactionStatusPoller,
}

impl EthereumBridgeWallet {
    /// Returns the builder for [EthereumBridgeWallet].
    pub fn builder() -> EthereumBridgeWalletBuilder {
        EthereumBridgeWalletBuilder::new()
    }

    /// Runs the startup sequence; see [`ConnectionLifecycle::start`].
    pub async fn start(&self) -> ConnectionState {
        self.lifecycle.start().await
    }

    /// Waits for startup to finish.
    pub async fn ready(&self) {
        self.lifecycle.ready().await
    }

    /// Applies provider events until [`shutdown`](Self::shutdown).
    pub async fn listen(&self) {
        self.lifecycle.listen().await
    }

    /// Applies already delivered provider events.
    pub async fn pump_pending(&self) -> usize {
        self.lifecycle.pump_pending().await
    }

    /// Stops listening and releases the provider subscription.
    pub async fn shutdown(&self) {
        self.lifecycle.shutdown().await
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> ConnectionPhase {
        self.lifecycle.phase().await
    }

    /// The connection lifecycle.
    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    /// The read-only query component.
    pub fn query(&self) -> &ContractQuery {
        &self.query
    }

    /// The submission component.
    pub fn submitter(&self) -> &TransactionSubmitter {
        &self.submitter
    }

    /// The status component.
    pub fn poller(&self) -> &TransactionStatusPoller {
        &self.poller
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<AdapterContext> {
        &self.context
    }
}

impl std::fmt::Debug for EthereumBridgeWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumBridgeWallet")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
