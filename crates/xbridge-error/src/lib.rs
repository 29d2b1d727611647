//! # xbridge Error
//!
//! Error types for the xbridge wallet adapter. Every fallible path in the
//! adapter ends in a [`WalletError`], whose [`ErrorKind`] belongs to a closed
//! taxonomy a caller can match on without parsing messages.
//!
//! ## Error Categories
//!
//! - [`WalletError`] - the classified error handed back to callers
//! - [`ProviderError`] - a raw error reported by the injected wallet provider
//! - [`LookupError`] - a token or chain registry miss
//! - [`CodecError`] - a cross-chain address encoding failure
//!
//! Raw errors become [`WalletError`]s through an [`ErrorClassifier`], which
//! applies an ordered list of [`ClassificationRule`]s.
//!
//! ## Example
//!
//! ```
//! use xbridge_error::{ErrorClassifier, ErrorKind, ProviderError};
//!
//! let classifier = ErrorClassifier::default();
//! let err = classifier.classify(ProviderError::new("Rejected by user"));
//! assert_eq!(err.kind(), ErrorKind::UserRejected);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// A boxed error that can cross await points and threads.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// EIP-1193 code a provider uses when the user rejects a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// The closed set of error kinds the adapter reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// The user declined a signing or authorization prompt.
    UserRejected,
    /// The wallet lacks the funds or gas for the operation.
    InsufficientFunds,
    /// Anything else: network errors, malformed input, lookup misses.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UserRejected => write!(f, "UserRejected"),
            ErrorKind::InsufficientFunds => write!(f, "InsufficientFunds"),
            ErrorKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A classified adapter error.
///
/// Immutable once built. The original error, if any, is kept as the
/// [`source`](StdError::source) for diagnostics.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct WalletError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl WalletError {
    /// Creates an error with no underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an [`ErrorKind::Unknown`] error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Attaches the original error.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the original error, if one was recorded.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns true for [`ErrorKind::UserRejected`].
    pub fn is_user_rejected(&self) -> bool {
        self.kind == ErrorKind::UserRejected
    }

    /// Returns true for [`ErrorKind::InsufficientFunds`].
    pub fn is_insufficient_funds(&self) -> bool {
        self.kind == ErrorKind::InsufficientFunds
    }
}

/// An error reported by the injected wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// Numeric EIP-1193 / JSON-RPC error code, when the provider sent one.
    pub code: Option<i64>,
    /// Provider supplied message.
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Creates a provider error carrying a numeric code.
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// A miss in one of the external registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No token is registered under this chain id and hash.
    #[error("Token not found: chain {chain_id}, hash {token_hash}")]
    TokenNotFound {
        /// Logical chain id
        chain_id: u64,
        /// Token hash as given by the caller
        token_hash: String,
    },

    /// No chain is registered under this id.
    #[error("Chain not found: {0}")]
    ChainNotFound(u64),
}

/// An address could not be encoded for the target chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Address codec error: {0}")]
pub struct CodecError(pub String);

/// What a [`ClassificationRule`] looks for in a raw error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Case-insensitive substring of the error's display text.
    MessageContains(String),
    /// Exact numeric code of a [`ProviderError`].
    Code(i64),
}

impl Matcher {
    fn matches(&self, message: &str, code: Option<i64>) -> bool {
        match self {
            Matcher::MessageContains(needle) => message
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Matcher::Code(expected) => code == Some(*expected),
        }
    }
}

/// Maps errors matching `matcher` to `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Predicate over the raw error
    pub matcher: Matcher,
    /// Kind assigned on a match
    pub kind: ErrorKind,
}

impl ClassificationRule {
    /// Rule matching a substring of the error message.
    pub fn message(needle: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            matcher: Matcher::MessageContains(needle.into()),
            kind,
        }
    }

    /// Rule matching a provider error code.
    pub fn code(code: i64, kind: ErrorKind) -> Self {
        Self {
            matcher: Matcher::Code(code),
            kind,
        }
    }
}

/// Turns raw errors into [`WalletError`]s.
///
/// Rules are tried in order and the first match wins; an error matching no
/// rule is [`ErrorKind::Unknown`].
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::code(USER_REJECTED_CODE, ErrorKind::UserRejected),
                ClassificationRule::message("Rejected by user", ErrorKind::UserRejected),
                ClassificationRule::message("User denied", ErrorKind::UserRejected),
                ClassificationRule::message("insufficient funds", ErrorKind::InsufficientFunds),
            ],
        }
    }
}

impl ErrorClassifier {
    /// Creates a classifier with exactly these rules.
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Appends a rule after the existing ones.
    pub fn push_rule(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classifies `error`. A [`WalletError`] is returned unchanged.
    pub fn classify(&self, error: impl Into<BoxError>) -> WalletError {
        let error: BoxError = error.into();
        let error = match error.downcast::<WalletError>() {
            Ok(classified) => return *classified,
            Err(other) => other,
        };

        let message = error.to_string();
        let code = error.downcast_ref::<ProviderError>().and_then(|e| e.code);
        let kind = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(&message, code))
            .map(|rule| rule.kind)
            .unwrap_or(ErrorKind::Unknown);

        WalletError {
            kind,
            message,
            cause: Some(error),
        }
    }
}

/// Convenient Result type using WalletError
pub type Result<T> = std::result::Result<T, WalletError>;

/// Extension trait classifying the error side of a result
pub trait Classify<T> {
    /// Maps the error through `classifier`.
    fn classify_with(self, classifier: &ErrorClassifier) -> Result<T>;
}

impl<T, E: Into<BoxError>> Classify<T> for std::result::Result<T, E> {
    fn classify_with(self, classifier: &ErrorClassifier) -> Result<T> {
        self.map_err(|e| classifier.classify(e))
    }
}
