//! # xbridge Testing Infrastructure
//!
//! Testing utilities for the xbridge wallet adapter:
//! - [`MockProvider`], a scriptable injected wallet
//! - [`RecordingSink`] and [`FixedAddressCodec`] collaborators
//! - Edge case inputs
//! - Property-based testing strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xbridge_testing::*;
//!
//! let provider = MockProvider::new().with_accounts(&[EdgeCaseAddresses::ETH_VALID]);
//!
//! proptest! {
//!     #[test]
//!     fn test_round_trip((value, decimals) in canonical_decimal(18)) {
//!         // ...
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use proptest::prelude::*;
use xbridge_error::CodecError;
use xbridge_traits::{AddressCodec, ChainId, ConnectionState, StateSink, WalletKind};

mod mock;
pub use mock::MockProvider;

// ============================================================================
// Collaborators
// ============================================================================

/// A [`StateSink`] that keeps every state it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    states: Mutex<Vec<ConnectionState>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All published states, oldest first
    pub fn states(&self) -> Vec<ConnectionState> {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent state
    pub fn last(&self) -> Option<ConnectionState> {
        self.states().pop()
    }

    /// Number of publications
    pub fn count(&self) -> usize {
        self.states().len()
    }
}

impl StateSink for RecordingSink {
    fn update_wallet(&self, state: ConnectionState) {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(state);
    }
}

/// An [`AddressCodec`] answering from a fixed table, for chains whose
/// address format the adapter cannot encode itself.
#[derive(Debug, Clone, Default)]
pub struct FixedAddressCodec {
    entries: HashMap<(ChainId, String), String>,
}

impl FixedAddressCodec {
    /// Create an empty codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `address` on `chain_id` to `hex`
    pub fn with(mut self, chain_id: ChainId, address: &str, hex: &str) -> Self {
        self.entries
            .insert((chain_id, address.to_string()), hex.to_string());
        self
    }
}

impl AddressCodec for FixedAddressCodec {
    fn address_to_hex(&self, chain_id: ChainId, address: &str) -> Result<String, CodecError> {
        self.entries
            .get(&(chain_id, address.to_string()))
            .cloned()
            .ok_or_else(|| CodecError(format!("no encoding for {address} on chain {chain_id}")))
    }

    fn wallet_address_to_hex(&self, _wallet: &WalletKind, address: &str) -> Option<String> {
        Some(xbridge_traits::normalize_hash(address))
    }
}

// ============================================================================
// Edge Case Addresses
// ============================================================================

/// Edge case addresses for testing
pub struct EdgeCaseAddresses;

impl EdgeCaseAddresses {
    /// Valid checksummed address
    pub const ETH_VALID: &'static str = "0x742d35Cc6634C0532925a3b844Bc9e7595f5fFb9";

    /// Same address, lowercase
    pub const ETH_VALID_LOWER: &'static str = "0x742d35cc6634c0532925a3b844bc9e7595f5ffb9";

    /// Zero address
    pub const ETH_ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// Max address
    pub const ETH_MAX: &'static str = "0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";

    /// Invalid Ethereum addresses
    pub fn invalid_ethereum() -> Vec<&'static str> {
        vec![
            "",
            "0x",
            "0xGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGG", // Invalid hex
            "0x742d35Cc6634C0532925a3b844Bc9e7595f5",     // Too short
            "0x742d35Cc6634C0532925a3b844Bc9e7595f5fFb9ff", // Too long
        ]
    }
}

// ============================================================================
// Edge Case Amounts
// ============================================================================

/// Edge case decimal amounts for testing precision and parsing
pub struct EdgeCaseAmounts;

impl EdgeCaseAmounts {
    /// `(decimal, decimals, integer)` triples that convert exactly
    pub fn exact() -> Vec<(&'static str, u8, &'static str)> {
        vec![
            ("0", 18, "0"),
            ("1", 0, "1"),
            ("1", 18, "1000000000000000000"),
            ("1.5", 18, "1500000000000000000"),
            ("0.000000000000000001", 18, "1"),
            ("0.000001", 6, "1"),
            ("21000000", 8, "2100000000000000"),
            ("18446744073709551616", 0, "18446744073709551616"), // 2^64
            ("123456789.123456789", 9, "123456789123456789"),
        ]
    }

    /// `(decimal, decimals, integer)` triples whose excess digits are dropped
    pub fn truncated() -> Vec<(&'static str, u8, &'static str)> {
        vec![
            ("1.239", 2, "123"),
            ("0.999999", 0, "0"),
            ("0.0000019", 6, "1"),
            ("1.0000000000000000019", 18, "1000000000000000001"),
        ]
    }

    /// Strings that are not non-negative decimals
    pub fn malformed() -> Vec<&'static str> {
        vec!["", ".", "-1", "+1", "1e18", "0x10", "1,5", "1.2.3", "one", "1 000", "NaN"]
    }
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

fn digits(range: std::ops::Range<usize>) -> impl Strategy<Value = String> {
    prop::collection::vec(0u8..10, range)
        .prop_map(|ds| ds.into_iter().map(|d| char::from(b'0' + d)).collect())
}

fn canonical_integer_part() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("0".to_string()),
        (1u8..10, digits(0..30)).prop_map(|(lead, rest)| format!("{lead}{rest}")),
    ]
}

/// Generates `(value, decimals)` where `value` is a decimal in the form the
/// adapter prints: no leading zeros, no trailing fraction zeros, and at most
/// `decimals` fraction digits.
pub fn canonical_decimal(max_decimals: u8) -> impl Strategy<Value = (String, u8)> {
    (0..=max_decimals).prop_flat_map(|decimals| {
        let fraction = if decimals == 0 {
            Just(String::new()).boxed()
        } else {
            prop_oneof![
                Just(String::new()),
                (digits(0..decimals as usize), 1u8..10)
                    .prop_map(|(body, last)| format!(".{body}{last}")),
            ]
            .boxed()
        };
        (canonical_integer_part(), fraction)
            .prop_map(move |(int, frac)| (format!("{int}{frac}"), decimals))
    })
}

/// Generates `(value, decimals, kept)` where `value` has more than
/// `decimals` fraction digits and `kept` is `value` cut after the
/// `decimals`-th one.
pub fn overlong_decimal(max_decimals: u8) -> impl Strategy<Value = (String, u8, String)> {
    (0..=max_decimals).prop_flat_map(|decimals| {
        let d = decimals as usize;
        (canonical_integer_part(), digits(d + 1..d + 8)).prop_map(move |(int, frac)| {
            let kept = if d == 0 {
                int.clone()
            } else {
                format!("{int}.{}", &frac[..d])
            };
            (format!("{int}.{frac}"), decimals, kept)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.update_wallet(ConnectionState::installed(WalletKind::MetaMask));
        assert_eq!(sink.count(), 1);
        assert!(sink.last().unwrap().installed);
    }

    #[test]
    fn test_fixed_codec() {
        let codec = FixedAddressCodec::new().with(ChainId(4), "AKTh9s", "abcdef");
        assert_eq!(codec.address_to_hex(ChainId(4), "AKTh9s").unwrap(), "abcdef");
        assert!(codec.address_to_hex(ChainId(5), "AKTh9s").is_err());
    }

    #[test]
    fn test_edge_case_amounts() {
        assert!(EdgeCaseAmounts::exact().len() > 5);
        for (value, decimals, _) in EdgeCaseAmounts::truncated() {
            let fraction = value.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
            assert!(fraction > decimals as usize, "{value} is not overlong");
        }
    }

    proptest! {
        #[test]
        fn test_canonical_decimal_shape((value, decimals) in canonical_decimal(18)) {
            let (int, frac) = value.split_once('.').unwrap_or((value.as_str(), ""));
            prop_assert!(int == "0" || !int.starts_with('0'));
            prop_assert!(!frac.ends_with('0'));
            prop_assert!(frac.len() <= decimals as usize);
        }

        #[test]
        fn test_overlong_decimal_shape((value, decimals, kept) in overlong_decimal(18)) {
            let frac = value.split_once('.').map(|(_, f)| f).unwrap_or("");
            prop_assert!(frac.len() > decimals as usize);
            prop_assert!(value.starts_with(&kept));
        }
    }
}
