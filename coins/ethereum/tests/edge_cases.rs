//! Edge case and property tests for amounts, addresses and error mapping.

use proptest::prelude::*;
use xbridge_error::{ClassificationRule, ErrorClassifier, ErrorKind, ProviderError};
use xbridge_ethereum::{
    decimal_to_integer, integer_to_decimal, parse_address, parse_units, AmountError, TokenAmount,
};
use xbridge_testing::{canonical_decimal, overlong_decimal, EdgeCaseAddresses, EdgeCaseAmounts};

// ============================================================================
// Amounts
// ============================================================================

#[test]
fn test_exact_amounts() {
    for (decimal, decimals, integer) in EdgeCaseAmounts::exact() {
        assert_eq!(
            decimal_to_integer(decimal, decimals).unwrap(),
            integer,
            "{decimal} at {decimals}"
        );
        assert_eq!(
            integer_to_decimal(integer, decimals).unwrap(),
            decimal,
            "{integer} at {decimals}"
        );
    }
}

#[test]
fn test_truncated_amounts() {
    for (decimal, decimals, integer) in EdgeCaseAmounts::truncated() {
        assert_eq!(
            decimal_to_integer(decimal, decimals).unwrap(),
            integer,
            "{decimal} at {decimals}"
        );
    }
}

#[test]
fn test_malformed_amounts() {
    for input in EdgeCaseAmounts::malformed() {
        assert!(
            matches!(decimal_to_integer(input, 18), Err(AmountError::Format(_))),
            "{input:?} should be rejected"
        );
    }
}

#[test]
fn test_overflow_is_reported() {
    let too_big = format!("1{}", "0".repeat(78));
    assert!(matches!(
        parse_units(&too_big, 0),
        Err(AmountError::Overflow { .. })
    ));
    assert!(matches!(
        parse_units("1", 78),
        Err(AmountError::Overflow { .. })
    ));
}

#[test]
fn test_token_amount_display() {
    let amount = TokenAmount::new("0.50", 6);
    assert_eq!(amount.to_integer().unwrap().to_string(), "500000");
    assert_eq!(TokenAmount::from_integer(amount.to_integer().unwrap(), 6).to_string(), "0.5");
}

proptest! {
    #[test]
    fn test_round_trip((value, decimals) in canonical_decimal(30)) {
        let integer = decimal_to_integer(&value, decimals).unwrap();
        prop_assert_eq!(integer_to_decimal(&integer, decimals).unwrap(), value);
    }

    #[test]
    fn test_excess_digits_truncate((value, decimals, kept) in overlong_decimal(18)) {
        prop_assert_eq!(
            decimal_to_integer(&value, decimals).unwrap(),
            decimal_to_integer(&kept, decimals).unwrap()
        );
    }

    #[test]
    fn test_integer_output_has_no_separator((value, decimals) in canonical_decimal(18)) {
        let integer = decimal_to_integer(&value, decimals).unwrap();
        prop_assert!(integer.chars().all(|c| c.is_ascii_digit()));
    }
}

// ============================================================================
// Addresses
// ============================================================================

#[test]
fn test_valid_addresses_parse() {
    let checksummed = parse_address(EdgeCaseAddresses::ETH_VALID).unwrap();
    let lower = parse_address(EdgeCaseAddresses::ETH_VALID_LOWER).unwrap();
    assert_eq!(checksummed, lower);
    assert!(parse_address(EdgeCaseAddresses::ETH_ZERO).unwrap().is_zero());
    assert!(parse_address(EdgeCaseAddresses::ETH_MAX).is_ok());
}

#[test]
fn test_invalid_addresses_rejected() {
    for input in EdgeCaseAddresses::invalid_ethereum() {
        let err = parse_address(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown, "{input:?}");
    }
}

// ============================================================================
// Error classification
// ============================================================================

#[test]
fn test_wallet_messages() {
    let classifier = ErrorClassifier::default();
    let cases = [
        (
            ProviderError::with_code(4001, "MetaMask Tx Signature: User denied transaction signature."),
            ErrorKind::UserRejected,
        ),
        (ProviderError::new("Rejected by user"), ErrorKind::UserRejected),
        (
            ProviderError::with_code(-32000, "insufficient funds for gas * price + value"),
            ErrorKind::InsufficientFunds,
        ),
        (ProviderError::with_code(-32000, "nonce too low"), ErrorKind::Unknown),
    ];
    for (error, kind) in cases {
        let message = error.message.clone();
        assert_eq!(classifier.classify(error).kind(), kind, "{message}");
    }
}

#[test]
fn test_classification_is_stable() {
    let classifier = ErrorClassifier::default();
    let first = classifier.classify(ProviderError::new("User denied account authorization"));
    let kind = first.kind();
    let message = first.message().to_string();
    let second = classifier.classify(first);
    assert_eq!(second.kind(), kind);
    assert_eq!(second.message(), message);
}

#[test]
fn test_custom_rules_extend_defaults() {
    let mut classifier = ErrorClassifier::default();
    classifier.push_rule(ClassificationRule::message(
        "gas required exceeds allowance",
        ErrorKind::InsufficientFunds,
    ));
    let err = classifier.classify(ProviderError::new(
        "gas required exceeds allowance (8000000)",
    ));
    assert!(err.is_insufficient_funds());
}

#[test]
fn test_amount_errors_classify_as_unknown() {
    let err: xbridge_error::WalletError = decimal_to_integer("1.2.3", 18).unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Unknown);
}
