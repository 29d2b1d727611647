//! Exact conversion between decimal token amounts and on-chain integers.

use std::fmt;

use alloy::primitives::U256;
use thiserror::Error;
use xbridge_error::WalletError;

/// Precision of every EVM chain's native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// A malformed or unrepresentable amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Not a non-negative decimal number
    #[error("Invalid decimal value '{0}'")]
    Format(String),

    /// Does not fit in 256 bits once scaled
    #[error("Value '{value}' overflows uint256 at {decimals} decimals")]
    Overflow {
        /// The offending input
        value: String,
        /// Precision it was scaled by
        decimals: u8,
    },
}

impl From<AmountError> for WalletError {
    fn from(err: AmountError) -> Self {
        WalletError::unknown(err.to_string()).with_cause(err)
    }
}

/// Splits a decimal string into integer and fraction digits.
fn split_decimal(value: &str) -> Result<(&str, &str), AmountError> {
    let trimmed = value.trim();
    let (int, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(AmountError::Format(value.to_string()));
    }
    Ok((int, frac))
}

/// Scales a decimal string up by `decimals` digits.
///
/// Fraction digits beyond `decimals` are truncated, never rounded.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, AmountError> {
    let (int, frac) = split_decimal(value)?;
    let scale = decimals as usize;
    let kept = &frac[..frac.len().min(scale)];

    let mut digits = String::with_capacity(int.len() + scale);
    digits.push_str(int);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(scale - kept.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow {
        value: value.to_string(),
        decimals,
    })
}

/// Scales an integer down by `decimals` digits.
///
/// The result carries no trailing fraction zeros and no dangling point.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    if decimals == 0 {
        return digits;
    }

    let scale = decimals as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int, frac) = padded.split_at(padded.len() - scale);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    }
}

/// Decimal string to base-10 integer string.
pub fn decimal_to_integer(value: &str, decimals: u8) -> Result<String, AmountError> {
    parse_units(value, decimals).map(|v| v.to_string())
}

/// Base-10 integer string to decimal string.
pub fn integer_to_decimal(value: &str, decimals: u8) -> Result<String, AmountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Format(value.to_string()));
    }
    let raw = U256::from_str_radix(trimmed, 10).map_err(|_| AmountError::Overflow {
        value: value.to_string(),
        decimals,
    })?;
    Ok(format_units(raw, decimals))
}

/// A decimal value paired with the precision it is expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    value: String,
    decimals: u8,
}

impl TokenAmount {
    /// Creates an amount from a decimal string.
    pub fn new(value: impl Into<String>, decimals: u8) -> Self {
        Self {
            value: value.into(),
            decimals,
        }
    }

    /// Creates an amount from the raw on-chain integer.
    pub fn from_integer(raw: U256, decimals: u8) -> Self {
        Self {
            value: format_units(raw, decimals),
            decimals,
        }
    }

    /// Returns the decimal string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the precision.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Returns the raw on-chain integer, truncating excess fraction digits.
    pub fn to_integer(&self) -> Result<U256, AmountError> {
        parse_units(&self.value, self.decimals)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
