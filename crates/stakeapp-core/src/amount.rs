//! Exact conversion between human token amounts and smallest units.
//!
//! Contract calls take integers in the token's smallest unit (18-decimal fixed
//! point); users type decimal strings in whole tokens. Conversion is integer
//! scaling on `U256`, never floating point.

use alloy_primitives::U256;
use std::cmp::Ordering;
use std::fmt;

/// Decimal exponent of the staked token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Errors produced while parsing a user-entered amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("'{0}' is negative")]
    Negative(String),

    #[error("'{input}' has more than {decimals} fractional digits")]
    TooManyDecimals { input: String, decimals: u8 },

    #[error("amount must be greater than zero")]
    Zero,

    #[error("'{0}' is too large")]
    Overflow(String),
}

/// `10^decimals` as a `U256`.
fn scale(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Parse a decimal string such as `"1.5"` into smallest units.
///
/// Accepts `"10"`, `"0.25"`, `".5"` and `"5."`. Trailing fractional zeros
/// beyond `decimals` are ignored; any other extra precision is rejected
/// rather than rounded. Zero is accepted here, see [`parse_positive`].
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            input: trimmed.to_string(),
            decimals,
        });
    }

    let overflow = || AmountError::Overflow(trimmed.to_string());
    let unit = scale(decimals).ok_or_else(overflow)?;

    let whole_value = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| overflow())?
    };

    let frac_value = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    whole_value
        .checked_mul(unit)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)
}

/// Parse a user amount that must be strictly positive.
pub fn parse_positive(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let value = parse_units(input, decimals)?;
    if value.is_zero() {
        return Err(AmountError::Zero);
    }
    Ok(value)
}

/// Render smallest units as a minimal decimal string (`1500000000000000000` -> `"1.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let Some(unit) = scale(decimals) else {
        return value.to_string();
    };
    let whole = value / unit;
    let frac = value % unit;
    if frac.is_zero() {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// A token amount held exactly in smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::ZERO, decimals)
    }

    /// Parse a human amount (zero allowed).
    pub fn from_human(input: &str, decimals: u8) -> Result<Self, AmountError> {
        parse_units(input, decimals).map(|raw| Self::new(raw, decimals))
    }

    /// Smallest-unit value.
    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Human decimal string.
    pub fn to_human(&self) -> String {
        format_units(self.raw, self.decimals)
    }
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::zero(TOKEN_DECIMALS)
    }
}

impl PartialOrd for TokenAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.decimals == other.decimals {
            Some(self.raw.cmp(&other.raw))
        } else {
            None
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_human())
    }
}
