//! Ether denominations.
//!
//! Amounts are carried as `U256` wei. Decimal strings accept up to 18
//! fractional digits for ether and 9 for gwei.

use primitive_types::U256;
use thiserror::Error;

/// Wei per gwei
pub const GWEI: u64 = 1_000_000_000;

/// Wei per ether
pub const ETHER: u64 = 1_000_000_000_000_000_000;

/// Unit conversion error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    /// Not a decimal number
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// More fractional digits than the unit allows
    #[error("too many decimal places: {0}")]
    TooPrecise(String),
    /// Result does not fit in 256 bits
    #[error("amount overflows 256 bits: {0}")]
    Overflow(String),
}

/// `amount` ether in wei.
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(ETHER)
}

/// `amount` gwei in wei.
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::from(GWEI)
}

/// Parse a decimal ether amount such as `"10"` or `"0.5"` into wei.
pub fn parse_ether(s: &str) -> Result<U256, UnitError> {
    parse_units(s, 18)
}

/// Parse a decimal gwei amount into wei.
pub fn parse_gwei(s: &str) -> Result<U256, UnitError> {
    parse_units(s, 9)
}

/// Parse a decimal string scaled by `10^decimals`.
pub fn parse_units(s: &str, decimals: usize) -> Result<U256, UnitError> {
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitError::InvalidAmount(s.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitError::InvalidAmount(s.to_string()));
    }
    if frac.len() > decimals {
        return Err(UnitError::TooPrecise(s.to_string()));
    }

    let digits = format!("{}{}{}", whole, frac, "0".repeat(decimals - frac.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| UnitError::Overflow(s.to_string()))
}

/// Format wei as a decimal ether string without trailing zeros.
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(ETHER);
    let whole = wei / unit;
    let frac = wei % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>18}", frac.to_string());
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
