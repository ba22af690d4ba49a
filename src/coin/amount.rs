//! Overflow-safe coin and hour arithmetic
//!
//! Every amount handled by the wallet engine routes through these
//! primitives: no raw addition of user-controlled values anywhere else.

use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Smallest whole coin expressed in droplets (1 coin = 1e6 droplets)
pub const COIN_UNIT: u64 = 1_000_000;

// =============================================================================
// Error Types
// =============================================================================

/// Arithmetic errors over coin and hour amounts
#[derive(Error, Debug, PartialEq)]
pub enum CoinError {
    #[error("Coin amount overflow: {0} + {1}")]
    Overflow(u64, u64),
    #[error("Hour amount overflow: {0} + {1}")]
    HoursOverflow(u64, u64),
    #[error("Amount underflow: {0} - {1}")]
    Underflow(u64, u64),
    #[error("Invalid share factor: {0}")]
    InvalidFactor(f64),
}

// =============================================================================
// Arithmetic
// =============================================================================

/// Add two coin amounts, failing on u64 overflow
pub fn add_coins(a: u64, b: u64) -> Result<u64, CoinError> {
    a.checked_add(b).ok_or(CoinError::Overflow(a, b))
}

/// Add two hour amounts, failing on u64 overflow
pub fn add_hours(a: u64, b: u64) -> Result<u64, CoinError> {
    a.checked_add(b).ok_or(CoinError::HoursOverflow(a, b))
}

/// Subtract `b` from `a`, failing when `b > a`
pub fn sub_amounts(a: u64, b: u64) -> Result<u64, CoinError> {
    a.checked_sub(b).ok_or(CoinError::Underflow(a, b))
}

/// Apply a share factor in [0.0, 1.0] to an amount, truncating toward zero.
///
/// Non-finite, negative or greater-than-one factors are rejected rather
/// than clamped so callers see misconfiguration instead of silent burns.
pub fn divide_by_factor(amount: u64, factor: f64) -> Result<u64, CoinError> {
    if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
        return Err(CoinError::InvalidFactor(factor));
    }
    Ok((amount as f64 * factor) as u64)
}

/// Check whether an amount is a whole multiple of `unit`.
///
/// Decimal restrictions are a presentation-layer policy; the validator
/// never calls this.
pub fn is_multiple_of(amount: u64, unit: u64) -> bool {
    unit != 0 && amount % unit == 0
}
