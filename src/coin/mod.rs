//! Coin and hour amount arithmetic
//!
//! Checked arithmetic over the two resource units tracked per output:
//! coins and coin hours.

pub mod amount;

pub use amount::{
    add_coins, add_hours, divide_by_factor, is_multiple_of, sub_amounts, CoinError, COIN_UNIT,
};
