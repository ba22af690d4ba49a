//! Core transaction model and validation
//!
//! This module contains the fundamental building blocks:
//! - Transactions (ordered inputs, outputs and positional signature slots)
//! - Unspent output lookups (the read-side view of the chain)
//! - Stateless validation for signed and partially signed transactions
//! - Fee computation in coin hours

pub mod fee;
pub mod transaction;
pub mod validation;

pub use fee::{compute_fee, BuiltTransaction, CoinUnit, FeeError};
pub use transaction::{
    MemoryUnspentStore, Transaction, TransactionError, TransactionOutput, UnspentOutput,
    UnspentOutputLookup, MAX_TXN_ENTRIES,
};
pub use validation::{is_fully_signed, verify_signed, verify_unsigned};
