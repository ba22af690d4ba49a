//! Fee computation
//!
//! Fees on this chain are paid in coin hours: the fee of a transaction is
//! the hours carried by its inputs minus the hours assigned to its
//! outputs. The coin-unit fee (inputs minus outputs in coins) is zero for
//! any balanced transaction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::coin::{add_coins, add_hours, CoinError};
use crate::core::transaction::{Transaction, TransactionError, UnspentOutputLookup};

/// Errors computing transaction fees
#[derive(Error, Debug, PartialEq)]
pub enum FeeError {
    #[error("`{0}` is an invalid ticker. Use coin or hour")]
    InvalidTicker(String),
    #[error("Transaction outputs more than its inputs carry")]
    InsufficientInputs,
    #[error(transparent)]
    Arithmetic(#[from] CoinError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// The two denominations a balance or fee can be expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinUnit {
    Coin,
    Hour,
}

impl FromStr for CoinUnit {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coin" => Ok(CoinUnit::Coin),
            "hour" => Ok(CoinUnit::Hour),
            other => Err(FeeError::InvalidTicker(other.to_string())),
        }
    }
}

impl fmt::Display for CoinUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinUnit::Coin => write!(f, "coin"),
            CoinUnit::Hour => write!(f, "hour"),
        }
    }
}

/// Computes the fee of a transaction in the requested unit.
///
/// Every input must resolve through `lookup`; the fee is the difference
/// between what the inputs carry and what the outputs assign, in the
/// chosen denomination.
pub fn compute_fee(
    txn: &Transaction,
    unit: CoinUnit,
    lookup: &dyn UnspentOutputLookup,
) -> Result<u64, FeeError> {
    let add = match unit {
        CoinUnit::Coin => add_coins,
        CoinUnit::Hour => add_hours,
    };

    let mut input_sum: u64 = 0;
    for input in &txn.inputs {
        let ux = lookup.unspent_output(input)?;
        let carried = match unit {
            CoinUnit::Coin => ux.coins,
            CoinUnit::Hour => ux.hours,
        };
        input_sum = add(input_sum, carried)?;
    }

    let mut output_sum: u64 = 0;
    for output in &txn.outputs {
        let assigned = match unit {
            CoinUnit::Coin => output.coins,
            CoinUnit::Hour => output.hours,
        };
        output_sum = add(output_sum, assigned)?;
    }

    input_sum
        .checked_sub(output_sum)
        .ok_or(FeeError::InsufficientInputs)
}

/// A transaction produced by a wallet builder, with its fee captured at
/// construction time so callers do not need the unspent set to quote it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuiltTransaction {
    pub transaction: Transaction,
    pub fee: u64,
}

impl BuiltTransaction {
    pub fn new(transaction: Transaction, fee: u64) -> Self {
        Self { transaction, fee }
    }

    /// Transaction id (outer hash) as hex
    pub fn id(&self) -> String {
        self.transaction.txid().to_hex()
    }

    /// Fee in the requested unit. Coin fees are always zero on this chain.
    pub fn compute_fee(&self, unit: CoinUnit) -> u64 {
        match unit {
            CoinUnit::Coin => 0,
            CoinUnit::Hour => self.fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{MemoryUnspentStore, UnspentOutput};
    use crate::crypto::{sha256, KeyPair};

    fn store_with_inputs(hours: &[u64]) -> (MemoryUnspentStore, Transaction) {
        let mut store = MemoryUnspentStore::new();
        let mut txn = Transaction::new();
        for (i, h) in hours.iter().enumerate() {
            let kp = KeyPair::generate();
            let ux = UnspentOutput::new(
                &sha256(&(i as u64).to_le_bytes()),
                &kp.address(),
                1_000_000,
                *h,
            );
            txn.push_input(ux.hash).unwrap();
            store.add(ux);
        }
        (store, txn)
    }

    #[test]
    fn test_hour_fee_is_input_minus_output_hours() {
        let (store, mut txn) = store_with_inputs(&[100, 100]);
        txn.push_output(&KeyPair::generate().address(), 1_000_000, 50)
            .unwrap();
        txn.push_output(&KeyPair::generate().address(), 1_000_000, 50)
            .unwrap();
        assert_eq!(compute_fee(&txn, CoinUnit::Hour, &store), Ok(100));
    }

    #[test]
    fn test_coin_fee_of_balanced_transaction_is_zero() {
        let (store, mut txn) = store_with_inputs(&[100]);
        txn.push_output(&KeyPair::generate().address(), 1_000_000, 10)
            .unwrap();
        assert_eq!(compute_fee(&txn, CoinUnit::Coin, &store), Ok(0));
    }

    #[test]
    fn test_coin_fee_sums_multiple_inputs() {
        // Inputs carry 1_000_000 coins each; an underpaying output leaves
        // the remainder as the coin-unit difference
        let (store, mut txn) = store_with_inputs(&[10, 10]);
        txn.push_output(&KeyPair::generate().address(), 1_500_000, 5)
            .unwrap();
        assert_eq!(compute_fee(&txn, CoinUnit::Coin, &store), Ok(500_000));
        assert_eq!(compute_fee(&txn, CoinUnit::Hour, &store), Ok(15));
    }

    #[test]
    fn test_fee_rejects_output_hours_above_input_hours() {
        let (store, mut txn) = store_with_inputs(&[10]);
        txn.push_output(&KeyPair::generate().address(), 1_000_000, 20)
            .unwrap();
        assert_eq!(
            compute_fee(&txn, CoinUnit::Hour, &store),
            Err(FeeError::InsufficientInputs)
        );
    }

    #[test]
    fn test_fee_requires_known_inputs() {
        let store = MemoryUnspentStore::new();
        let mut txn = Transaction::new();
        txn.push_input(sha256(b"missing")).unwrap();
        assert!(matches!(
            compute_fee(&txn, CoinUnit::Hour, &store),
            Err(FeeError::Transaction(TransactionError::UnknownUxOut(_)))
        ));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("coin".parse::<CoinUnit>(), Ok(CoinUnit::Coin));
        assert_eq!("hour".parse::<CoinUnit>(), Ok(CoinUnit::Hour));
        assert_eq!(
            "btc".parse::<CoinUnit>(),
            Err(FeeError::InvalidTicker("btc".to_string()))
        );
    }

    #[test]
    fn test_built_transaction_quotes_captured_fee() {
        let (_, mut txn) = store_with_inputs(&[100]);
        txn.push_output(&KeyPair::generate().address(), 1_000_000, 25)
            .unwrap();
        txn.update_header().unwrap();
        let built = BuiltTransaction::new(txn.clone(), 75);
        assert_eq!(built.compute_fee(CoinUnit::Hour), 75);
        assert_eq!(built.compute_fee(CoinUnit::Coin), 0);
        assert_eq!(built.id(), txn.txid().to_hex());
    }
}
