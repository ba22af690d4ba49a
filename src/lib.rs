//! UTXO wallet engine: transaction construction, multi-party signing
//! and validation for a chain with a secondary coin-hours resource
//!
//! This crate provides:
//! - A transaction value object with positional signature slots
//! - Stateless validation for signed and partially signed transactions
//! - Recoverable ECDSA signatures (secp256k1) with base58check addresses
//! - Local wallets deriving keys from seed material
//! - Remote wallets delegating to a signing node behind a trait
//! - A coordinator letting several wallets each sign the inputs they own
//!
//! # Example
//!
//! ```rust
//! use utxo_wallet::core::{verify_signed, MemoryUnspentStore, Transaction, UnspentOutput};
//! use utxo_wallet::crypto::{sha256, KeyPair};
//!
//! // Fund an address with one unspent output
//! let keys = KeyPair::generate();
//! let mut ledger = MemoryUnspentStore::new();
//! let funding = UnspentOutput::new(&sha256(b"coinbase"), &keys.address(), 2_000_000, 100);
//! ledger.add(funding.clone());
//!
//! // Spend it
//! let mut txn = Transaction::new();
//! txn.push_input(funding.hash).unwrap();
//! txn.push_output(&KeyPair::generate().address(), 2_000_000, 50).unwrap();
//! txn.update_header().unwrap();
//! txn.sign_inputs(&[keys.secret_key]).unwrap();
//!
//! verify_signed(&txn, &ledger).unwrap();
//! ```

pub mod coin;
pub mod core;
pub mod crypto;
pub mod signing;
pub mod wallet;

// Re-export commonly used types
pub use coin::{CoinError, COIN_UNIT};
pub use core::{
    compute_fee, is_fully_signed, verify_signed, verify_unsigned, BuiltTransaction, CoinUnit,
    MemoryUnspentStore, Transaction, TransactionError, UnspentOutput, UnspentOutputLookup,
};
pub use crypto::{Hash256, KeyPair, Signature};
pub use signing::{InputSignDescriptor, SignError, SignService};
pub use wallet::{
    LocalWallet, LocalWalletStore, Receiver, RemoteNode, RemoteWallet, RemoteWalletStore,
    SignContext, TransferOptions, TxnSigner, WalletApi, WalletError, WalletStore,
};
