//! Wallet capability traits
//!
//! The engine's seams: transaction builders, signers and stores are
//! consumed through these traits so the signing coordinator and the
//! validator never depend on a concrete backend. Local key material and
//! remote signing nodes both plug in here.

use chrono::{DateTime, Utc};
use std::any::Any;
use thiserror::Error;

use crate::coin::CoinError;
use crate::core::{BuiltTransaction, FeeError, Transaction, TransactionError, UnspentOutputLookup};
use crate::crypto::{Hash256, KeyError};
use crate::wallet::options::{OptionsError, Receiver, TransferOptions};

// =============================================================================
// Constants
// =============================================================================

/// Stable signer registry id for wallets holding local key material
pub const SIGNER_ID_LOCAL_WALLET: &str = "local.wallet";

/// Stable signer registry id for wallets delegating to a remote node
pub const SIGNER_ID_REMOTE_WALLET: &str = "remote.wallet";

/// Flat deterministic derivation from a raw seed
pub const WALLET_TYPE_DETERMINISTIC: &str = "deterministic";

/// Hierarchical (BIP44-style) derivation
pub const WALLET_TYPE_BIP44: &str = "bip44";

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised by wallet backends
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet is not ready to sign")]
    WalletNotReady,
    #[error("Address {0} does not belong to this wallet")]
    AddressNotOwned(String),
    #[error("Unsupported transaction type")]
    UnsupportedTxnType,
    #[error("Unsupported wallet type `{0}`")]
    UnsupportedWalletType(String),
    #[error("Unknown wallet {0}")]
    UnknownWallet(String),
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("Backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Crypto(#[from] KeyError),
    #[error(transparent)]
    Arithmetic(#[from] CoinError),
}

// =============================================================================
// Signing Context
// =============================================================================

/// Supplies a password on demand, keyed by a human-readable prompt.
/// Wallets call it only when they are actually encrypted.
pub type PasswordFn<'a> = &'a dyn Fn(&str) -> Result<String, WalletError>;

/// Per-call signing context. Explicit so concurrent signing sessions
/// never share mutable state.
pub struct SignContext<'a> {
    /// Resolves spent-output references to their ledger bodies
    pub lookup: &'a dyn UnspentOutputLookup,
    /// Password source for encrypted wallets
    pub password_reader: PasswordFn<'a>,
}

impl<'a> SignContext<'a> {
    pub fn new(lookup: &'a dyn UnspentOutputLookup, password_reader: PasswordFn<'a>) -> Self {
        Self {
            lookup,
            password_reader,
        }
    }
}

/// A password reader for unencrypted flows; fails if anything asks for
/// a password.
pub fn no_password(prompt: &str) -> Result<String, WalletError> {
    let _ = prompt;
    Err(WalletError::WalletNotReady)
}

// =============================================================================
// Transactions as seen by signers
// =============================================================================

/// Any transaction shape a signer may be handed. Concrete backends
/// downcast to the types they understand and reject the rest.
pub trait SignableTransaction: Any {
    /// Transaction id as hex
    fn id(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

impl SignableTransaction for Transaction {
    fn id(&self) -> String {
        self.txid().to_hex()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SignableTransaction for BuiltTransaction {
    fn id(&self) -> String {
        BuiltTransaction::id(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Capability Traits
// =============================================================================

/// Signs transaction inputs. Implemented by every wallet backend.
pub trait TxnSigner {
    /// Sign the inputs at `indexes`, returning a new transaction with the
    /// corresponding slots filled. Slots outside `indexes` are untouched;
    /// slots already holding a valid signature are left as they are.
    fn sign_transaction(
        &self,
        txn: &Transaction,
        indexes: &[usize],
        ctx: &SignContext,
    ) -> Result<Transaction, WalletError>;

    /// Whether this signer can participate in signing `txn` on behalf of
    /// `wallet`. Errors on a transaction type the backend does not
    /// recognize.
    fn ready_for_txn(
        &self,
        wallet: Option<&dyn WalletApi>,
        txn: &dyn SignableTransaction,
    ) -> Result<bool, WalletError>;

    /// Stable registry id ("local.wallet", "remote.wallet")
    fn signer_id(&self) -> &'static str;

    /// Human-readable description for signer listings
    fn signer_description(&self) -> String;
}

/// Full wallet surface: identity, addresses and transaction building
pub trait WalletApi: TxnSigner {
    fn id(&self) -> String;

    fn label(&self) -> String;

    fn set_label(&mut self, label: &str);

    fn is_encrypted(&self) -> bool;

    fn wallet_type(&self) -> String;

    /// Derive `count` addresses starting at `start`, extending the loaded
    /// set. Encrypted wallets resolve their password first.
    fn gen_addresses(
        &mut self,
        start: u32,
        count: u32,
        password_reader: PasswordFn,
    ) -> Result<AddressIterator, WalletError>;

    /// Addresses already derived and held in memory
    fn loaded_addresses(&self) -> Result<AddressIterator, WalletError>;

    /// Build an unsigned transaction paying `to`, drawing on any of the
    /// wallet's addresses
    fn transfer(
        &self,
        to: &[Receiver],
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError>;

    /// Build an unsigned transaction drawing only on `from` addresses,
    /// sending change to `change` (first source address when `None`)
    fn send_from_address(
        &self,
        from: &[String],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError>;

    /// Build an unsigned transaction spending exactly the given unspent
    /// outputs
    fn spend(
        &self,
        unspents: &[Hash256],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError>;
}

/// Wallet collection management
pub trait WalletStore {
    fn list_wallets(&self) -> Vec<WalletMeta>;

    fn create_wallet(
        &mut self,
        label: &str,
        seed: &str,
        wallet_type: &str,
        encrypt: bool,
        password_reader: PasswordFn,
        scan_n: u32,
    ) -> Result<WalletMeta, WalletError>;

    /// Whether the wallet with the given id is encrypted
    fn is_encrypted(&self, id: &str) -> Result<bool, WalletError>;

    fn default_wallet_type(&self) -> &'static str {
        WALLET_TYPE_BIP44
    }

    fn supported_wallet_types(&self) -> Vec<&'static str> {
        vec![WALLET_TYPE_DETERMINISTIC, WALLET_TYPE_BIP44]
    }
}

/// Summary of a stored wallet
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WalletMeta {
    pub id: String,
    pub label: String,
    pub encrypted: bool,
    pub wallet_type: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Address Iterator
// =============================================================================

/// Finite, restartable sequence of wallet addresses
#[derive(Debug, Clone, Default)]
pub struct AddressIterator {
    addresses: Vec<String>,
    pos: usize,
}

impl AddressIterator {
    pub fn new(addresses: Vec<String>) -> Self {
        Self { addresses, pos: 0 }
    }

    /// Restart iteration from the first address
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl Iterator for AddressIterator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let item = self.addresses.get(self.pos).cloned()?;
        self.pos += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    #[test]
    fn test_address_iterator_restartable() {
        let mut iter =
            AddressIterator::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().as_deref(), Some("a"));
        assert_eq!(iter.next().as_deref(), Some("b"));

        iter.reset();
        let collected: Vec<String> = iter.collect();
        assert_eq!(collected, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_address_iterator_exhausts() {
        let mut iter = AddressIterator::new(vec!["only".to_string()]);
        assert_eq!(iter.next().as_deref(), Some("only"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_signable_transaction_downcast() {
        let mut txn = Transaction::new();
        txn.push_input(sha256(b"ux")).unwrap();
        txn.update_header().unwrap();

        let signable: &dyn SignableTransaction = &txn;
        assert_eq!(signable.id(), txn.txid().to_hex());
        assert!(signable.as_any().downcast_ref::<Transaction>().is_some());
        assert!(signable
            .as_any()
            .downcast_ref::<BuiltTransaction>()
            .is_none());

        let built = BuiltTransaction::new(txn.clone(), 7);
        let signable: &dyn SignableTransaction = &built;
        assert_eq!(signable.id(), txn.txid().to_hex());
        assert!(signable
            .as_any()
            .downcast_ref::<BuiltTransaction>()
            .is_some());
    }

    #[test]
    fn test_no_password_refuses() {
        assert!(matches!(
            no_password("unlock"),
            Err(WalletError::WalletNotReady)
        ));
    }
}
