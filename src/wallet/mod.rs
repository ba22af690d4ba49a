//! Wallet backends and capability traits
//!
//! Two backends share one trait surface: `LocalWallet` derives keys from
//! in-memory seed material, `RemoteWallet` delegates to a signing node.
//! The signing coordinator and validators consume wallets only through
//! the traits in `traits`.

pub mod local;
pub mod options;
pub mod remote;
pub mod traits;

pub use local::{LocalWallet, LocalWalletStore};
pub use options::{
    resolve_hours_selection, HoursSelection, OptionsError, Receiver, TransferOptions,
    OPT_BURN_FACTOR, OPT_HOURS_SELECTION_TYPE,
};
pub use remote::{
    decode_transaction, encode_transaction, CreateTransactionRequest, CreateWalletRequest,
    NodeError, RemoteNode, RemoteWallet, RemoteWalletStore, SignTransactionRequest,
};
pub use traits::{
    no_password, AddressIterator, PasswordFn, SignContext, SignableTransaction, TxnSigner,
    WalletApi, WalletError, WalletMeta, WalletStore, SIGNER_ID_LOCAL_WALLET,
    SIGNER_ID_REMOTE_WALLET, WALLET_TYPE_BIP44, WALLET_TYPE_DETERMINISTIC,
};
