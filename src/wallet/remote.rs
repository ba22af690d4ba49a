//! Remote wallet backend
//!
//! Wraps a signing node that holds the key material. The engine never
//! sees remote secrets: transaction construction and signing are
//! delegated through the `RemoteNode` trait and results come back as
//! complete transactions. The HTTP/JSON wire layer lives behind that
//! trait, outside this crate.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::core::{BuiltTransaction, Transaction, UnspentOutputLookup};
use crate::crypto::Hash256;
use crate::wallet::options::{resolve_hours_selection, HoursSelection, Receiver, TransferOptions};
use crate::wallet::traits::{
    AddressIterator, PasswordFn, SignContext, SignableTransaction, TxnSigner, WalletApi,
    WalletError, WalletMeta, WalletStore, SIGNER_ID_REMOTE_WALLET,
};

// =============================================================================
// Error Types
// =============================================================================

/// Errors talking to a signing node
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Node request failed: {0}")]
    RequestFailed(String),
    #[error("Malformed node response: {0}")]
    MalformedResponse(String),
}

impl From<NodeError> for WalletError {
    fn from(err: NodeError) -> Self {
        WalletError::Backend(err.to_string())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Transaction construction request handed to the node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Ask for an unsigned transaction (signing happens separately)
    pub unsigned: bool,
    pub wallet_id: String,
    /// Restrict input selection to these addresses, when set
    pub addresses: Option<Vec<String>>,
    /// Spend exactly these unspent outputs, when set
    pub unspents: Option<Vec<Hash256>>,
    pub change_address: Option<String>,
    pub hours_selection: HoursSelection,
    pub to: Vec<Receiver>,
    pub ignore_unconfirmed: bool,
}

/// Signing request for a previously built transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransactionRequest {
    pub encoded_transaction: String,
    pub wallet_id: String,
    pub password: Option<String>,
    /// Input positions to sign; empty means all
    pub sign_indexes: Vec<usize>,
}

/// Wallet creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub label: String,
    pub seed: String,
    pub wallet_type: String,
    pub encrypt: bool,
    pub password: Option<String>,
    pub scan_n: u32,
}

// =============================================================================
// Remote Node
// =============================================================================

/// The signing node's API surface as the engine consumes it
pub trait RemoteNode {
    fn list_wallets(&self) -> Result<Vec<WalletMeta>, NodeError>;

    fn wallet(&self, id: &str) -> Result<WalletMeta, NodeError>;

    fn create_wallet(&self, request: &CreateWalletRequest) -> Result<WalletMeta, NodeError>;

    fn new_wallet_addresses(
        &self,
        wallet_id: &str,
        count: u32,
        password: Option<&str>,
    ) -> Result<Vec<String>, NodeError>;

    fn wallet_addresses(&self, wallet_id: &str) -> Result<Vec<String>, NodeError>;

    fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<BuiltTransaction, NodeError>;

    fn sign_transaction(
        &self,
        request: &SignTransactionRequest,
    ) -> Result<BuiltTransaction, NodeError>;
}

/// Encode a transaction for transport to the node
pub fn encode_transaction(txn: &Transaction) -> Result<String, NodeError> {
    let json = serde_json::to_vec(txn)
        .map_err(|e| NodeError::MalformedResponse(e.to_string()))?;
    Ok(hex::encode(json))
}

/// Decode a transaction received from the node
pub fn decode_transaction(encoded: &str) -> Result<Transaction, NodeError> {
    let json =
        hex::decode(encoded).map_err(|e| NodeError::MalformedResponse(e.to_string()))?;
    serde_json::from_slice(&json).map_err(|e| NodeError::MalformedResponse(e.to_string()))
}

// =============================================================================
// Remote Wallet
// =============================================================================

/// A wallet whose keys live on a signing node
pub struct RemoteWallet {
    id: String,
    label: String,
    wallet_type: String,
    encrypted: bool,
    node: Arc<dyn RemoteNode>,
}

impl RemoteWallet {
    pub fn new(meta: &WalletMeta, node: Arc<dyn RemoteNode>) -> Self {
        Self {
            id: meta.id.clone(),
            label: meta.label.clone(),
            wallet_type: meta.wallet_type.clone(),
            encrypted: meta.encrypted,
            node,
        }
    }

    fn resolve_password(&self, password_reader: PasswordFn) -> Result<Option<String>, WalletError> {
        if self.encrypted {
            Ok(Some(password_reader(&format!(
                "Password for wallet {}",
                self.id
            ))?))
        } else {
            Ok(None)
        }
    }

    fn request_transaction(
        &self,
        to: &[Receiver],
        addresses: Option<Vec<String>>,
        unspents: Option<Vec<Hash256>>,
        change_address: Option<&str>,
        options: &TransferOptions,
    ) -> Result<BuiltTransaction, WalletError> {
        let request = CreateTransactionRequest {
            unsigned: true,
            wallet_id: self.id.clone(),
            addresses,
            unspents,
            change_address: change_address.map(str::to_string),
            hours_selection: resolve_hours_selection(options, to)?,
            to: to.to_vec(),
            ignore_unconfirmed: false,
        };
        let built = self.node.create_transaction(&request)?;
        debug!("node built txn {} for wallet {}", built.id(), self.id);
        Ok(built)
    }
}

impl TxnSigner for RemoteWallet {
    fn sign_transaction(
        &self,
        txn: &Transaction,
        indexes: &[usize],
        ctx: &SignContext,
    ) -> Result<Transaction, WalletError> {
        let request = SignTransactionRequest {
            encoded_transaction: encode_transaction(txn)?,
            wallet_id: self.id.clone(),
            password: self.resolve_password(ctx.password_reader)?,
            sign_indexes: indexes.to_vec(),
        };
        let built = self.node.sign_transaction(&request)?;
        debug!(
            "node signed {} inputs of txn {} for wallet {}",
            indexes.len(),
            built.id(),
            self.id
        );
        Ok(built.transaction)
    }

    fn ready_for_txn(
        &self,
        wallet: Option<&dyn WalletApi>,
        txn: &dyn SignableTransaction,
    ) -> Result<bool, WalletError> {
        let any = txn.as_any();
        if any.downcast_ref::<Transaction>().is_none()
            && any.downcast_ref::<BuiltTransaction>().is_none()
        {
            return Err(WalletError::UnsupportedTxnType);
        }
        match wallet {
            Some(w) => Ok(w.id() == self.id),
            None => Ok(true),
        }
    }

    fn signer_id(&self) -> &'static str {
        SIGNER_ID_REMOTE_WALLET
    }

    fn signer_description(&self) -> String {
        format!("Remote wallet {}", self.id)
    }
}

impl WalletApi for RemoteWallet {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn wallet_type(&self) -> String {
        self.wallet_type.clone()
    }

    fn gen_addresses(
        &mut self,
        _start: u32,
        count: u32,
        password_reader: PasswordFn,
    ) -> Result<AddressIterator, WalletError> {
        // The node owns the derivation cursor; it always appends
        let password = self.resolve_password(password_reader)?;
        let addresses = self
            .node
            .new_wallet_addresses(&self.id, count, password.as_deref())?;
        Ok(AddressIterator::new(addresses))
    }

    fn loaded_addresses(&self) -> Result<AddressIterator, WalletError> {
        Ok(AddressIterator::new(self.node.wallet_addresses(&self.id)?))
    }

    fn transfer(
        &self,
        to: &[Receiver],
        options: &TransferOptions,
        _lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        self.request_transaction(to, None, None, None, options)
    }

    fn send_from_address(
        &self,
        from: &[String],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        _lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        self.request_transaction(to, Some(from.to_vec()), None, change, options)
    }

    fn spend(
        &self,
        unspents: &[Hash256],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        _lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        self.request_transaction(to, None, Some(unspents.to_vec()), change, options)
    }
}

// =============================================================================
// Remote Wallet Store
// =============================================================================

/// Wallet collection living on a signing node
pub struct RemoteWalletStore {
    node: Arc<dyn RemoteNode>,
}

impl RemoteWalletStore {
    pub fn new(node: Arc<dyn RemoteNode>) -> Self {
        Self { node }
    }

    /// Materialize a handle for a wallet the node knows about
    pub fn wallet(&self, id: &str) -> Result<RemoteWallet, WalletError> {
        let meta = self
            .node
            .wallet(id)
            .map_err(|_| WalletError::UnknownWallet(id.to_string()))?;
        Ok(RemoteWallet::new(&meta, Arc::clone(&self.node)))
    }
}

impl WalletStore for RemoteWalletStore {
    fn list_wallets(&self) -> Vec<WalletMeta> {
        match self.node.list_wallets() {
            Ok(wallets) => wallets,
            Err(err) => {
                warn!("listing remote wallets failed: {err}");
                Vec::new()
            }
        }
    }

    fn create_wallet(
        &mut self,
        label: &str,
        seed: &str,
        wallet_type: &str,
        encrypt: bool,
        password_reader: PasswordFn,
        scan_n: u32,
    ) -> Result<WalletMeta, WalletError> {
        let password = if encrypt {
            Some(password_reader(&format!("Password for new wallet {label}"))?)
        } else {
            None
        };
        let request = CreateWalletRequest {
            label: label.to_string(),
            seed: seed.to_string(),
            wallet_type: wallet_type.to_string(),
            encrypt,
            password,
            scan_n,
        };
        Ok(self.node.create_wallet(&request)?)
    }

    fn is_encrypted(&self, id: &str) -> Result<bool, WalletError> {
        let meta = self
            .node
            .wallet(id)
            .map_err(|_| WalletError::UnknownWallet(id.to_string()))?;
        Ok(meta.encrypted)
    }
}
