//! Transaction value object
//!
//! A UTXO transaction: ordered input references, ordered outputs, ordered
//! signature slots and an inner hash binding inputs and outputs. Pure data
//! with structural invariants; validation lives in `core::validation`.
//!
//! Lifecycle: construct empty, append inputs/outputs, finalize the header
//! with `update_header`, then attach signatures. Signing after a structural
//! change invalidates prior signatures because the inner hash moves.

use crate::coin::{add_coins, CoinError};
use crate::crypto::{add_sha256, sha256, sign_hash, Hash256, KeyError, Signature};
use secp256k1::SecretKey;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Protocol bound on input, output and signature counts per transaction
pub const MAX_TXN_ENTRIES: usize = u16::MAX as usize;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction structure and validation errors
#[derive(Error, Debug, PartialEq)]
pub enum TransactionError {
    #[error("InnerHash does not match computed hash")]
    HeaderMismatch,
    #[error("No inputs")]
    NoInputs,
    #[error("No outputs")]
    NoOutputs,
    #[error("Invalid number of signatures")]
    InvalidSignatureCount,
    #[error("Too many signatures and inputs")]
    TooManyEntries,
    #[error("Duplicate spend: {0}")]
    DuplicateSpend(Hash256),
    #[error("Duplicate output in transaction (output {0})")]
    DuplicateOutput(usize),
    #[error("Unsigned input in transaction (input {0})")]
    UnsignedInput(usize),
    #[error("Invalid signature for input {index}: {source}")]
    BadSignature { index: usize, source: KeyError },
    #[error("Zero coin output (output {0})")]
    ZeroCoinOutput(usize),
    #[error("Output coins overflow")]
    CoinOverflow(#[from] CoinError),
    #[error("Unsigned transaction must contain a null signature")]
    AlreadyFullySigned,
    #[error("Unknown unspent output {0}")]
    UnknownUxOut(Hash256),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

// =============================================================================
// Transaction Output
// =============================================================================

/// Transaction output: destination address, coin amount and hour amount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionOutput {
    /// Recipient's address
    pub address: String,
    /// Amount of coins
    pub coins: u64,
    /// Amount of coin hours carried by the output
    pub hours: u64,
}

// =============================================================================
// Unspent Output
// =============================================================================

/// An unspent transaction output, referenced by hash as a transaction input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnspentOutput {
    /// Hash identifying this output on the ledger
    pub hash: Hash256,
    /// Address that owns the output and must sign to spend it
    pub owner: String,
    /// Coin amount held
    pub coins: u64,
    /// Hour amount held
    pub hours: u64,
}

impl UnspentOutput {
    /// Create an unspent output, deriving its ledger hash from the
    /// source transaction and body fields
    pub fn new(source_txn: &Hash256, owner: &str, coins: u64, hours: u64) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(source_txn.as_bytes());
        buf.extend_from_slice(owner.as_bytes());
        buf.extend_from_slice(&coins.to_le_bytes());
        buf.extend_from_slice(&hours.to_le_bytes());
        Self {
            hash: sha256(&buf),
            owner: owner.to_string(),
            coins,
            hours,
        }
    }
}

/// Lookup of unspent outputs against a ledger. The discovery mechanism
/// (node API, database) is an external collaborator; the engine only
/// depends on this narrow interface.
pub trait UnspentOutputLookup {
    /// Resolve a spent-output reference to its body
    fn unspent_output(&self, hash: &Hash256) -> Result<UnspentOutput, TransactionError>;

    /// List unspent outputs owned by any of the given addresses
    fn outputs_for_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<UnspentOutput>, TransactionError>;
}

/// In-memory unspent output set. Explicit per-test/per-call context object;
/// also serves small embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnspentStore {
    outputs: HashMap<Hash256, UnspentOutput>,
}

impl MemoryUnspentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unspent output
    pub fn add(&mut self, output: UnspentOutput) {
        self.outputs.insert(output.hash, output);
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl UnspentOutputLookup for MemoryUnspentStore {
    fn unspent_output(&self, hash: &Hash256) -> Result<UnspentOutput, TransactionError> {
        self.outputs
            .get(hash)
            .cloned()
            .ok_or(TransactionError::UnknownUxOut(*hash))
    }

    fn outputs_for_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<UnspentOutput>, TransactionError> {
        let mut found: Vec<UnspentOutput> = self
            .outputs
            .values()
            .filter(|ux| addresses.iter().any(|a| *a == ux.owner))
            .cloned()
            .collect();
        // Deterministic order for selection and tests
        found.sort_by(|a, b| a.hash.cmp(&b.hash));
        Ok(found)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A wallet transaction with positional signature slots
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Digest binding the ordered inputs and outputs
    pub inner_hash: Hash256,
    /// Hashes of the unspent outputs being spent
    pub inputs: Vec<Hash256>,
    /// Created outputs
    pub outputs: Vec<TransactionOutput>,
    /// One slot per input, positionally matched; null means unsigned
    pub signatures: Vec<Signature>,
}

impl Transaction {
    /// Create a new empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spent-output reference. Append-only; never mutates
    /// existing entries.
    pub fn push_input(&mut self, hash: Hash256) -> Result<(), TransactionError> {
        if self.inputs.len() >= MAX_TXN_ENTRIES {
            return Err(TransactionError::TooManyEntries);
        }
        self.inputs.push(hash);
        Ok(())
    }

    /// Append an output
    pub fn push_output(
        &mut self,
        address: &str,
        coins: u64,
        hours: u64,
    ) -> Result<(), TransactionError> {
        if self.outputs.len() >= MAX_TXN_ENTRIES {
            return Err(TransactionError::TooManyEntries);
        }
        self.outputs.push(TransactionOutput {
            address: address.to_string(),
            coins,
            hours,
        });
        Ok(())
    }

    /// Digest of the ordered inputs and outputs. Pure function of the
    /// current contents; does not touch the stored header.
    pub fn hash_inner(&self) -> Hash256 {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.as_bytes());
        }
        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&(output.address.len() as u32).to_le_bytes());
            buf.extend_from_slice(output.address.as_bytes());
            buf.extend_from_slice(&output.coins.to_le_bytes());
            buf.extend_from_slice(&output.hours.to_le_bytes());
        }
        sha256(&buf)
    }

    /// Recompute and store the inner hash. Call once inputs and outputs
    /// are final, before signing.
    pub fn update_header(&mut self) -> Result<(), TransactionError> {
        if self.inputs.len() > MAX_TXN_ENTRIES || self.outputs.len() > MAX_TXN_ENTRIES {
            return Err(TransactionError::TooManyEntries);
        }
        self.inner_hash = self.hash_inner();
        Ok(())
    }

    /// The digest signed for input `index`
    pub fn signing_digest(&self, index: usize) -> Hash256 {
        add_sha256(&self.inner_hash, &self.inputs[index])
    }

    /// Bulk-sign all inputs positionally with the given keys.
    ///
    /// Test and bootstrap use only; production signing goes through the
    /// signing coordinator so each wallet signs only the inputs it owns.
    pub fn sign_inputs(&mut self, keys: &[SecretKey]) -> Result<(), TransactionError> {
        if keys.len() != self.inputs.len() {
            return Err(TransactionError::InvalidSignatureCount);
        }
        let mut sigs = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            sigs.push(sign_hash(key, &self.signing_digest(i))?);
        }
        self.signatures = sigs;
        Ok(())
    }

    /// Transaction id: digest over the header and the signature slots
    pub fn txid(&self) -> Hash256 {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.inner_hash.as_bytes());
        for sig in &self.signatures {
            buf.extend_from_slice(&sig.0);
        }
        sha256(&buf)
    }

    /// Whether any signature slot is the null placeholder
    pub fn has_null_signature(&self) -> bool {
        self.signatures.iter().any(|s| s.is_null())
    }

    /// Find the position of an input reference
    pub fn input_index(&self, hash: &Hash256) -> Option<usize> {
        self.inputs.iter().position(|h| h == hash)
    }

    /// Check inputs are pairwise distinct; reports the first repeated hash
    pub fn check_duplicate_inputs(&self) -> Result<(), TransactionError> {
        let mut seen = HashSet::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !seen.insert(input) {
                return Err(TransactionError::DuplicateSpend(*input));
            }
        }
        Ok(())
    }

    /// Check outputs are pairwise distinct on (address, coins, hours)
    pub fn check_duplicate_outputs(&self) -> Result<(), TransactionError> {
        let mut seen = HashSet::with_capacity(self.outputs.len());
        for (i, output) in self.outputs.iter().enumerate() {
            if !seen.insert(output) {
                return Err(TransactionError::DuplicateOutput(i));
            }
        }
        Ok(())
    }

    /// Sum of output coins via checked arithmetic
    pub fn output_coins_sum(&self) -> Result<u64, TransactionError> {
        let mut sum = 0u64;
        for output in &self.outputs {
            sum = add_coins(sum, output.coins)?;
        }
        Ok(sum)
    }
}
