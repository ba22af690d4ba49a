//! Input signing descriptors
//!
//! A descriptor pairs one input position with the wallet that should
//! sign it. Descriptors are transient: built for a single coordinator
//! call and dropped afterwards, so they borrow their wallet rather than
//! owning it.

use crate::wallet::TxnSigner;

/// Instruction to sign one input with a specific wallet
pub struct InputSignDescriptor<'a> {
    /// Position of the input within the transaction
    pub input_index: usize,
    /// Registry id of the intended signer, for audit logs
    pub signer_id: Option<String>,
    /// The wallet doing the signing
    pub wallet: &'a dyn TxnSigner,
}

impl<'a> InputSignDescriptor<'a> {
    pub fn new(input_index: usize, wallet: &'a dyn TxnSigner) -> Self {
        Self {
            input_index,
            signer_id: None,
            wallet,
        }
    }

    pub fn with_signer_id(mut self, signer_id: &str) -> Self {
        self.signer_id = Some(signer_id.to_string());
        self
    }
}
