//! Multi-wallet signing coordinator
//!
//! Collects input signing descriptors, groups consecutive runs belonging
//! to the same wallet, and hands each wallet its index set in a single
//! call. The input transaction is never mutated; callers use the
//! returned copy. Slots without a descriptor keep whatever they held,
//! so a transaction can be passed through several coordinators until
//! every slot is filled.

use log::debug;
use thiserror::Error;

use crate::core::Transaction;
use crate::signing::descriptor::InputSignDescriptor;
use crate::wallet::{SignContext, TxnSigner, WalletError};

/// Errors coordinating a signing pass
#[derive(Error, Debug)]
pub enum SignError {
    #[error("No input at index {0}")]
    UnknownInput(usize),
    #[error("No descriptors to sign with")]
    NothingToSign,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Stateless coordinator for one signing pass
pub struct SignService;

impl SignService {
    /// Run every descriptor against the transaction and return the
    /// accumulated result.
    ///
    /// Consecutive descriptors pointing at the same wallet are batched
    /// into one `sign_transaction` call, which matters for remote
    /// wallets where each call is a network round trip.
    pub fn sign(
        txn: &Transaction,
        descriptors: &[InputSignDescriptor],
        ctx: &SignContext,
    ) -> Result<Transaction, SignError> {
        if descriptors.is_empty() {
            return Err(SignError::NothingToSign);
        }
        for descriptor in descriptors {
            if descriptor.input_index >= txn.inputs.len() {
                return Err(SignError::UnknownInput(descriptor.input_index));
            }
        }

        let mut current = txn.clone();
        if current.signatures.is_empty() {
            current.signatures = vec![Default::default(); current.inputs.len()];
        }

        let mut batch_start = 0;
        while batch_start < descriptors.len() {
            let wallet = descriptors[batch_start].wallet;
            let mut batch_end = batch_start + 1;
            while batch_end < descriptors.len()
                && same_signer(wallet, descriptors[batch_end].wallet)
            {
                batch_end += 1;
            }

            let indexes: Vec<usize> = descriptors[batch_start..batch_end]
                .iter()
                .map(|d| d.input_index)
                .collect();
            debug!(
                "signer {} handling inputs {:?} of txn {}",
                wallet.signer_id(),
                indexes,
                current.txid().to_hex()
            );
            current = wallet.sign_transaction(&current, &indexes, ctx)?;
            batch_start = batch_end;
        }
        Ok(current)
    }
}

/// Identity comparison of trait objects by data pointer
fn same_signer(a: &dyn TxnSigner, b: &dyn TxnSigner) -> bool {
    std::ptr::eq(a as *const dyn TxnSigner as *const (), b as *const dyn TxnSigner as *const ())
}
