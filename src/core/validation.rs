//! Stateless transaction validation
//!
//! Two entry points: `verify_signed` for transactions claiming to be
//! complete, `verify_unsigned` for transactions still collecting
//! signatures. Check order is fixed: structural checks, then signature
//! checks, then economic checks, so every failure has a deterministic,
//! stable error identity.
//!
//! Decimal restrictions on coin amounts (multiples of the base unit) are
//! deliberately not enforced here; that policy belongs to the
//! presentation layer.

use crate::core::transaction::{
    Transaction, TransactionError, UnspentOutputLookup, MAX_TXN_ENTRIES,
};
use crate::crypto::{recover_pubkey, verify_address_signed_hash};

/// Shared structural checks: header freshness, entry presence and bounds,
/// duplicate inputs/outputs.
fn verify_structure(txn: &Transaction) -> Result<(), TransactionError> {
    if txn.inner_hash != txn.hash_inner() {
        return Err(TransactionError::HeaderMismatch);
    }
    if txn.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if txn.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    if txn.signatures.len() != txn.inputs.len() || txn.signatures.is_empty() {
        return Err(TransactionError::InvalidSignatureCount);
    }
    if txn.inputs.len() > MAX_TXN_ENTRIES || txn.outputs.len() > MAX_TXN_ENTRIES {
        return Err(TransactionError::TooManyEntries);
    }
    txn.check_duplicate_inputs()?;
    txn.check_duplicate_outputs()?;
    Ok(())
}

/// Economic checks: nonzero coin outputs, overflow-safe coin sum
fn verify_economics(txn: &Transaction) -> Result<(), TransactionError> {
    for (i, output) in txn.outputs.iter().enumerate() {
        if output.coins == 0 {
            return Err(TransactionError::ZeroCoinOutput(i));
        }
    }
    txn.output_coins_sum()?;
    Ok(())
}

/// Verify a transaction that claims to be fully signed.
///
/// Every slot must hold a signature recovering to the address that owns
/// the corresponding spent output, resolved through `lookup`.
pub fn verify_signed(
    txn: &Transaction,
    lookup: &dyn UnspentOutputLookup,
) -> Result<(), TransactionError> {
    verify_structure(txn)?;

    for (i, sig) in txn.signatures.iter().enumerate() {
        if sig.is_null() {
            return Err(TransactionError::UnsignedInput(i));
        }
        let ux = lookup.unspent_output(&txn.inputs[i])?;
        verify_address_signed_hash(&ux.owner, sig, &txn.signing_digest(i))
            .map_err(|source| TransactionError::BadSignature { index: i, source })?;
    }

    verify_economics(txn)
}

/// Verify a transaction that is still collecting signatures.
///
/// The slot count must match the input count and at least one slot must be
/// null. Any non-null slot must already verify on its own; a partially
/// signed transaction never carries an invalid signature.
pub fn verify_unsigned(
    txn: &Transaction,
    lookup: &dyn UnspentOutputLookup,
) -> Result<(), TransactionError> {
    verify_structure(txn)?;

    if !txn.has_null_signature() {
        return Err(TransactionError::AlreadyFullySigned);
    }

    for (i, sig) in txn.signatures.iter().enumerate() {
        if sig.is_null() {
            continue;
        }
        // The owner may not be resolvable while the transaction is being
        // assembled; minimally require pubkey recovery, and check the
        // owner address when the lookup knows the output.
        match lookup.unspent_output(&txn.inputs[i]) {
            Ok(ux) => verify_address_signed_hash(&ux.owner, sig, &txn.signing_digest(i))
                .map_err(|source| TransactionError::BadSignature { index: i, source })?,
            Err(TransactionError::UnknownUxOut(_)) => {
                recover_pubkey(sig, &txn.signing_digest(i))
                    .map_err(|source| TransactionError::BadSignature { index: i, source })?;
            }
            Err(e) => return Err(e),
        }
    }

    verify_economics(txn)
}

/// True iff every slot is non-null and the transaction passes
/// `verify_signed`. Structural failures surface as errors, never as
/// `true`; a transaction with missing or null slots is simply not fully
/// signed.
pub fn is_fully_signed(
    txn: &Transaction,
    lookup: &dyn UnspentOutputLookup,
) -> Result<bool, TransactionError> {
    if txn.signatures.is_empty() || txn.has_null_signature() {
        return Ok(false);
    }
    verify_signed(txn, lookup)?;
    Ok(true)
}
