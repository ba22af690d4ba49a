//! Local wallet backend
//!
//! Holds seed material in memory and derives key entries through a
//! `KeyDeriver`. The derivation arithmetic itself (flat chain, BIP44
//! tree) is behind that trait; the wallet only tracks which entries have
//! been derived and matches them to the addresses it is asked to spend
//! from.
//!
//! Encryption at rest is out of scope; an encrypted wallet here gates key
//! use behind a password check so the signing flow is exercised the same
//! way.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;

use crate::coin::{add_coins, add_hours, divide_by_factor, sub_amounts};
use crate::core::{
    BuiltTransaction, Transaction, TransactionError, UnspentOutput, UnspentOutputLookup,
};
use crate::crypto::{sha256, Hash256, KeyDeriver, KeyPair, Sha256KeyDeriver};
use crate::wallet::options::{resolve_hours_selection, HoursSelection, Receiver, TransferOptions};
use crate::wallet::traits::{
    AddressIterator, PasswordFn, SignContext, SignableTransaction, TxnSigner, WalletApi,
    WalletError, WalletMeta, WalletStore, SIGNER_ID_LOCAL_WALLET, WALLET_TYPE_BIP44,
    WALLET_TYPE_DETERMINISTIC,
};

// =============================================================================
// Local Wallet
// =============================================================================

/// A wallet backed by in-memory seed material
pub struct LocalWallet {
    id: String,
    label: String,
    wallet_type: String,
    seed: Vec<u8>,
    password_hash: Option<Hash256>,
    entries: Vec<KeyPair>,
    deriver: Box<dyn KeyDeriver>,
    created_at: DateTime<Utc>,
}

impl LocalWallet {
    /// Create a wallet and derive its first `scan_n` entries
    pub fn new(
        id: &str,
        label: &str,
        wallet_type: &str,
        seed: &str,
        password: Option<&str>,
        scan_n: u32,
    ) -> Result<Self, WalletError> {
        if wallet_type != WALLET_TYPE_DETERMINISTIC && wallet_type != WALLET_TYPE_BIP44 {
            return Err(WalletError::UnsupportedWalletType(wallet_type.to_string()));
        }
        let mut wallet = Self {
            id: id.to_string(),
            label: label.to_string(),
            wallet_type: wallet_type.to_string(),
            seed: seed.as_bytes().to_vec(),
            password_hash: password.map(|p| sha256(p.as_bytes())),
            entries: Vec::new(),
            deriver: Box::new(Sha256KeyDeriver),
            created_at: Utc::now(),
        };
        wallet.extend_entries(scan_n)?;
        Ok(wallet)
    }

    /// Summary record for store listings
    pub fn meta(&self) -> WalletMeta {
        WalletMeta {
            id: self.id.clone(),
            label: self.label.clone(),
            encrypted: self.password_hash.is_some(),
            wallet_type: self.wallet_type.clone(),
            created_at: self.created_at,
        }
    }

    /// Derive entries until at least `upto` exist
    fn extend_entries(&mut self, upto: u32) -> Result<(), WalletError> {
        while self.entries.len() < upto as usize {
            let index = self.entries.len() as u32;
            self.entries
                .push(self.deriver.derive_key_pair(&self.seed, index)?);
        }
        Ok(())
    }

    /// Resolve the password if this wallet is gated; wrong password leaves
    /// the wallet unusable for this call.
    fn unlock(&self, password_reader: PasswordFn) -> Result<(), WalletError> {
        let Some(expected) = &self.password_hash else {
            return Ok(());
        };
        let supplied = password_reader(&format!("Password for wallet {}", self.id))?;
        if sha256(supplied.as_bytes()) != *expected {
            warn!("wrong password supplied for wallet {}", self.id);
            return Err(WalletError::WalletNotReady);
        }
        Ok(())
    }

    fn entry_for_address(&self, address: &str) -> Option<&KeyPair> {
        self.entries.iter().find(|e| e.address() == address)
    }

    fn owns_address(&self, address: &str) -> bool {
        self.entry_for_address(address).is_some()
    }

    /// Assemble an unsigned transaction from candidate unspent outputs.
    ///
    /// Candidates are consumed in order until the receiver coins are
    /// covered; hours are assigned per the resolved selection and the
    /// rest becomes the fee.
    fn build_transaction(
        &self,
        candidates: &[UnspentOutput],
        to: &[Receiver],
        change_address: &str,
        options: &TransferOptions,
    ) -> Result<BuiltTransaction, WalletError> {
        // A transaction with no receivers could never validate
        if to.is_empty() {
            return Err(TransactionError::NoOutputs.into());
        }
        let selection = resolve_hours_selection(options, to)?;

        let mut needed: u64 = 0;
        for receiver in to {
            needed = add_coins(needed, receiver.coins)?;
        }

        let mut selected = Vec::new();
        let mut have_coins: u64 = 0;
        let mut have_hours: u64 = 0;
        for ux in candidates {
            if have_coins >= needed {
                break;
            }
            have_coins = add_coins(have_coins, ux.coins)?;
            have_hours = add_hours(have_hours, ux.hours)?;
            selected.push(ux.clone());
        }
        if have_coins < needed {
            return Err(WalletError::InsufficientFunds {
                have: have_coins,
                need: needed,
            });
        }
        let change_coins = have_coins - needed;

        let mut txn = Transaction::new();
        for ux in &selected {
            txn.push_input(ux.hash)?;
        }

        let fee = match selection {
            HoursSelection::Manual { hours } => {
                let mut spent_hours: u64 = 0;
                for (receiver, h) in to.iter().zip(&hours) {
                    txn.push_output(&receiver.address, receiver.coins, *h)?;
                    spent_hours = add_hours(spent_hours, *h)?;
                }
                if change_coins > 0 {
                    txn.push_output(change_address, change_coins, 0)?;
                }
                sub_amounts(have_hours, spent_hours).map_err(|_| {
                    WalletError::InsufficientFunds {
                        have: have_hours,
                        need: spent_hours,
                    }
                })?
            }
            HoursSelection::Auto { share_factor } => {
                let burned = divide_by_factor(have_hours, share_factor)?;
                let distributable = have_hours - burned;
                let slots = to.len() + usize::from(change_coins > 0);
                let base = distributable / slots as u64;
                let extra = distributable % slots as u64;
                // Round-robin: the first `extra` outputs carry one more hour
                for (i, receiver) in to.iter().enumerate() {
                    let h = base + u64::from((i as u64) < extra);
                    txn.push_output(&receiver.address, receiver.coins, h)?;
                }
                if change_coins > 0 {
                    let i = to.len() as u64;
                    let h = base + u64::from(i < extra);
                    txn.push_output(change_address, change_coins, h)?;
                }
                burned
            }
        };

        txn.update_header()?;
        debug!(
            "wallet {} built unsigned txn {} spending {} outputs, fee {} hours",
            self.id,
            txn.txid().to_hex(),
            selected.len(),
            fee
        );
        Ok(BuiltTransaction::new(txn, fee))
    }
}

impl TxnSigner for LocalWallet {
    fn sign_transaction(
        &self,
        txn: &Transaction,
        indexes: &[usize],
        ctx: &SignContext,
    ) -> Result<Transaction, WalletError> {
        self.unlock(ctx.password_reader)?;

        let mut signed = txn.clone();
        if signed.signatures.is_empty() {
            signed.signatures = vec![Default::default(); signed.inputs.len()];
        } else if signed.signatures.len() != signed.inputs.len() {
            // A partially populated vector violates the slot-per-input
            // invariant; refuse rather than guess at positions
            return Err(TransactionError::InvalidSignatureCount.into());
        }

        for &i in indexes {
            if i >= signed.inputs.len() {
                return Err(WalletError::Backend(format!(
                    "input index {} out of range",
                    i
                )));
            }
            let digest = signed.signing_digest(i);
            let ux = ctx.lookup.unspent_output(&signed.inputs[i])?;

            // Re-signing a slot that already verifies is a no-op
            if !signed.signatures[i].is_null()
                && crate::crypto::verify_address_signed_hash(
                    &ux.owner,
                    &signed.signatures[i],
                    &digest,
                )
                .is_ok()
            {
                continue;
            }

            let entry = self
                .entry_for_address(&ux.owner)
                .ok_or_else(|| WalletError::AddressNotOwned(ux.owner.clone()))?;
            signed.signatures[i] = entry.sign_hash(&digest)?;
        }
        debug!(
            "wallet {} signed {} inputs of txn {}",
            self.id,
            indexes.len(),
            signed.txid().to_hex()
        );
        Ok(signed)
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
            Some(w) => Ok(w.id() == self.id && w.wallet_type() == self.wallet_type),
            None => Ok(true),
        }
    }

    fn signer_id(&self) -> &'static str {
        SIGNER_ID_LOCAL_WALLET
    }

    fn signer_description(&self) -> String {
        format!("Local wallet {}", self.id)
    }
}

impl WalletApi for LocalWallet {
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
        self.password_hash.is_some()
    }

    fn wallet_type(&self) -> String {
        self.wallet_type.clone()
    }

    fn gen_addresses(
        &mut self,
        start: u32,
        count: u32,
        password_reader: PasswordFn,
    ) -> Result<AddressIterator, WalletError> {
        if self.is_encrypted() {
            self.unlock(password_reader)?;
        }
        let end = start
            .checked_add(count)
            .ok_or(WalletError::Backend("address range overflow".to_string()))?;
        self.extend_entries(end)?;
        let addresses = self.entries[start as usize..end as usize]
            .iter()
            .map(KeyPair::address)
            .collect();
        Ok(AddressIterator::new(addresses))
    }

    fn loaded_addresses(&self) -> Result<AddressIterator, WalletError> {
        Ok(AddressIterator::new(
            self.entries.iter().map(KeyPair::address).collect(),
        ))
    }

    fn transfer(
        &self,
        to: &[Receiver],
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        let addresses: Vec<String> = self.entries.iter().map(KeyPair::address).collect();
        let change = addresses.first().ok_or(WalletError::WalletNotReady)?.clone();
        let candidates = lookup.outputs_for_addresses(&addresses)?;
        self.build_transaction(&candidates, to, &change, options)
    }

    fn send_from_address(
        &self,
        from: &[String],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        for address in from {
            if !self.owns_address(address) {
                return Err(WalletError::AddressNotOwned(address.clone()));
            }
        }
        let change = match change {
            Some(c) => c.to_string(),
            None => from.first().ok_or(WalletError::WalletNotReady)?.clone(),
        };
        let candidates = lookup.outputs_for_addresses(from)?;
        self.build_transaction(&candidates, to, &change, options)
    }

    fn spend(
        &self,
        unspents: &[Hash256],
        to: &[Receiver],
        change: Option<&str>,
        options: &TransferOptions,
        lookup: &dyn UnspentOutputLookup,
    ) -> Result<BuiltTransaction, WalletError> {
        let mut candidates = Vec::with_capacity(unspents.len());
        for hash in unspents {
            let ux = lookup.unspent_output(hash)?;
            if !self.owns_address(&ux.owner) {
                return Err(WalletError::AddressNotOwned(ux.owner));
            }
            candidates.push(ux);
        }
        let change = match change {
            Some(c) => c.to_string(),
            None => candidates
                .first()
                .map(|ux| ux.owner.clone())
                .ok_or(WalletError::WalletNotReady)?,
        };
        self.build_transaction(&candidates, to, &change, options)
    }
}

// =============================================================================
// Local Wallet Store
// =============================================================================

/// In-memory collection of local wallets
#[derive(Default)]
pub struct LocalWalletStore {
    wallets: HashMap<String, LocalWallet>,
    next_id: u64,
}

impl LocalWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallet(&self, id: &str) -> Result<&LocalWallet, WalletError> {
        self.wallets
            .get(id)
            .ok_or_else(|| WalletError::UnknownWallet(id.to_string()))
    }

    pub fn wallet_mut(&mut self, id: &str) -> Result<&mut LocalWallet, WalletError> {
        self.wallets
            .get_mut(id)
            .ok_or_else(|| WalletError::UnknownWallet(id.to_string()))
    }
}

impl WalletStore for LocalWalletStore {
    fn list_wallets(&self) -> Vec<WalletMeta> {
        let mut metas: Vec<WalletMeta> = self.wallets.values().map(LocalWallet::meta).collect();
        metas.sort_by(|a, b| a.id.cmp(&b.id));
        metas
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
        let id = format!("wallet-{:03}", self.next_id);
        self.next_id += 1;

        let wallet = LocalWallet::new(&id, label, wallet_type, seed, password.as_deref(), scan_n)?;
        let meta = wallet.meta();
        debug!(
            "created {} wallet {} ({}), {} addresses scanned",
            wallet_type, id, label, scan_n
        );
        self.wallets.insert(id, wallet);
        Ok(meta)
    }

    fn is_encrypted(&self, id: &str) -> Result<bool, WalletError> {
        Ok(self.wallet(id)?.is_encrypted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{compute_fee, verify_unsigned, CoinUnit, MemoryUnspentStore};
    use crate::wallet::options::{OPT_BURN_FACTOR, OPT_HOURS_SELECTION_TYPE};
    use crate::wallet::traits::no_password;

    fn funded_wallet(coins_per_output: &[u64], hours_per_output: &[u64])
        -> (LocalWallet, MemoryUnspentStore)
    {
        let wallet =
            LocalWallet::new("w-test", "test", WALLET_TYPE_DETERMINISTIC, "test seed", None, 3)
                .unwrap();
        let mut store = MemoryUnspentStore::new();
        let addresses: Vec<String> = wallet.loaded_addresses().unwrap().collect();
        for (i, (&coins, &hours)) in coins_per_output.iter().zip(hours_per_output).enumerate() {
            store.add(UnspentOutput::new(
                &sha256(&(i as u64).to_le_bytes()),
                &addresses[i % addresses.len()],
                coins,
                hours,
            ));
        }
        (wallet, store)
    }

    #[test]
    fn test_same_seed_derives_same_addresses() {
        let a = LocalWallet::new("a", "a", WALLET_TYPE_DETERMINISTIC, "seed", None, 4).unwrap();
        let b = LocalWallet::new("b", "b", WALLET_TYPE_DETERMINISTIC, "seed", None, 4).unwrap();
        let a_addrs: Vec<String> = a.loaded_addresses().unwrap().collect();
        let b_addrs: Vec<String> = b.loaded_addresses().unwrap().collect();
        assert_eq!(a_addrs, b_addrs);
        assert_eq!(a_addrs.len(), 4);
    }

    #[test]
    fn test_rejects_unknown_wallet_type() {
        assert!(matches!(
            LocalWallet::new("w", "w", "hardware", "seed", None, 1),
            Err(WalletError::UnsupportedWalletType(t)) if t == "hardware"
        ));
    }

    #[test]
    fn test_gen_addresses_extends_and_slices() {
        let mut wallet =
            LocalWallet::new("w", "w", WALLET_TYPE_BIP44, "seed", None, 2).unwrap();
        let more: Vec<String> = wallet.gen_addresses(2, 3, &no_password).unwrap().collect();
        assert_eq!(more.len(), 3);
        assert_eq!(wallet.loaded_addresses().unwrap().len(), 5);

        // Same range again yields the same addresses
        let again: Vec<String> = wallet.gen_addresses(2, 3, &no_password).unwrap().collect();
        assert_eq!(more, again);
    }

    #[test]
    fn test_encrypted_wallet_requires_password() {
        let mut wallet =
            LocalWallet::new("w", "w", WALLET_TYPE_BIP44, "seed", Some("hunter2"), 1).unwrap();
        assert!(wallet.is_encrypted());

        let wrong = |_: &str| Ok("wrong".to_string());
        assert!(matches!(
            wallet.gen_addresses(1, 1, &wrong),
            Err(WalletError::WalletNotReady)
        ));

        let right = |_: &str| Ok("hunter2".to_string());
        assert_eq!(wallet.gen_addresses(1, 1, &right).unwrap().len(), 1);
    }

    #[test]
    fn test_transfer_builds_unsigned_with_change_and_fee() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let mut options = TransferOptions::new();
        options.set_value(OPT_BURN_FACTOR, "0.5");

        let to = vec![Receiver::new("destination-address", 2_000_000)];
        let built = wallet.transfer(&to, &options, &store).unwrap();

        // One receiver output plus change
        assert_eq!(built.transaction.outputs.len(), 2);
        assert_eq!(built.transaction.outputs[0].coins, 2_000_000);
        assert_eq!(built.transaction.outputs[1].coins, 3_000_000);
        assert_eq!(built.fee, 50);
        assert_eq!(compute_fee(&built.transaction, CoinUnit::Hour, &store), Ok(50));

        // Unsigned but structurally valid
        let mut unsigned = built.transaction.clone();
        unsigned.signatures = vec![Default::default(); unsigned.inputs.len()];
        verify_unsigned(&unsigned, &store).unwrap();
    }

    #[test]
    fn test_transfer_manual_hours() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let mut options = TransferOptions::new();
        options.set_value(OPT_HOURS_SELECTION_TYPE, "manual");

        let to = vec![Receiver::with_hours("destination-address", 5_000_000, 30)];
        let built = wallet.transfer(&to, &options, &store).unwrap();

        assert_eq!(built.transaction.outputs.len(), 1);
        assert_eq!(built.transaction.outputs[0].hours, 30);
        assert_eq!(built.fee, 70);
    }

    #[test]
    fn test_transfer_rejects_empty_receiver_list() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        assert!(matches!(
            wallet.transfer(&[], &TransferOptions::new(), &store),
            Err(WalletError::Transaction(TransactionError::NoOutputs))
        ));
    }

    #[test]
    fn test_transfer_manual_hours_above_input_hours() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let mut options = TransferOptions::new();
        options.set_value(OPT_HOURS_SELECTION_TYPE, "manual");

        let to = vec![Receiver::with_hours("destination-address", 5_000_000, 200)];
        assert!(matches!(
            wallet.transfer(&to, &options, &store),
            Err(WalletError::InsufficientFunds {
                have: 100,
                need: 200
            })
        ));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let (wallet, store) = funded_wallet(&[1_000_000], &[100]);
        let to = vec![Receiver::new("destination-address", 2_000_000)];
        assert!(matches!(
            wallet.transfer(&to, &TransferOptions::new(), &store),
            Err(WalletError::InsufficientFunds {
                have: 1_000_000,
                need: 2_000_000
            })
        ));
    }

    #[test]
    fn test_send_from_address_rejects_foreign_source() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let to = vec![Receiver::new("destination-address", 1_000_000)];
        assert!(matches!(
            wallet.send_from_address(
                &["not-my-address".to_string()],
                &to,
                None,
                &TransferOptions::new(),
                &store
            ),
            Err(WalletError::AddressNotOwned(_))
        ));
    }

    #[test]
    fn test_spend_exact_outputs() {
        let (wallet, store) = funded_wallet(&[3_000_000, 4_000_000], &[60, 40]);
        let hashes: Vec<Hash256> = {
            let addrs: Vec<String> = wallet.loaded_addresses().unwrap().collect();
            store
                .outputs_for_addresses(&addrs)
                .unwrap()
                .iter()
                .map(|ux| ux.hash)
                .collect()
        };

        let to = vec![Receiver::new("destination-address", 6_000_000)];
        let built = wallet
            .spend(&hashes, &to, Some("change-address"), &TransferOptions::new(), &store)
            .unwrap();
        assert_eq!(built.transaction.inputs.len(), 2);
        assert_eq!(built.transaction.outputs[1].address, "change-address");
        assert_eq!(built.transaction.outputs[1].coins, 1_000_000);
    }

    #[test]
    fn test_sign_transaction_fills_owned_slots() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let to = vec![Receiver::new("destination-address", 2_000_000)];
        let built = wallet.transfer(&to, &TransferOptions::new(), &store).unwrap();

        let ctx = SignContext::new(&store, &no_password);
        let signed = wallet
            .sign_transaction(&built.transaction, &[0], &ctx)
            .unwrap();
        assert!(!signed.signatures[0].is_null());
        crate::core::verify_signed(&signed, &store).unwrap();

        // Signing again leaves the valid slot untouched
        let resigned = wallet.sign_transaction(&signed, &[0], &ctx).unwrap();
        assert_eq!(resigned.signatures, signed.signatures);
    }

    #[test]
    fn test_sign_transaction_rejects_short_signature_vector() {
        let (wallet, store) = funded_wallet(&[3_000_000, 4_000_000], &[60, 40]);
        let to = vec![Receiver::new("destination-address", 6_000_000)];
        let built = wallet.transfer(&to, &TransferOptions::new(), &store).unwrap();
        assert_eq!(built.transaction.inputs.len(), 2);

        // One slot for two inputs breaks the slot-per-input invariant
        let mut short = built.transaction.clone();
        short.signatures = vec![Default::default()];

        let ctx = SignContext::new(&store, &no_password);
        assert!(matches!(
            wallet.sign_transaction(&short, &[1], &ctx),
            Err(WalletError::Transaction(
                TransactionError::InvalidSignatureCount
            ))
        ));
    }

    #[test]
    fn test_ready_for_txn_matrix() {
        let (wallet, store) = funded_wallet(&[5_000_000], &[100]);
        let to = vec![Receiver::new("destination-address", 2_000_000)];
        let built = wallet.transfer(&to, &TransferOptions::new(), &store).unwrap();

        assert!(wallet.ready_for_txn(None, &built).unwrap());
        assert!(wallet.ready_for_txn(Some(&wallet), &built).unwrap());

        let other =
            LocalWallet::new("w-other", "other", WALLET_TYPE_BIP44, "other seed", None, 1).unwrap();
        assert!(!wallet.ready_for_txn(Some(&other), &built).unwrap());

        struct AlienTxn;
        impl SignableTransaction for AlienTxn {
            fn id(&self) -> String {
                "alien".to_string()
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
        assert!(matches!(
            wallet.ready_for_txn(None, &AlienTxn),
            Err(WalletError::UnsupportedTxnType)
        ));
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = LocalWalletStore::new();
        assert_eq!(store.default_wallet_type(), WALLET_TYPE_BIP44);
        assert_eq!(
            store.supported_wallet_types(),
            vec![WALLET_TYPE_DETERMINISTIC, WALLET_TYPE_BIP44]
        );

        let meta = store
            .create_wallet("savings", "seed one", WALLET_TYPE_BIP44, false, &no_password, 2)
            .unwrap();
        assert!(!meta.encrypted);
        assert!(!store.is_encrypted(&meta.id).unwrap());

        let pwd = |_: &str| Ok("hunter2".to_string());
        let enc = store
            .create_wallet("vault", "seed two", WALLET_TYPE_DETERMINISTIC, true, &pwd, 1)
            .unwrap();
        assert!(enc.encrypted);
        assert!(store.is_encrypted(&enc.id).unwrap());

        assert_eq!(store.list_wallets().len(), 2);
        assert!(matches!(
            store.is_encrypted("wallet-999"),
            Err(WalletError::UnknownWallet(_))
        ));

        store.wallet_mut(&meta.id).unwrap().set_label("spending");
        assert_eq!(store.wallet(&meta.id).unwrap().label(), "spending");
    }
}
