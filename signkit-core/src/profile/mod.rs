//! The user profile: a lockable owner of one keyring.
//!
//! A profile starts unlocked. [`UserProfile::lock`] takes the keyring out
//! and drops it, which wipes every private key, and then publishes the new
//! state on a [`LockState`] stream. There is no way back: a fresh unlocked
//! profile has to be loaded from a store again.
//!
//! All operations take `&self` and are serialized by one mutex around the
//! keyring, so a signature in flight either completes against the keyring
//! or observes [`ProfileError::ProfileLocked`].

mod error;

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use signkit_store::KeyValueStore;
use tokio::sync::watch;

pub use error::{ProfileError, ProfileResult};

use crate::keyring::{
    Keyring, KeyringEntry, KeyringEntryId, KeyringSerialization, LocalIdentity, PublicIdentity,
};
use crate::transaction::{FullSignature, Nonce, SignedTransaction, TxCodec, UnsignedTransaction};

/// Store key of the creation timestamp record.
pub const CREATED_AT_KEY: &str = "created_at";

/// Store key of the keyring record.
pub const KEYRING_KEY: &str = "keyring";

/// Subscription to a profile's lock state.
///
/// The current value is available immediately, including for subscribers
/// created after the profile was locked.
#[derive(Debug, Clone)]
pub struct LockState(watch::Receiver<bool>);

impl LockState {
    /// Current lock state.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        *self.0.borrow()
    }

    /// Waits for the next change and returns the new state.
    ///
    /// Returns `None` once the profile has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.0.changed().await.ok()?;
        Some(*self.0.borrow_and_update())
    }

    /// Resolves once the profile is locked or dropped.
    pub async fn wait_until_locked(&mut self) {
        // An error means the profile is gone, which also means no keyring.
        let _ = self.0.wait_for(|locked| *locked).await;
    }
}

/// A lockable owner of one [`Keyring`].
#[derive(Debug)]
pub struct UserProfile {
    created_at: DateTime<Utc>,
    keyring: Mutex<Option<Keyring>>,
    lock_state: watch::Sender<bool>,
}

impl UserProfile {
    /// Creates an unlocked profile with an empty keyring.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyring(Keyring::new())
    }

    /// Creates an unlocked profile owning `keyring`, timestamped now.
    #[must_use]
    pub fn with_keyring(keyring: Keyring) -> Self {
        // Stored timestamps carry milliseconds; keep memory and store equal.
        Self::from_parts(Utc::now().trunc_subsecs(3), keyring)
    }

    fn from_parts(created_at: DateTime<Utc>, keyring: Keyring) -> Self {
        let (lock_state, _) = watch::channel(false);
        Self {
            created_at,
            keyring: Mutex::new(Some(keyring)),
            lock_state,
        }
    }

    /// When the profile was first created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends an entry to the keyring and returns its index.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] after [`lock`](Self::lock).
    pub fn add_entry(&self, entry: Box<dyn KeyringEntry>) -> ProfileResult<usize> {
        self.with_unlocked(|keyring| {
            let index = keyring.add(entry);
            log::debug!("added keyring entry #{index}");
            Ok(index)
        })
    }

    /// Number of keyring entries.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] after [`lock`](Self::lock).
    pub fn entries_count(&self) -> ProfileResult<usize> {
        self.with_unlocked(|keyring| Ok(keyring.len()))
    }

    /// Entry ids in keyring order.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] after [`lock`](Self::lock).
    pub fn entry_ids(&self) -> ProfileResult<Vec<KeyringEntryId>> {
        self.with_unlocked(|keyring| {
            Ok(keyring
                .get_entries()
                .iter()
                .map(|entry| entry.id().clone())
                .collect())
        })
    }

    /// Entry labels in keyring order.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] after [`lock`](Self::lock).
    pub fn entry_labels(&self) -> ProfileResult<Vec<Option<String>>> {
        self.with_unlocked(|keyring| {
            Ok(keyring
                .get_entries()
                .iter()
                .map(|entry| entry.label().map(str::to_owned))
                .collect())
        })
    }

    /// Sets or clears the label of entry `index`.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] or [`ProfileError::EntryNotFound`].
    pub fn set_entry_label(&self, index: usize, label: Option<String>) -> ProfileResult<()> {
        self.with_unlocked(|keyring| {
            entry_at_mut(keyring, index)?.set_label(label);
            Ok(())
        })
    }

    /// Creates an identity in entry `index`.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`], [`ProfileError::EntryNotFound`], or
    /// a keyring error from the entry.
    pub fn create_identity(&self, index: usize) -> ProfileResult<LocalIdentity> {
        self.with_unlocked(|keyring| Ok(entry_at_mut(keyring, index)?.create_identity()?))
    }

    /// Sets or clears the label of `identity` in entry `index`.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`], [`ProfileError::EntryNotFound`], or
    /// [`KeyringError::UnknownIdentity`](crate::keyring::KeyringError::UnknownIdentity).
    pub fn set_identity_label(
        &self,
        index: usize,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> ProfileResult<()> {
        self.with_unlocked(|keyring| {
            Ok(entry_at_mut(keyring, index)?.set_identity_label(identity, label)?)
        })
    }

    /// Identities of entry `index` in creation order.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`] or [`ProfileError::EntryNotFound`].
    pub fn get_identities(&self, index: usize) -> ProfileResult<Vec<LocalIdentity>> {
        self.with_unlocked(|keyring| Ok(entry_at(keyring, index)?.get_identities()))
    }

    /// Signs `transaction` at `nonce` with `identity` from entry `index`.
    ///
    /// The returned transaction has no co-signatures.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`], [`ProfileError::EntryNotFound`], or
    /// the entry's signing failure unchanged.
    pub fn sign_transaction<T, C>(
        &self,
        index: usize,
        identity: &PublicIdentity,
        transaction: T,
        codec: &C,
        nonce: Nonce,
    ) -> ProfileResult<SignedTransaction<T>>
    where
        T: UnsignedTransaction,
        C: TxCodec<T> + ?Sized,
    {
        let primary = self.full_signature(index, identity, &transaction, codec, nonce)?;
        Ok(SignedTransaction::new(transaction, primary))
    }

    /// Returns a copy of `signed` with one more signature from `identity`.
    ///
    /// Each co-signer supplies its own `nonce`. `signed` is not modified.
    ///
    /// # Errors
    ///
    /// Same as [`sign_transaction`](Self::sign_transaction).
    pub fn append_signature<T, C>(
        &self,
        index: usize,
        identity: &PublicIdentity,
        signed: &SignedTransaction<T>,
        codec: &C,
        nonce: Nonce,
    ) -> ProfileResult<SignedTransaction<T>>
    where
        T: UnsignedTransaction + Clone,
        C: TxCodec<T> + ?Sized,
    {
        let signature = self.full_signature(index, identity, &signed.transaction, codec, nonce)?;
        Ok(signed.with_signature(signature))
    }

    fn full_signature<T, C>(
        &self,
        index: usize,
        identity: &PublicIdentity,
        transaction: &T,
        codec: &C,
        nonce: Nonce,
    ) -> ProfileResult<FullSignature>
    where
        T: UnsignedTransaction,
        C: TxCodec<T> + ?Sized,
    {
        self.with_unlocked(|keyring| {
            let entry = entry_at(keyring, index)?;
            let job = codec.bytes_to_sign(transaction, nonce);
            let signature =
                entry.create_transaction_signature(identity, &job, transaction.chain_id())?;
            Ok(FullSignature {
                nonce,
                pubkey: identity.pubkey.clone(),
                signature,
            })
        })
    }

    /// Drops the keyring and marks the profile locked. Idempotent.
    pub fn lock(&self) {
        let mut guard = self.guard();
        if let Some(keyring) = guard.take() {
            log::info!("locking profile, dropping {} keyring entries", keyring.len());
            drop(keyring);
        }
        // Published under the guard so no caller sees `ProfileLocked` while
        // the state still reads unlocked.
        self.lock_state.send_replace(true);
        drop(guard);
    }

    /// Whether [`lock`](Self::lock) has been called.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        *self.lock_state.borrow()
    }

    /// Subscribes to the lock state.
    #[must_use]
    pub fn locked(&self) -> LockState {
        LockState(self.lock_state.subscribe())
    }

    /// Replaces the whole content of `store` with this profile.
    ///
    /// Exactly two records are written, [`CREATED_AT_KEY`] and
    /// [`KEYRING_KEY`]; anything else in the store is removed.
    ///
    /// # Errors
    ///
    /// [`ProfileError::ProfileLocked`], or a keyring or store error.
    pub fn store_in<S>(&self, store: &S) -> ProfileResult<()>
    where
        S: KeyValueStore + ?Sized,
    {
        let serialization = self.with_unlocked(|keyring| Ok(keyring.serialize()?))?;
        let created_at = self
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        store.replace_all(&[
            (CREATED_AT_KEY, created_at.as_str()),
            (KEYRING_KEY, serialization.as_str()),
        ])?;
        log::info!("profile stored");
        Ok(())
    }

    /// Restores an unlocked profile from `store`.
    ///
    /// # Errors
    ///
    /// [`ProfileError::MissingField`] naming the absent record,
    /// [`ProfileError::InvalidTimestamp`], or a keyring or store error.
    pub fn load_from<S>(store: &S) -> ProfileResult<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        let created_at = store
            .get(CREATED_AT_KEY)?
            .ok_or(ProfileError::MissingField(CREATED_AT_KEY))?;
        let serialization = KeyringSerialization::new(
            store
                .get(KEYRING_KEY)?
                .ok_or(ProfileError::MissingField(KEYRING_KEY))?,
        );

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| ProfileError::InvalidTimestamp(format!("{created_at:?}: {err}")))?
            .with_timezone(&Utc);
        let keyring = Keyring::deserialize(&serialization)?;

        log::info!("profile loaded with {} keyring entries", keyring.len());
        Ok(Self::from_parts(created_at, keyring))
    }

    fn guard(&self) -> MutexGuard<'_, Option<Keyring>> {
        self.keyring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_unlocked<R>(
        &self,
        f: impl FnOnce(&mut Keyring) -> ProfileResult<R>,
    ) -> ProfileResult<R> {
        let mut guard = self.guard();
        let keyring = guard.as_mut().ok_or(ProfileError::ProfileLocked)?;
        f(keyring)
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_at(keyring: &Keyring, index: usize) -> ProfileResult<&dyn KeyringEntry> {
    keyring.entry(index).ok_or(ProfileError::EntryNotFound {
        index,
        count: keyring.len(),
    })
}

fn entry_at_mut(
    keyring: &mut Keyring,
    index: usize,
) -> ProfileResult<&mut (dyn KeyringEntry + 'static)> {
    let count = keyring.len();
    keyring
        .entry_mut(index)
        .ok_or(ProfileError::EntryNotFound { index, count })
}
