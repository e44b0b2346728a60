//! Access-token store and its persistence backends.
//!
//! [`TokenStore`] is the single source of truth for the current access token during a process
//! lifetime. Every write is mirrored into a [`TokenPersistence`] backend so the token survives a
//! restart; the backend is read at most once, on the first lookup after construction. Persistence
//! is best-effort: backend failures are logged and counted, never surfaced to callers.

pub mod file;
pub mod memory;

pub use file::FilePersistence;
pub use memory::MemoryPersistence;

// self
use crate::{_prelude::*, auth::AccessToken, obs};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "accessToken";

/// Key/value backend that mirrors the access token outside process memory.
pub trait TokenPersistence
where
	Self: Send + Sync,
{
	/// Loads the value stored under `key`, if any.
	fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Stores `value` under `key`, replacing any previous value.
	fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

	/// Removes `key`. Removing a missing key succeeds.
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Error type produced by [`TokenPersistence`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[derive(Clone, Debug)]
enum TokenSlot {
	Unhydrated,
	Empty,
	Present(AccessToken),
}

/// Holds the current access token in memory and mirrors it into a persistence backend.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self`. Writers are last-write-wins.
pub struct TokenStore {
	key: String,
	slot: RwLock<TokenSlot>,
	backend: Arc<dyn TokenPersistence>,
}
impl TokenStore {
	/// Creates a store over `backend` using `key` as the persisted entry name.
	pub fn new(key: impl Into<String>, backend: Arc<dyn TokenPersistence>) -> Self {
		Self { key: key.into(), slot: RwLock::new(TokenSlot::Unhydrated), backend }
	}

	/// Creates a store with no persistence beyond the process.
	pub fn in_memory() -> Self {
		Self::new(DEFAULT_STORAGE_KEY, Arc::new(MemoryPersistence::default()))
	}

	/// Returns the persisted entry name.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Overwrites the in-memory token and persists it.
	pub fn set_token(&self, token: AccessToken) {
		let persisted = self.backend.save(&self.key, token.expose());

		*self.slot.write() = TokenSlot::Present(token);

		if let Err(e) = persisted {
			obs::record_store_failure("save", &e);
		}
	}

	/// Returns the current token, hydrating from the backend on first use.
	pub fn get_token(&self) -> Option<AccessToken> {
		match &*self.slot.read() {
			TokenSlot::Present(token) => return Some(token.clone()),
			TokenSlot::Empty => return None,
			TokenSlot::Unhydrated => {},
		}

		let mut slot = self.slot.write();

		// Another reader may have hydrated while the write lock was pending.
		if let TokenSlot::Unhydrated = *slot {
			*slot = match self.backend.load(&self.key) {
				Ok(Some(value)) => match AccessToken::new(value) {
					Ok(token) => TokenSlot::Present(token),
					Err(_) => TokenSlot::Empty,
				},
				Ok(None) => TokenSlot::Empty,
				Err(e) => {
					obs::record_store_failure("load", &e);

					TokenSlot::Empty
				},
			};
		}

		match &*slot {
			TokenSlot::Present(token) => Some(token.clone()),
			_ => None,
		}
	}

	/// Drops the in-memory token and erases the persisted copy. Idempotent.
	pub fn clear_token(&self) {
		*self.slot.write() = TokenSlot::Empty;

		if let Err(e) = self.backend.remove(&self.key) {
			obs::record_store_failure("remove", &e);
		}
	}

	/// Returns `true` when a token is currently available.
	pub fn has_token(&self) -> bool {
		self.get_token().is_some()
	}
}
impl Default for TokenStore {
	fn default() -> Self {
		Self::in_memory()
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = match &*self.slot.read() {
			TokenSlot::Unhydrated => "unhydrated",
			TokenSlot::Empty => "empty",
			TokenSlot::Present(_) => "present",
		};

		f.debug_struct("TokenStore").field("key", &self.key).field("state", &state).finish()
	}
}
