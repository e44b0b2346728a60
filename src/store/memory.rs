//! Thread-safe in-memory [`TokenPersistence`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	store::{StoreError, TokenPersistence},
};

type EntryMap = Arc<RwLock<HashMap<String, String>>>;

/// Keeps entries in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence(EntryMap);
impl TokenPersistence for MemoryPersistence {
	fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.0.write().remove(key);

		Ok(())
	}
}
