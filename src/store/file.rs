//! File-backed [`TokenPersistence`] for desktop tools and long-running bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StoreError, TokenPersistence},
};

/// Persists entries to a JSON object file after each mutation.
///
/// Writes go to a sibling `.tmp` file that is synced and then renamed over the target, so a crash
/// never leaves a truncated snapshot behind.
#[derive(Clone, Debug)]
pub struct FilePersistence {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, String>>>,
}
impl FilePersistence {
	/// Opens (or creates) a snapshot at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the snapshot location.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, String>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, String>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenPersistence for FilePersistence {
	fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.inner.read().get(key).cloned())
	}

	fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		guard.insert(key.to_owned(), value.to_owned());

		self.persist_locked(&guard)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		if guard.remove(key).is_none() {
			return Ok(());
		}

		self.persist_locked(&guard)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		env, process,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;
	use crate::{auth::AccessToken, store::TokenStore};

	static COUNTER: AtomicUsize = AtomicUsize::new(0);

	fn temp_path() -> PathBuf {
		let unique = format!(
			"digilib_client_file_store_{}_{}.json",
			process::id(),
			COUNTER.fetch_add(1, Ordering::SeqCst),
		);

		env::temp_dir().join(unique)
	}

	fn cleanup(path: &Path) {
		fs::remove_file(path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary token snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn token_survives_reopen() {
		let path = temp_path();
		let backend = FilePersistence::open(&path).expect("Failed to open token snapshot.");
		let store = TokenStore::new("accessToken", Arc::new(backend));

		store.set_token(AccessToken::new("T1").expect("Token fixture should be valid."));
		drop(store);

		let reopened = FilePersistence::open(&path).expect("Failed to reopen token snapshot.");
		let store = TokenStore::new("accessToken", Arc::new(reopened));

		assert_eq!(store.get_token().map(|t| t.expose().to_owned()), Some("T1".into()));

		cleanup(&path);
	}

	#[test]
	fn remove_persists_the_deletion() {
		let path = temp_path();
		let backend = FilePersistence::open(&path).expect("Failed to open token snapshot.");

		backend.save("accessToken", "T1").expect("Save should succeed.");
		backend.remove("accessToken").expect("Remove should succeed.");
		backend.remove("accessToken").expect("Removing twice should succeed.");

		let reopened = FilePersistence::open(&path).expect("Failed to reopen token snapshot.");

		assert_eq!(reopened.load("accessToken").expect("Load should succeed."), None);

		cleanup(&path);
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path();

		fs::write(&path, b"not json").expect("Failed to seed corrupt snapshot.");

		let err = FilePersistence::open(&path).expect_err("Corrupt snapshots should not open.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		cleanup(&path);
	}
}
