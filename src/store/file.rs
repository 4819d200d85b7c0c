//! Simple file-backed [`SessionStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenId, AccessTokenRecord, ScopeId, SessionId, SessionKey, SessionRecord,
		TokenSecret,
	},
	store::{
		SessionStore, StoreError, StoreFuture,
		table::{SessionTable, TableSnapshot},
	},
};

/// Persists the session table to a JSON file after each mutation.
///
/// Mutations apply to the in-memory table and are written out while the write lock is still
/// held, so the file never reflects a half-applied replacement.
///
/// Every mutation clones the whole table and rewrites and syncs the whole file, blocking the
/// executor thread while the lock is held. An implicit grant with `k` scopes costs `k + 2` full
/// rewrites. Use it for small single-node deployments only.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<SessionTable>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let table = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(table)) })
	}

	/// Location of the backing JSON file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<SessionTable, StoreError> {
		if !path.exists() {
			return Ok(SessionTable::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(SessionTable::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let snapshot: TableSnapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(snapshot.into())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &SessionTable) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(&contents.snapshot()).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
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

	/// Applies `mutate` to a scratch copy and only commits it once the file write succeeds.
	fn mutate_now<T>(
		&self,
		mutate: impl FnOnce(&mut SessionTable) -> Result<T, StoreError>,
	) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let mut scratch = guard.clone();
		let value = mutate(&mut scratch)?;

		self.persist_locked(&scratch)?;

		*guard = scratch;

		Ok(value)
	}
}
impl SessionStore for FileStore {
	fn delete_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.mutate_now(|table| {
				table.delete(key);

				Ok(())
			})
		})
	}

	fn create_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		Box::pin(async move {
			self.mutate_now(|table| Ok(table.create(key, OffsetDateTime::now_utc())))
		})
	}

	fn replace_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		Box::pin(async move {
			self.mutate_now(|table| Ok(table.replace(key, OffsetDateTime::now_utc())))
		})
	}

	fn associate_access_token<'a>(
		&'a self,
		session_id: SessionId,
		access_token: &'a TokenSecret,
		expires: i64,
	) -> StoreFuture<'a, AccessTokenId> {
		Box::pin(async move {
			self.mutate_now(|table| table.associate_token(session_id, access_token, expires))
		})
	}

	fn associate_scope<'a>(
		&'a self,
		access_token_id: AccessTokenId,
		scope: &'a ScopeId,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.mutate_now(|table| table.associate_scope(access_token_id, scope)) })
	}

	fn fetch_access_token<'a>(
		&'a self,
		access_token: &'a str,
	) -> StoreFuture<'a, Option<AccessTokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().fetch_token(access_token)) })
	}

	fn fetch_sessions<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Vec<SessionRecord>> {
		Box::pin(async move { Ok(self.inner.read().sessions_for(key)) })
	}

	fn access_token_scopes(&self, access_token_id: AccessTokenId) -> StoreFuture<'_, Vec<ScopeId>> {
		Box::pin(async move { Ok(self.inner.read().scopes_for(access_token_id)) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		env,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;
	use crate::auth::{ClientId, OwnerId};

	fn scratch_path(label: &str) -> PathBuf {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);

		let unique = COUNTER.fetch_add(1, Ordering::Relaxed);

		env::temp_dir()
			.join(format!("oauth2-issuer-{}-{label}-{unique}", std::process::id()))
			.join("sessions.json")
	}

	fn key() -> SessionKey {
		SessionKey::user(
			ClientId::new("abc123").expect("Client fixture should be valid."),
			OwnerId::new("42").expect("Owner fixture should be valid."),
		)
	}

	#[tokio::test]
	async fn reopening_restores_sessions_and_tokens() {
		let path = scratch_path("reopen");
		let store = FileStore::open(&path).expect("File store should open in a temp directory.");
		let session = store.replace_session(&key()).await.expect("Session should be created.");
		let secret = TokenSecret::new("file-token");
		let token = store
			.associate_access_token(session, &secret, 4_102_444_800)
			.await
			.expect("Token should be stored.");
		let scope = ScopeId::new("email").expect("Scope fixture should be valid.");

		store.associate_scope(token, &scope).await.expect("Scope should be stored.");

		let reopened = FileStore::open(&path).expect("File store should reopen.");
		let record = reopened
			.fetch_access_token("file-token")
			.await
			.expect("Lookup should succeed.")
			.expect("Token should survive a reopen.");

		assert_eq!(record.session_id, session);
		assert_eq!(
			reopened.access_token_scopes(token).await.expect("Lookup should succeed."),
			vec![scope]
		);

		let _ = fs::remove_dir_all(path.parent().expect("Scratch path should have a parent."));
	}

	#[tokio::test]
	async fn failed_write_leaves_table_untouched() {
		let path = scratch_path("constraint");
		let store = FileStore::open(&path).expect("File store should open in a temp directory.");
		let err = store
			.associate_access_token(SessionId::new(99), &TokenSecret::new("t"), 0)
			.await
			.expect_err("Tokens must not attach to missing sessions.");

		assert!(matches!(err, StoreError::Constraint { .. }));
		assert!(store.fetch_access_token("t").await.expect("Lookup should succeed.").is_none());
		assert!(!path.exists(), "Nothing should be written for a rejected mutation.");

		let _ = fs::remove_dir_all(path.parent().expect("Scratch path should have a parent."));
	}
}
