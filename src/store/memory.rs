//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenId, AccessTokenRecord, ScopeId, SessionId, SessionKey, SessionRecord,
		TokenSecret,
	},
	store::{SessionStore, StoreFuture, table::SessionTable},
};

type TableHandle = Arc<RwLock<SessionTable>>;

/// Thread-safe storage backend that keeps sessions in-process for tests and demos.
///
/// Session replacement happens under one write lock, so concurrent grant completions for the same
/// key always leave exactly one session behind.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(TableHandle);
impl MemoryStore {
	/// Total number of stored sessions across all keys.
	pub fn session_count(&self) -> usize {
		self.0.read().session_count()
	}
}
impl SessionStore for MemoryStore {
	fn delete_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()> {
		let table = self.0.clone();

		Box::pin(async move {
			table.write().delete(key);

			Ok(())
		})
	}

	fn create_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		let table = self.0.clone();

		Box::pin(async move { Ok(table.write().create(key, OffsetDateTime::now_utc())) })
	}

	fn replace_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		let table = self.0.clone();

		Box::pin(async move { Ok(table.write().replace(key, OffsetDateTime::now_utc())) })
	}

	fn associate_access_token<'a>(
		&'a self,
		session_id: SessionId,
		access_token: &'a TokenSecret,
		expires: i64,
	) -> StoreFuture<'a, AccessTokenId> {
		let table = self.0.clone();

		Box::pin(async move { table.write().associate_token(session_id, access_token, expires) })
	}

	fn associate_scope<'a>(
		&'a self,
		access_token_id: AccessTokenId,
		scope: &'a ScopeId,
	) -> StoreFuture<'a, ()> {
		let table = self.0.clone();

		Box::pin(async move { table.write().associate_scope(access_token_id, scope) })
	}

	fn fetch_access_token<'a>(
		&'a self,
		access_token: &'a str,
	) -> StoreFuture<'a, Option<AccessTokenRecord>> {
		let table = self.0.clone();

		Box::pin(async move { Ok(table.read().fetch_token(access_token)) })
	}

	fn fetch_sessions<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Vec<SessionRecord>> {
		let table = self.0.clone();

		Box::pin(async move { Ok(table.read().sessions_for(key)) })
	}

	fn access_token_scopes(&self, access_token_id: AccessTokenId) -> StoreFuture<'_, Vec<ScopeId>> {
		let table = self.0.clone();

		Box::pin(async move { Ok(table.read().scopes_for(access_token_id)) })
	}
}
