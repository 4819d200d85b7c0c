//! Per-key serialization for stores that cannot replace sessions atomically.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenId, AccessTokenRecord, ScopeId, SessionId, SessionKey, SessionRecord,
		TokenSecret,
	},
	store::{SessionStore, StoreFuture},
};

type GuardMap = Arc<Mutex<HashMap<SessionKey, Arc<AsyncMutex<()>>>>>;

/// Wraps a [`SessionStore`] and serializes [`replace_session`](SessionStore::replace_session)
/// per [`SessionKey`].
///
/// The inner store's delete and create run back to back while the key's guard is held, so two
/// grant completions for the same client/owner pair cannot both observe an empty slot. Guards
/// only coordinate callers sharing this wrapper (one process); multi-node deployments need the
/// backend's own locking. A key's guard is dropped once no caller holds it.
#[derive(Debug, Default)]
pub struct KeyedStore<S> {
	inner: S,
	guards: GuardMap,
}
impl<S> KeyedStore<S>
where
	S: SessionStore,
{
	/// Wraps `inner`.
	pub fn new(inner: S) -> Self {
		Self { inner, guards: Default::default() }
	}

	/// Borrows the wrapped store.
	pub fn inner(&self) -> &S {
		&self.inner
	}

	/// Returns (and creates on demand) the guard slot for a session key.
	fn guard(&self, key: &SessionKey) -> GuardSlot {
		let mut guards = self.guards.lock();
		let lock =
			guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone();

		GuardSlot { guards: self.guards.clone(), key: key.clone(), lock }
	}

	#[cfg(test)]
	fn guard_count(&self) -> usize {
		self.guards.lock().len()
	}
}

/// Handle on one key's guard; the map entry goes away with the last handle.
struct GuardSlot {
	guards: GuardMap,
	key: SessionKey,
	lock: Arc<AsyncMutex<()>>,
}
impl Drop for GuardSlot {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// One reference is held by the map and one by this slot.
		if Arc::strong_count(&self.lock) == 2 {
			guards.remove(&self.key);
		}
	}
}
impl<S> SessionStore for KeyedStore<S>
where
	S: SessionStore,
{
	fn delete_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let slot = self.guard(key);
			let _serialized = slot.lock.lock().await;

			self.inner.delete_session(key).await
		})
	}

	fn create_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		Box::pin(async move {
			let slot = self.guard(key);
			let _serialized = slot.lock.lock().await;

			self.inner.create_session(key).await
		})
	}

	fn replace_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		Box::pin(async move {
			let slot = self.guard(key);
			let _serialized = slot.lock.lock().await;

			self.inner.delete_session(key).await?;
			self.inner.create_session(key).await
		})
	}

	fn associate_access_token<'a>(
		&'a self,
		session_id: SessionId,
		access_token: &'a TokenSecret,
		expires: i64,
	) -> StoreFuture<'a, AccessTokenId> {
		self.inner.associate_access_token(session_id, access_token, expires)
	}

	fn associate_scope<'a>(
		&'a self,
		access_token_id: AccessTokenId,
		scope: &'a ScopeId,
	) -> StoreFuture<'a, ()> {
		self.inner.associate_scope(access_token_id, scope)
	}

	fn fetch_access_token<'a>(
		&'a self,
		access_token: &'a str,
	) -> StoreFuture<'a, Option<AccessTokenRecord>> {
		self.inner.fetch_access_token(access_token)
	}

	fn fetch_sessions<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Vec<SessionRecord>> {
		self.inner.fetch_sessions(key)
	}

	fn access_token_scopes(&self, access_token_id: AccessTokenId) -> StoreFuture<'_, Vec<ScopeId>> {
		self.inner.access_token_scopes(access_token_id)
	}
}
