//! Session/token/scope tables shared by the in-process stores.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenId, AccessTokenRecord, ScopeId, SessionId, SessionKey, SessionRecord,
		TokenSecret,
	},
	store::StoreError,
};

/// Relational view of issued sessions kept behind a single lock by the owning store.
#[derive(Clone, Debug, Default)]
pub(crate) struct SessionTable {
	last_session: u64,
	last_token: u64,
	sessions: BTreeMap<SessionId, SessionRecord>,
	tokens: BTreeMap<AccessTokenId, AccessTokenRecord>,
	scopes: BTreeMap<AccessTokenId, Vec<ScopeId>>,
}
impl SessionTable {
	/// Drops every session stored for `key` and cascades to tokens and scopes.
	pub(crate) fn delete(&mut self, key: &SessionKey) -> usize {
		let doomed = self
			.sessions
			.values()
			.filter(|session| &session.key == key)
			.map(|session| session.id)
			.collect::<BTreeSet<_>>();

		if doomed.is_empty() {
			return 0;
		}

		self.sessions.retain(|id, _| !doomed.contains(id));

		let orphaned = self
			.tokens
			.values()
			.filter(|token| doomed.contains(&token.session_id))
			.map(|token| token.id)
			.collect::<Vec<_>>();

		for token in orphaned {
			self.tokens.remove(&token);
			self.scopes.remove(&token);
		}

		doomed.len()
	}

	pub(crate) fn create(&mut self, key: &SessionKey, now: OffsetDateTime) -> SessionId {
		self.last_session += 1;

		let id = SessionId::new(self.last_session);

		self.sessions.insert(id, SessionRecord { id, key: key.clone(), created_at: now });

		id
	}

	/// Delete-then-create performed while the caller holds the table exclusively.
	pub(crate) fn replace(&mut self, key: &SessionKey, now: OffsetDateTime) -> SessionId {
		self.delete(key);
		self.create(key, now)
	}

	pub(crate) fn associate_token(
		&mut self,
		session_id: SessionId,
		access_token: &TokenSecret,
		expires: i64,
	) -> Result<AccessTokenId, StoreError> {
		if !self.sessions.contains_key(&session_id) {
			return Err(StoreError::Constraint {
				message: format!("session {session_id} does not exist"),
			});
		}

		self.last_token += 1;

		let id = AccessTokenId::new(self.last_token);

		self.tokens.insert(
			id,
			AccessTokenRecord { id, session_id, access_token: access_token.clone(), expires },
		);

		Ok(id)
	}

	pub(crate) fn associate_scope(
		&mut self,
		access_token_id: AccessTokenId,
		scope: &ScopeId,
	) -> Result<(), StoreError> {
		if !self.tokens.contains_key(&access_token_id) {
			return Err(StoreError::Constraint {
				message: format!("access token {access_token_id} does not exist"),
			});
		}

		let associated = self.scopes.entry(access_token_id).or_default();

		if !associated.contains(scope) {
			associated.push(scope.clone());
		}

		Ok(())
	}

	pub(crate) fn fetch_token(&self, access_token: &str) -> Option<AccessTokenRecord> {
		self.tokens.values().find(|token| token.access_token.expose() == access_token).cloned()
	}

	pub(crate) fn sessions_for(&self, key: &SessionKey) -> Vec<SessionRecord> {
		self.sessions.values().filter(|session| &session.key == key).cloned().collect()
	}

	pub(crate) fn session_count(&self) -> usize {
		self.sessions.len()
	}

	pub(crate) fn scopes_for(&self, access_token_id: AccessTokenId) -> Vec<ScopeId> {
		self.scopes.get(&access_token_id).cloned().unwrap_or_default()
	}

	pub(crate) fn snapshot(&self) -> TableSnapshot {
		TableSnapshot {
			last_session: self.last_session,
			last_token: self.last_token,
			sessions: self.sessions.values().cloned().collect(),
			tokens: self.tokens.values().cloned().collect(),
			scopes: self.scopes.iter().map(|(id, scopes)| (*id, scopes.clone())).collect(),
		}
	}
}
impl From<TableSnapshot> for SessionTable {
	fn from(snapshot: TableSnapshot) -> Self {
		Self {
			last_session: snapshot.last_session,
			last_token: snapshot.last_token,
			sessions: snapshot.sessions.into_iter().map(|session| (session.id, session)).collect(),
			tokens: snapshot.tokens.into_iter().map(|token| (token.id, token)).collect(),
			scopes: snapshot.scopes.into_iter().collect(),
		}
	}
}

/// Serializable form of [`SessionTable`] with list-shaped collections.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct TableSnapshot {
	last_session: u64,
	last_token: u64,
	sessions: Vec<SessionRecord>,
	tokens: Vec<AccessTokenRecord>,
	scopes: Vec<(AccessTokenId, Vec<ScopeId>)>,
}
