//! Scope descriptors and the de-duplicated scope lists carried by grant requests.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, Serializer};
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ScopeId},
};

/// Errors emitted when validating requested scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// Scope exceeds the identifier length limit.
	#[error("Scope exceeds {max} characters: {scope}.")]
	TooLong {
		/// The offending scope string.
		scope: String,
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Catalog entry for a scope the caller already validated against the client's allowed set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDescriptor {
	/// Catalog identifier the access token is associated with.
	pub id: ScopeId,
	/// Optional human-readable description from the catalog.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl ScopeDescriptor {
	/// Creates a descriptor without a description.
	pub fn new(id: ScopeId) -> Self {
		Self { id, description: None }
	}

	/// Attaches a catalog description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}
}
impl From<ScopeId> for ScopeDescriptor {
	fn from(id: ScopeId) -> Self {
		Self::new(id)
	}
}

/// Ordered scope list with duplicate identifiers removed.
///
/// The first occurrence of each identifier wins, so the association order written to the store
/// is deterministic and mirrors the order the caller requested.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestedScopes {
	scopes: Vec<ScopeDescriptor>,
}
impl RequestedScopes {
	/// Builds a de-duplicated list from descriptors.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<ScopeDescriptor>,
	{
		let mut seen = BTreeSet::new();
		let mut kept = Vec::new();

		for scope in scopes {
			let descriptor: ScopeDescriptor = scope.into();

			if seen.insert(descriptor.id.clone()) {
				kept.push(descriptor);
			}
		}

		Self { scopes: kept }
	}

	/// Validates raw scope strings and builds a de-duplicated list.
	pub fn parse<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let ids = scopes
			.into_iter()
			.map(|raw| parse_id(raw.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self::new(ids))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes were requested.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the list contains the provided scope identifier.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|descriptor| descriptor.id.as_ref() == scope)
	}

	/// Iterator over scope identifiers in request order.
	pub fn ids(&self) -> impl Iterator<Item = &ScopeId> {
		self.scopes.iter().map(|descriptor| &descriptor.id)
	}

	/// Returns the space-delimited representation used on the wire.
	pub fn normalized(&self) -> String {
		self.ids().map(|id| id.as_ref()).collect::<Vec<_>>().join(" ")
	}

	/// Returns the underlying descriptors.
	pub fn as_slice(&self) -> &[ScopeDescriptor] {
		&self.scopes
	}
}
impl Debug for RequestedScopes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("RequestedScopes").field(&self.ids().collect::<Vec<_>>()).finish()
	}
}
impl Display for RequestedScopes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl<'a> IntoIterator for &'a RequestedScopes {
	type IntoIter = Iter<'a, ScopeDescriptor>;
	type Item = &'a ScopeDescriptor;

	fn into_iter(self) -> Self::IntoIter {
		self.scopes.iter()
	}
}
impl FromIterator<ScopeDescriptor> for RequestedScopes {
	fn from_iter<T: IntoIterator<Item = ScopeDescriptor>>(iter: T) -> Self {
		Self::new(iter)
	}
}
impl FromStr for RequestedScopes {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::parse(s.split_whitespace())
	}
}
impl Serialize for RequestedScopes {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.scopes.serialize(serializer)
	}
}
impl<'de> Deserialize<'de> for RequestedScopes {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<ScopeDescriptor>>::deserialize(deserializer)?;

		Ok(Self::new(values))
	}
}

fn parse_id(raw: &str) -> Result<ScopeId, ScopeValidationError> {
	ScopeId::new(raw).map_err(|e| match e {
		IdentifierError::Empty { .. } => ScopeValidationError::Empty,
		IdentifierError::ContainsWhitespace { .. } =>
			ScopeValidationError::ContainsWhitespace { scope: raw.to_owned() },
		IdentifierError::TooLong { max, .. } =>
			ScopeValidationError::TooLong { scope: raw.to_owned(), max },
	})
}
