//! Wire-level type name parsing.
//!
//! Metadata documents reference types as strings such as `Edm.String`,
//! `Trippin.Person`, `Self.Person` or `Collection(Trippin.Person)`. This module
//! splits those strings into their parts without consulting any declaration
//! tables; resolution against declarations happens in
//! [`crate::semantic::type_resolver`].

use smol_str::SmolStr;
use std::fmt;

/// Namespace reserved for primitive types.
pub const EDM_NAMESPACE: &str = "Edm";

const COLLECTION_PREFIX: &str = "Collection(";

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Namespace or alias part, if the name was qualified.
    pub namespace: Option<SmolStr>,
    /// Local (unqualified) type name.
    pub name: SmolStr,
    /// Whether the reference was wrapped in `Collection(...)`.
    pub is_collection: bool,
}

impl TypeName {
    /// Parses a raw type reference.
    ///
    /// Parsing never fails: malformed names simply do not resolve later on.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (inner, is_collection) = match trimmed
            .strip_prefix(COLLECTION_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (inner.trim(), true),
            None => (trimmed, false),
        };

        let (namespace, name) = split_qualified(inner);
        Self {
            namespace: namespace.map(SmolStr::from),
            name: SmolStr::from(name),
            is_collection,
        }
    }

    /// Returns true if this names a type in the `Edm` namespace.
    pub fn is_edm(&self) -> bool {
        self.namespace.as_deref() == Some(EDM_NAMESPACE)
    }

    /// Returns the qualified name without the collection wrapper.
    pub fn qualified(&self) -> SmolStr {
        match &self.namespace {
            Some(namespace) => SmolStr::from(format!("{namespace}.{}", self.name)),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collection {
            write!(f, "Collection({})", self.qualified())
        } else {
            write!(f, "{}", self.qualified())
        }
    }
}

/// Splits `Namespace.Name` at the last dot.
///
/// Namespaces may themselves contain dots (`Microsoft.OData.SampleService`).
pub fn split_qualified(raw: &str) -> (Option<&str>, &str) {
    match raw.rsplit_once('.') {
        Some((namespace, name)) if !namespace.is_empty() => (Some(namespace), name),
        _ => (None, raw),
    }
}

/// A V4 partner path, optionally prefixed with a type cast segment
/// (`Namespace.Derived/Navigation`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerPath {
    /// Qualified derived type named by the cast segment, if any.
    pub cast: Option<SmolStr>,
    /// Navigation property name.
    pub navigation: SmolStr,
}

impl PartnerPath {
    /// Parses a partner attribute value.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().rsplit_once('/') {
            Some((cast, navigation)) => Self {
                cast: Some(SmolStr::from(cast)),
                navigation: SmolStr::from(navigation),
            },
            None => Self {
                cast: None,
                navigation: SmolStr::from(raw.trim()),
            },
        }
    }
}
