//! User-supplied naming overrides.
//!
//! Overrides map wire names to canonical names at two scopes: globally for
//! every property with a given wire name, and per structured type. The
//! type-scoped mapping always wins over the global one.
//!
//! ```
//! use edm_digest::semantic::NamingOverrides;
//!
//! let overrides = NamingOverrides::from_json_str(r#"{
//!     "properties": { "ID": "id" },
//!     "entities": { "Product": { "properties": { "ID": "productId" } } }
//! }"#).unwrap();
//!
//! assert_eq!(overrides.property("NS.Product", "Product", "ID"), Some("productId"));
//! assert_eq!(overrides.property("NS.Order", "Order", "ID"), Some("id"));
//! ```

use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Naming overrides, threaded explicitly through assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamingOverrides {
    /// Global property overrides: wire name to canonical name.
    #[serde(default)]
    pub properties: BTreeMap<SmolStr, SmolStr>,

    /// Type-scoped overrides keyed by qualified or local type name.
    #[serde(default)]
    pub entities: BTreeMap<SmolStr, EntityOverrides>,
}

/// Overrides scoped to one entity or complex type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityOverrides {
    /// Canonical name for the type itself.
    #[serde(default)]
    pub name: Option<SmolStr>,

    /// Property overrides: wire name to canonical name.
    #[serde(default)]
    pub properties: BTreeMap<SmolStr, SmolStr>,
}

impl NamingOverrides {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses overrides from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a global property override.
    pub fn with_property(
        mut self,
        wire_name: impl Into<SmolStr>,
        canonical_name: impl Into<SmolStr>,
    ) -> Self {
        self.properties
            .insert(wire_name.into(), canonical_name.into());
        self
    }

    /// Adds a property override scoped to one type.
    pub fn with_entity_property(
        mut self,
        type_name: impl Into<SmolStr>,
        wire_name: impl Into<SmolStr>,
        canonical_name: impl Into<SmolStr>,
    ) -> Self {
        self.entities
            .entry(type_name.into())
            .or_default()
            .properties
            .insert(wire_name.into(), canonical_name.into());
        self
    }

    /// Renames a type.
    pub fn with_entity_name(
        mut self,
        type_name: impl Into<SmolStr>,
        canonical_name: impl Into<SmolStr>,
    ) -> Self {
        self.entities.entry(type_name.into()).or_default().name = Some(canonical_name.into());
        self
    }

    /// Returns the type-scoped overrides for a type: the qualified entry
    /// first, then the local one. Both may be present.
    pub fn scoped(
        &self,
        qualified_name: &str,
        local_name: &str,
    ) -> impl Iterator<Item = &EntityOverrides> {
        self.entities
            .get(qualified_name)
            .into_iter()
            .chain(self.entities.get(local_name))
    }

    /// Resolves a property override: qualified type entry, then local type
    /// entry, then global scope.
    pub fn property(
        &self,
        qualified_name: &str,
        local_name: &str,
        wire_name: &str,
    ) -> Option<&str> {
        self.scoped(qualified_name, local_name)
            .find_map(|scoped| scoped.properties.get(wire_name))
            .or_else(|| self.properties.get(wire_name))
            .map(SmolStr::as_str)
    }

    /// Resolves a type name override, qualified entry first.
    pub fn type_name(&self, qualified_name: &str, local_name: &str) -> Option<&str> {
        self.scoped(qualified_name, local_name)
            .find_map(|scoped| scoped.name.as_deref())
    }

    /// Returns true if no overrides are configured.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.entities.is_empty()
    }
}
