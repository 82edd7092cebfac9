//! Resolved representation of a metadata tree.
//!
//! The [`DataModel`] is the single artifact handed to code emitters:
//! - Entity, complex and enum descriptors in dense arrays, indexed by [`TypeId`]
//! - Name-indexed lookup for types and endpoints
//! - Inheritance closures and navigation edges stored as index lists
//!
//! A model is built once by [`crate::semantic::ModelAssembler`] and never
//! mutated afterwards, so it can be shared freely between threads.

pub mod descriptors;
pub mod symbol_table;
pub mod types;

use crate::diag::Diag;
use crate::metadata::Dialect;
use crate::semantic::diag::DigestError;
use smol_str::SmolStr;
use std::collections::BTreeMap;

pub use descriptors::{
    ComplexTypeDescriptor, EntitySetModel, EntityTypeDescriptor, EnumMemberDescriptor,
    EnumTypeDescriptor, NavigationPropertyDescriptor, OperationBinding, OperationDescriptor,
    ParameterDescriptor, PropertyDescriptor, SingletonModel,
};
pub use symbol_table::SymbolTable;
pub use types::{PRIMITIVE_TYPES, PrimitiveType, SemanticType, TypeId, TypeKind};

/// Everything a [`DataModel`] is assembled from.
#[derive(Debug, Clone)]
pub(crate) struct ModelParts {
    pub dialect: Dialect,
    pub entity_types: Vec<EntityTypeDescriptor>,
    pub complex_types: Vec<ComplexTypeDescriptor>,
    pub enum_types: Vec<EnumTypeDescriptor>,
    pub entity_sets: Vec<EntitySetModel>,
    pub singletons: Vec<SingletonModel>,
    pub operations: Vec<OperationDescriptor>,
}

/// The canonical, validated model of a data service.
#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    dialect: Dialect,
    entity_types: Vec<EntityTypeDescriptor>,
    complex_types: Vec<ComplexTypeDescriptor>,
    enum_types: Vec<EnumTypeDescriptor>,
    entity_sets: Vec<EntitySetModel>,
    singletons: Vec<SingletonModel>,
    operations: Vec<OperationDescriptor>,

    entity_index: BTreeMap<SmolStr, TypeId>,
    complex_index: BTreeMap<SmolStr, TypeId>,
    enum_index: BTreeMap<SmolStr, TypeId>,
    entity_set_index: BTreeMap<SmolStr, usize>,
    singleton_index: BTreeMap<SmolStr, usize>,
    /// Overloads share a wire name; indexes are in declaration order.
    operation_index: BTreeMap<SmolStr, Vec<usize>>,
}

impl DataModel {
    pub(crate) fn new(parts: ModelParts) -> Self {
        let entity_index = parts
            .entity_types
            .iter()
            .map(|entity| (entity.qualified_name.clone(), entity.id))
            .collect();
        let complex_index = parts
            .complex_types
            .iter()
            .map(|complex| (complex.qualified_name.clone(), complex.id))
            .collect();
        let enum_index = parts
            .enum_types
            .iter()
            .map(|enumeration| (enumeration.qualified_name.clone(), enumeration.id))
            .collect();

        let mut entity_set_index = BTreeMap::new();
        for (index, set) in parts.entity_sets.iter().enumerate() {
            entity_set_index.entry(set.name.clone()).or_insert(index);
        }
        let mut singleton_index = BTreeMap::new();
        for (index, singleton) in parts.singletons.iter().enumerate() {
            singleton_index
                .entry(singleton.name.clone())
                .or_insert(index);
        }
        let mut operation_index: BTreeMap<SmolStr, Vec<usize>> = BTreeMap::new();
        for (index, operation) in parts.operations.iter().enumerate() {
            operation_index
                .entry(operation.name.clone())
                .or_default()
                .push(index);
        }

        Self {
            dialect: parts.dialect,
            entity_types: parts.entity_types,
            complex_types: parts.complex_types,
            enum_types: parts.enum_types,
            entity_sets: parts.entity_sets,
            singletons: parts.singletons,
            operations: parts.operations,
            entity_index,
            complex_index,
            enum_index,
            entity_set_index,
            singleton_index,
            operation_index,
        }
    }

    /// Returns the dialect the model was digested from.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn entity_types(&self) -> &[EntityTypeDescriptor] {
        &self.entity_types
    }

    pub fn complex_types(&self) -> &[ComplexTypeDescriptor] {
        &self.complex_types
    }

    pub fn enum_types(&self) -> &[EnumTypeDescriptor] {
        &self.enum_types
    }

    pub fn entity_sets(&self) -> &[EntitySetModel] {
        &self.entity_sets
    }

    pub fn singletons(&self) -> &[SingletonModel] {
        &self.singletons
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Looks up an entity type by qualified name.
    pub fn entity_type(&self, qualified_name: &str) -> Option<&EntityTypeDescriptor> {
        self.entity_index
            .get(qualified_name)
            .map(|id| self.entity(*id))
    }

    /// Looks up a complex type by qualified name.
    pub fn complex_type(&self, qualified_name: &str) -> Option<&ComplexTypeDescriptor> {
        self.complex_index
            .get(qualified_name)
            .map(|id| self.complex(*id))
    }

    /// Looks up an enum type by qualified name.
    pub fn enum_type(&self, qualified_name: &str) -> Option<&EnumTypeDescriptor> {
        self.enum_index
            .get(qualified_name)
            .map(|id| self.enumeration(*id))
    }

    /// Looks up an entity set by wire name.
    pub fn entity_set(&self, name: &str) -> Option<&EntitySetModel> {
        self.entity_set_index
            .get(name)
            .map(|index| &self.entity_sets[*index])
    }

    /// Looks up a singleton by wire name.
    pub fn singleton(&self, name: &str) -> Option<&SingletonModel> {
        self.singleton_index
            .get(name)
            .map(|index| &self.singletons[*index])
    }

    /// Looks up the first operation with the given wire name.
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations_named(name).next()
    }

    /// Iterates every overload with the given wire name, in declaration order.
    pub fn operations_named(&self, name: &str) -> impl Iterator<Item = &OperationDescriptor> {
        self.operation_index
            .get(name)
            .into_iter()
            .flatten()
            .map(|index| &self.operations[*index])
    }

    /// Returns the entity type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID does not belong to this model.
    pub fn entity(&self, id: TypeId) -> &EntityTypeDescriptor {
        &self.entity_types[id.as_usize()]
    }

    /// Returns the complex type with the given ID.
    pub fn complex(&self, id: TypeId) -> &ComplexTypeDescriptor {
        &self.complex_types[id.as_usize()]
    }

    /// Returns the enum type with the given ID.
    pub fn enumeration(&self, id: TypeId) -> &EnumTypeDescriptor {
        &self.enum_types[id.as_usize()]
    }

    /// Iterates an entity type's ancestors, nearest first.
    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.entity(id)
            .ancestors
            .iter()
            .map(move |ancestor| self.entity(*ancestor))
    }

    /// Iterates an entity type's transitive descendants.
    pub fn descendants(&self, id: TypeId) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.entity(id)
            .descendants
            .iter()
            .map(move |descendant| self.entity(*descendant))
    }

    /// Returns all properties of an entity type, root-most ancestor first.
    pub fn all_properties(&self, id: TypeId) -> Vec<&PropertyDescriptor> {
        let entity = self.entity(id);
        entity
            .ancestors
            .iter()
            .rev()
            .map(|ancestor| self.entity(*ancestor))
            .chain(std::iter::once(entity))
            .flat_map(|owner| owner.properties.iter())
            .collect()
    }

    /// Returns all navigation properties of an entity type, root-most ancestor first.
    pub fn all_navigation_properties(&self, id: TypeId) -> Vec<&NavigationPropertyDescriptor> {
        let entity = self.entity(id);
        entity
            .ancestors
            .iter()
            .rev()
            .map(|ancestor| self.entity(*ancestor))
            .chain(std::iter::once(entity))
            .flat_map(|owner| owner.navigation_properties.iter())
            .collect()
    }

    /// Returns all properties of a complex type, root-most ancestor first.
    pub fn all_complex_properties(&self, id: TypeId) -> Vec<&PropertyDescriptor> {
        let complex = self.complex(id);
        complex
            .ancestors
            .iter()
            .rev()
            .map(|ancestor| self.complex(*ancestor))
            .chain(std::iter::once(complex))
            .flat_map(|owner| owner.properties.iter())
            .collect()
    }

    /// Returns the key properties of an entity type in key order.
    pub fn key_properties(&self, id: TypeId) -> Vec<&PropertyDescriptor> {
        let properties = self.all_properties(id);
        self.entity(id)
            .keys
            .iter()
            .filter_map(|key| {
                properties
                    .iter()
                    .find(|property| property.name == *key)
                    .copied()
            })
            .collect()
    }

    /// Returns the cast targets available at a navigation property,
    /// searching the entity type and its ancestors.
    pub fn casts_for(&self, id: TypeId, navigation: &str) -> Option<&[TypeId]> {
        self.all_navigation_properties(id)
            .into_iter()
            .rev()
            .find(|nav| nav.name == navigation)
            .map(|nav| nav.casts.as_slice())
    }

    /// Iterates operations bound directly to an entity type.
    pub fn bound_operations(&self, id: TypeId) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations
            .iter()
            .filter(move |operation| operation.binding.entity_type() == Some(id))
    }
}

/// Result type for [`crate::semantic::ModelAssembler::assemble`].
pub type DigestResult = Result<DataModel, Vec<DigestError>>;

/// Outcome of digestion, always carrying diagnostics.
///
/// Warnings (such as unused naming overrides) are reported even when the
/// model is produced.
#[derive(Debug, Clone)]
pub struct DigestOutcome {
    /// The model, if no phase failed.
    pub model: Option<DataModel>,

    /// Errors of the failed phase.
    pub errors: Vec<DigestError>,

    /// All diagnostics: lowered errors followed by warnings.
    pub diagnostics: Vec<Diag>,
}

impl DigestOutcome {
    /// Creates a successful outcome with optional warnings.
    pub fn success(model: DataModel, diagnostics: Vec<Diag>) -> Self {
        Self {
            model: Some(model),
            errors: Vec::new(),
            diagnostics,
        }
    }

    /// Creates a failed outcome.
    pub fn failure(errors: Vec<DigestError>, warnings: Vec<Diag>) -> Self {
        let mut diagnostics: Vec<Diag> = errors.iter().map(DigestError::to_diag).collect();
        diagnostics.extend(warnings);
        Self {
            model: None,
            errors,
            diagnostics,
        }
    }

    /// Returns true if a model was produced.
    pub fn is_success(&self) -> bool {
        self.model.is_some()
    }

    /// Returns true if no model was produced.
    pub fn is_failure(&self) -> bool {
        self.model.is_none()
    }

    /// Returns true if there are any diagnostics.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Drops the warnings and returns the plain result.
    pub fn into_result(self) -> DigestResult {
        match self.model {
            Some(model) => Ok(model),
            None => Err(self.errors),
        }
    }
}
