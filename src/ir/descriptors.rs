//! Resolved descriptors making up a [`crate::ir::DataModel`].
//!
//! Descriptors reference each other through [`TypeId`]s rather than pointers,
//! so partner navigations and base/derived relations form no ownership cycles.

use crate::ir::types::{PrimitiveType, SemanticType, TypeId};
use smol_str::SmolStr;

/// A resolved entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeDescriptor {
    pub id: TypeId,
    /// `Namespace.Name`.
    pub qualified_name: SmolStr,
    pub namespace: SmolStr,
    /// Wire name.
    pub name: SmolStr,
    /// Override-aware, case-converted type name.
    pub canonical_name: SmolStr,
    pub base_type: Option<TypeId>,
    pub is_abstract: bool,
    pub is_open: bool,
    /// Effective key property wire names: own key, or the nearest ancestor's.
    pub keys: Vec<SmolStr>,
    /// Properties declared on this type (not inherited ones).
    pub properties: Vec<PropertyDescriptor>,
    /// Navigation properties declared on this type (not inherited ones).
    pub navigation_properties: Vec<NavigationPropertyDescriptor>,
    /// Ancestor chain, nearest first.
    pub ancestors: Vec<TypeId>,
    /// All transitive descendants, in declaration order.
    pub descendants: Vec<TypeId>,
}

impl EntityTypeDescriptor {
    /// Looks up a property declared on this type by wire name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.name == name)
    }

    /// Looks up a navigation property declared on this type by wire name.
    pub fn navigation(&self, name: &str) -> Option<&NavigationPropertyDescriptor> {
        self.navigation_properties
            .iter()
            .find(|navigation| navigation.name == name)
    }
}

/// A resolved complex type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTypeDescriptor {
    pub id: TypeId,
    pub qualified_name: SmolStr,
    pub namespace: SmolStr,
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    pub base_type: Option<TypeId>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub properties: Vec<PropertyDescriptor>,
    pub ancestors: Vec<TypeId>,
    pub descendants: Vec<TypeId>,
}

impl ComplexTypeDescriptor {
    /// Looks up a property declared on this type by wire name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.name == name)
    }
}

/// A resolved enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTypeDescriptor {
    pub id: TypeId,
    pub qualified_name: SmolStr,
    pub namespace: SmolStr,
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    pub underlying_type: PrimitiveType,
    pub is_flags: bool,
    /// Members in declaration order.
    pub members: Vec<EnumMemberDescriptor>,
}

/// A symbolic enum member with its underlying value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberDescriptor {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    pub value: i64,
}

/// A structural property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Wire name, used for protocol-level encoding.
    pub name: SmolStr,
    /// Name used by emitters.
    pub canonical_name: SmolStr,
    pub semantic_type: SemanticType,
    pub nullable: bool,
    pub is_key: bool,
}

/// A dialect-independent navigation edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyDescriptor {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    /// Target entity type.
    pub target: TypeId,
    /// True for "many" navigations.
    pub is_collection: bool,
    /// Whether a single-valued navigation may be absent.
    pub nullable: bool,
    /// Wire name of the back-reference navigation on the target, if any.
    pub partner: Option<SmolStr>,
    /// Derived type declaring the partner, when the partner is only
    /// reachable through a type cast.
    pub cast_target: Option<TypeId>,
    /// Concrete descendants of the target this navigation can be cast to.
    pub casts: Vec<TypeId>,
}

/// An entity set bound to its entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySetModel {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    /// Qualified name of the declaring container.
    pub container: SmolStr,
    pub entity_type: TypeId,
}

/// A singleton bound to its entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingletonModel {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    pub container: SmolStr,
    pub entity_type: TypeId,
}

/// How an operation is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationBinding {
    /// Free-standing, invoked on the service.
    Unbound,
    /// Bound to an entity type (or a collection of it).
    Bound {
        entity_type: TypeId,
        is_collection: bool,
    },
}

impl OperationBinding {
    /// Returns the binding entity type, if bound.
    pub fn entity_type(&self) -> Option<TypeId> {
        match self {
            OperationBinding::Unbound => None,
            OperationBinding::Bound { entity_type, .. } => Some(*entity_type),
        }
    }
}

/// A resolved function or action.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    /// Qualified name of the declaring container.
    pub container: SmolStr,
    pub binding: OperationBinding,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<SemanticType>,
    /// True for actions (mutating), false for functions.
    pub side_effecting: bool,
}

/// A resolved operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: SmolStr,
    pub canonical_name: SmolStr,
    pub semantic_type: SemanticType,
    pub required: bool,
}
