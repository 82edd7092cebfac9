//! Metadata tree: the raw, dialect-tagged input to the digestion pipeline.
//!
//! The tree mirrors the structure of an EDMX document after tokenization:
//! schemas (namespaces) holding type declarations, dialect-A associations and
//! an optional entity container. Names and type references are kept as the
//! wire strings found in the document; nothing here is resolved.
//!
//! All declarations deserialize with serde, so a tree can be loaded from JSON
//! fixtures, and expose small builder methods for constructing trees in code.
//!
//! # Dialects
//!
//! - [`Dialect::V2`] describes relationships indirectly through
//!   [`AssociationDecl`]s; navigation properties use
//!   [`NavigationLink::Association`].
//! - [`Dialect::V4`] declares targets directly on navigation properties with
//!   [`NavigationLink::Direct`].
//!
//! The dialect tag exists only at this boundary. Everything produced by
//! [`crate::semantic`] is dialect-agnostic.

pub mod type_name;

pub use type_name::{EDM_NAMESPACE, PartnerPath, TypeName, split_qualified};

use serde::Deserialize;
use smol_str::SmolStr;

/// Relationship dialect of a metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Associations with role ends (dialect A).
    V2,
    /// Direct navigation targets with partners (dialect B).
    V4,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::V2 => write!(f, "V2"),
            Dialect::V4 => write!(f, "V4"),
        }
    }
}

/// Root of the metadata tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataTree {
    /// Relationship dialect.
    pub dialect: Dialect,
    /// Declared schemas in document order.
    #[serde(default)]
    pub schemas: Vec<SchemaDecl>,
}

impl MetadataTree {
    /// Creates an empty tree for the given dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            schemas: Vec::new(),
        }
    }

    /// Adds a schema.
    pub fn with_schema(mut self, schema: SchemaDecl) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Parses a tree from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A schema: one namespace worth of declarations.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SchemaDecl {
    /// Namespace, e.g. `NorthwindModel`.
    pub namespace: SmolStr,
    /// Optional alias usable instead of the namespace in type references.
    #[serde(default)]
    pub alias: Option<SmolStr>,
    #[serde(default)]
    pub entity_types: Vec<EntityTypeDecl>,
    #[serde(default)]
    pub complex_types: Vec<ComplexTypeDecl>,
    #[serde(default)]
    pub enum_types: Vec<EnumTypeDecl>,
    #[serde(default)]
    pub type_definitions: Vec<TypeDefinitionDecl>,
    /// Dialect-A relationship declarations.
    #[serde(default)]
    pub associations: Vec<AssociationDecl>,
    #[serde(default)]
    pub container: Option<ContainerDecl>,
}

impl SchemaDecl {
    pub fn new(namespace: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<SmolStr>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityTypeDecl) -> Self {
        self.entity_types.push(entity_type);
        self
    }

    pub fn with_complex_type(mut self, complex_type: ComplexTypeDecl) -> Self {
        self.complex_types.push(complex_type);
        self
    }

    pub fn with_enum_type(mut self, enum_type: EnumTypeDecl) -> Self {
        self.enum_types.push(enum_type);
        self
    }

    pub fn with_type_definition(mut self, definition: TypeDefinitionDecl) -> Self {
        self.type_definitions.push(definition);
        self
    }

    pub fn with_association(mut self, association: AssociationDecl) -> Self {
        self.associations.push(association);
        self
    }

    pub fn with_container(mut self, container: ContainerDecl) -> Self {
        self.container = Some(container);
        self
    }
}

/// An entity type declaration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EntityTypeDecl {
    pub name: SmolStr,
    #[serde(default)]
    pub base_type: Option<SmolStr>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_open: bool,
    /// Key property names in declaration order.
    #[serde(default)]
    pub keys: Vec<SmolStr>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub navigation_properties: Vec<NavigationPropertyDecl>,
}

impl EntityTypeDecl {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<SmolStr>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn with_key(mut self, key: impl Into<SmolStr>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationPropertyDecl) -> Self {
        self.navigation_properties.push(navigation);
        self
    }
}

/// A complex type declaration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComplexTypeDecl {
    pub name: SmolStr,
    #[serde(default)]
    pub base_type: Option<SmolStr>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
}

impl ComplexTypeDecl {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<SmolStr>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }
}

/// A structural property declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDecl {
    pub name: SmolStr,
    /// Wire type reference, e.g. `Edm.Int32` or `Collection(NS.Address)`.
    pub type_name: SmolStr,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl PropertyDecl {
    /// Creates a nullable property.
    pub fn new(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
        }
    }

    /// Creates a non-nullable property.
    pub fn required(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, type_name)
        }
    }
}

/// A navigation property declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavigationPropertyDecl {
    pub name: SmolStr,
    pub link: NavigationLink,
}

impl NavigationPropertyDecl {
    /// Creates a dialect-A navigation bound to an association's roles.
    pub fn association(
        name: impl Into<SmolStr>,
        relationship: impl Into<SmolStr>,
        from_role: impl Into<SmolStr>,
        to_role: impl Into<SmolStr>,
    ) -> Self {
        Self {
            name: name.into(),
            link: NavigationLink::Association {
                relationship: relationship.into(),
                from_role: from_role.into(),
                to_role: to_role.into(),
            },
        }
    }

    /// Creates a dialect-B navigation with a direct target.
    pub fn direct(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            link: NavigationLink::Direct {
                type_name: type_name.into(),
                nullable: None,
                partner: None,
            },
        }
    }

    /// Sets the partner of a direct navigation. Has no effect on dialect-A links.
    pub fn with_partner(mut self, partner_name: impl Into<SmolStr>) -> Self {
        if let NavigationLink::Direct { partner, .. } = &mut self.link {
            *partner = Some(partner_name.into());
        }
        self
    }

    /// Sets the nullability of a direct navigation. Has no effect on dialect-A links.
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        if let NavigationLink::Direct { nullable, .. } = &mut self.link {
            *nullable = Some(is_nullable);
        }
        self
    }
}

/// How a navigation property reaches its target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationLink {
    /// Dialect A: navigate from one association role to the other.
    Association {
        /// Qualified association name.
        relationship: SmolStr,
        from_role: SmolStr,
        to_role: SmolStr,
    },
    /// Dialect B: target type declared on the property.
    Direct {
        /// Target type, possibly `Collection(...)`.
        type_name: SmolStr,
        #[serde(default)]
        nullable: Option<bool>,
        /// Partner navigation path, optionally with a type cast segment.
        #[serde(default)]
        partner: Option<SmolStr>,
    },
}

/// A dialect-A association with its role ends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssociationDecl {
    pub name: SmolStr,
    #[serde(default)]
    pub ends: Vec<AssociationEndDecl>,
}

impl AssociationDecl {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ends: Vec::new(),
        }
    }

    pub fn with_end(
        mut self,
        role: impl Into<SmolStr>,
        type_name: impl Into<SmolStr>,
        multiplicity: impl Into<SmolStr>,
    ) -> Self {
        self.ends.push(AssociationEndDecl {
            role: role.into(),
            type_name: type_name.into(),
            multiplicity: multiplicity.into(),
        });
        self
    }
}

/// One end of an association.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssociationEndDecl {
    pub role: SmolStr,
    pub type_name: SmolStr,
    /// Raw multiplicity string (`1`, `0..1`, `*` or their spelled-out forms).
    pub multiplicity: SmolStr,
}

/// An enum type declaration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EnumTypeDecl {
    pub name: SmolStr,
    /// Underlying integral type; `Edm.Int32` when absent.
    #[serde(default)]
    pub underlying_type: Option<SmolStr>,
    #[serde(default)]
    pub is_flags: bool,
    #[serde(default)]
    pub members: Vec<EnumMemberDecl>,
}

impl EnumTypeDecl {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_underlying_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.underlying_type = Some(type_name.into());
        self
    }

    pub fn with_flags(mut self, is_flags: bool) -> Self {
        self.is_flags = is_flags;
        self
    }

    pub fn with_member(mut self, name: impl Into<SmolStr>, value: Option<i64>) -> Self {
        self.members.push(EnumMemberDecl {
            name: name.into(),
            value,
        });
        self
    }
}

/// An enum member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnumMemberDecl {
    pub name: SmolStr,
    #[serde(default)]
    pub value: Option<i64>,
}

/// A V4 type definition: a named alias of a primitive type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypeDefinitionDecl {
    pub name: SmolStr,
    pub underlying_type: SmolStr,
}

impl TypeDefinitionDecl {
    pub fn new(name: impl Into<SmolStr>, underlying_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            underlying_type: underlying_type.into(),
        }
    }
}

/// The entity container of a schema.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ContainerDecl {
    pub name: SmolStr,
    #[serde(default)]
    pub entity_sets: Vec<EntitySetDecl>,
    #[serde(default)]
    pub singletons: Vec<SingletonDecl>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

impl ContainerDecl {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_entity_set(
        mut self,
        name: impl Into<SmolStr>,
        entity_type: impl Into<SmolStr>,
    ) -> Self {
        self.entity_sets.push(EntitySetDecl {
            name: name.into(),
            entity_type: entity_type.into(),
        });
        self
    }

    pub fn with_singleton(
        mut self,
        name: impl Into<SmolStr>,
        type_name: impl Into<SmolStr>,
    ) -> Self {
        self.singletons.push(SingletonDecl {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn with_operation(mut self, operation: OperationDecl) -> Self {
        self.operations.push(operation);
        self
    }
}

/// A collection endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntitySetDecl {
    pub name: SmolStr,
    pub entity_type: SmolStr,
}

/// A single-instance endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SingletonDecl {
    pub name: SmolStr,
    pub type_name: SmolStr,
}

/// A callable function or action.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OperationDecl {
    pub name: SmolStr,
    /// Binding type for bound operations, possibly `Collection(...)`.
    #[serde(default)]
    pub binding: Option<SmolStr>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub return_type: Option<SmolStr>,
    /// True for actions (mutating), false for functions (read-only).
    #[serde(default)]
    pub side_effecting: bool,
}

impl OperationDecl {
    /// Creates a read-only function.
    pub fn function(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a side-effecting action.
    pub fn action(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            side_effecting: true,
            ..Self::default()
        }
    }

    pub fn bound_to(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.binding = Some(type_name.into());
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returning(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterDecl {
    pub name: SmolStr,
    pub type_name: SmolStr,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl ParameterDecl {
    /// Creates a required (non-nullable) parameter.
    pub fn required(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: false,
        }
    }

    /// Creates an optional (nullable) parameter.
    pub fn optional(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
        }
    }
}

fn default_nullable() -> bool {
    true
}
