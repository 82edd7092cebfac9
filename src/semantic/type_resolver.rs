//! Type resolution: wire type names to [`SemanticType`]s.
//!
//! Primitive names are looked up in the fixed [`PRIMITIVE_TYPES`] table; all
//! other names are looked up in the [`SymbolTable`]. A `Collection(...)`
//! wrapper sets [`SemanticType::is_collection`].
//!
//! [`PRIMITIVE_TYPES`]: crate::ir::types::PRIMITIVE_TYPES

use crate::ir::descriptors::OperationBinding;
use crate::ir::symbol_table::{DeclKind, Declared, SymbolTable, qualify};
use crate::ir::types::{PrimitiveType, SemanticType, TypeId, TypeKind};
use crate::metadata::{ContainerDecl, OperationDecl, PropertyDecl, TypeName};
use crate::semantic::diag::DigestError;
use smol_str::SmolStr;
use tracing::debug;

/// Where a type reference appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePosition {
    /// Property of an entity or complex type: no entity types allowed.
    Structural,
    /// Operation parameter, return type or binding: entity types allowed.
    Operation,
}

/// The declaration site of a type reference, used for error context.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSite<'s> {
    /// Namespace used to qualify unqualified names.
    pub namespace: &'s str,
    pub position: TypePosition,
    /// Human-readable description, e.g. "property 'NS.Product.Price'".
    pub context: &'s str,
}

/// Pure lookup from type names to semantic types.
///
/// Type definitions are resolved once, up front. A reference to a type
/// definition with an unknown underlying type fails without restating the
/// definition's own error.
#[derive(Debug, Clone)]
pub struct TypeResolver<'a, 't> {
    symbols: &'a SymbolTable<'t>,
    /// Underlying primitive of each type definition, by `TypeId`.
    definitions: Vec<Option<PrimitiveType>>,
}

/// Why a single reference failed to resolve.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReferenceError {
    /// The reference itself is bad.
    Unresolved(DigestError),
    /// The reference names a type definition whose underlying type is bad.
    BadDefinition(TypeId),
}

impl<'a, 't> TypeResolver<'a, 't> {
    /// Creates a resolver over a declaration index.
    pub fn new(symbols: &'a SymbolTable<'t>) -> Self {
        let definitions = symbols
            .type_definitions()
            .iter()
            .map(|definition| PrimitiveType::from_wire(&definition.decl.underlying_type))
            .collect();
        Self {
            symbols,
            definitions,
        }
    }

    /// One error per type definition whose underlying type is not a primitive.
    pub fn definition_errors(&self) -> impl Iterator<Item = DigestError> + '_ {
        self.definitions
            .iter()
            .enumerate()
            .filter(|(_, underlying)| underlying.is_none())
            .map(|(index, _)| self.definition_error(TypeId::new(index)))
    }

    fn definition_error(&self, id: TypeId) -> DigestError {
        let definition = &self.symbols.type_definitions()[id.as_usize()];
        DigestError::UnresolvedTypeReference {
            type_name: definition.decl.underlying_type.clone(),
            context: format!("type definition '{}'", definition.qualified_name),
        }
    }

    /// Resolves a wire type name at a reference site.
    ///
    /// A reference to a broken type definition yields that definition's error.
    pub fn resolve(&self, raw: &str, site: ReferenceSite<'_>) -> Result<SemanticType, DigestError> {
        self.resolve_reference(raw, site).map_err(|error| match error {
            ReferenceError::Unresolved(error) => error,
            ReferenceError::BadDefinition(id) => self.definition_error(id),
        })
    }

    pub(crate) fn resolve_reference(
        &self,
        raw: &str,
        site: ReferenceSite<'_>,
    ) -> Result<SemanticType, ReferenceError> {
        let name = TypeName::parse(raw);
        let unresolved = |context: String| {
            ReferenceError::Unresolved(DigestError::UnresolvedTypeReference {
                type_name: SmolStr::from(raw),
                context,
            })
        };

        if name.is_edm() {
            return PrimitiveType::from_wire(&name.qualified())
                .map(|primitive| semantic(TypeKind::Primitive(primitive), name.is_collection))
                .ok_or_else(|| unresolved(site.context.to_string()));
        }

        let Some(decl) = self.symbols.lookup(&name, site.namespace) else {
            return Err(unresolved(site.context.to_string()));
        };

        let kind = match decl.kind {
            DeclKind::Complex => TypeKind::Complex(decl.id),
            DeclKind::Enum => TypeKind::Enum(decl.id),
            DeclKind::TypeDefinition => match self.definitions[decl.id.as_usize()] {
                Some(underlying) => TypeKind::Primitive(underlying),
                None => return Err(ReferenceError::BadDefinition(decl.id)),
            },
            DeclKind::Entity => match site.position {
                TypePosition::Operation => TypeKind::Entity(decl.id),
                TypePosition::Structural => {
                    return Err(unresolved(format!(
                        "{} (entity types cannot be property types)",
                        site.context
                    )));
                }
            },
        };

        Ok(semantic(kind, name.is_collection))
    }

    /// Resolves a reference that must name an entity type.
    ///
    /// Returns the entity type and whether the reference was a collection.
    pub fn resolve_entity(&self, raw: &str, namespace: &str) -> Option<(TypeId, bool)> {
        let name = TypeName::parse(raw);
        match self.symbols.lookup(&name, namespace) {
            Some(decl) if decl.kind == DeclKind::Entity => Some((decl.id, name.is_collection)),
            _ => None,
        }
    }

    /// Resolves a reference that must name a complex type.
    pub fn resolve_complex(&self, raw: &str, namespace: &str) -> Option<TypeId> {
        let name = TypeName::parse(raw);
        match self.symbols.lookup(&name, namespace) {
            Some(decl) if decl.kind == DeclKind::Complex && !name.is_collection => Some(decl.id),
            _ => None,
        }
    }
}

fn semantic(kind: TypeKind, is_collection: bool) -> SemanticType {
    if is_collection {
        SemanticType::collection(kind)
    } else {
        SemanticType::single(kind)
    }
}

/// A structural property with its resolved type.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedProperty<'t> {
    pub decl: &'t PropertyDecl,
    pub semantic_type: SemanticType,
}

/// An entity set or singleton with its resolved entity type.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEndpoint<'t> {
    pub name: &'t SmolStr,
    pub container: SmolStr,
    pub entity_type: TypeId,
}

/// An operation with resolved binding, parameters and return type.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedOperation<'t> {
    pub decl: &'t OperationDecl,
    pub container: SmolStr,
    pub binding: OperationBinding,
    pub parameter_types: Vec<SemanticType>,
    pub return_type: Option<SemanticType>,
}

/// Output of the type resolution phase.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedTypes<'t> {
    pub entity_bases: Vec<Option<TypeId>>,
    pub complex_bases: Vec<Option<TypeId>>,
    pub entity_properties: Vec<Vec<ResolvedProperty<'t>>>,
    pub complex_properties: Vec<Vec<ResolvedProperty<'t>>>,
    pub enum_underlying: Vec<PrimitiveType>,
    pub entity_sets: Vec<ResolvedEndpoint<'t>>,
    pub singletons: Vec<ResolvedEndpoint<'t>>,
    pub operations: Vec<ResolvedOperation<'t>>,
}

/// Resolves every type reference in the tree, collecting all failures.
pub(crate) fn run_type_resolution<'t>(
    symbols: &SymbolTable<'t>,
    errors: &mut Vec<DigestError>,
) -> ResolvedTypes<'t> {
    let resolver = TypeResolver::new(symbols);
    let mut resolved = ResolvedTypes::default();

    errors.extend(resolver.definition_errors());

    for entity in symbols.entity_types() {
        let base = entity.decl.base_type.as_ref().and_then(|base| {
            let found = resolver.resolve_entity(base, entity.namespace);
            match found {
                Some((id, false)) => Some(id),
                _ => {
                    errors.push(DigestError::UnresolvedTypeReference {
                        type_name: base.clone(),
                        context: format!("base type of entity type '{}'", entity.qualified_name),
                    });
                    None
                }
            }
        });
        resolved.entity_bases.push(base);
        resolved.entity_properties.push(resolve_properties(
            &resolver,
            entity.namespace,
            &entity.qualified_name,
            &entity.decl.properties,
            errors,
        ));
    }

    for complex in symbols.complex_types() {
        let base = complex.decl.base_type.as_ref().and_then(|base| {
            let found = resolver.resolve_complex(base, complex.namespace);
            if found.is_none() {
                errors.push(DigestError::UnresolvedTypeReference {
                    type_name: base.clone(),
                    context: format!("base type of complex type '{}'", complex.qualified_name),
                });
            }
            found
        });
        resolved.complex_bases.push(base);
        resolved.complex_properties.push(resolve_properties(
            &resolver,
            complex.namespace,
            &complex.qualified_name,
            &complex.decl.properties,
            errors,
        ));
    }

    for enumeration in symbols.enum_types() {
        let raw = enumeration
            .decl
            .underlying_type
            .clone()
            .unwrap_or_else(|| SmolStr::new_static("Edm.Int32"));
        match PrimitiveType::from_wire(&raw) {
            Some(primitive) if primitive.is_integral() => {
                resolved.enum_underlying.push(primitive);
            }
            _ => {
                errors.push(DigestError::InvalidEnumType {
                    enum_type: enumeration.qualified_name.clone(),
                    underlying: raw,
                });
                resolved.enum_underlying.push(PrimitiveType::Int32);
            }
        }
    }

    for container in symbols.containers() {
        resolve_container(&resolver, container, &mut resolved, errors);
    }

    debug!(
        entity_types = resolved.entity_properties.len(),
        complex_types = resolved.complex_properties.len(),
        operations = resolved.operations.len(),
        errors = errors.len(),
        "type resolution finished"
    );

    resolved
}

fn resolve_properties<'t>(
    resolver: &TypeResolver<'_, 't>,
    namespace: &str,
    owner: &str,
    properties: &'t [PropertyDecl],
    errors: &mut Vec<DigestError>,
) -> Vec<ResolvedProperty<'t>> {
    let mut resolved = Vec::with_capacity(properties.len());

    for decl in properties {
        let context = format!("property '{owner}.{}'", decl.name);
        let site = ReferenceSite {
            namespace,
            position: TypePosition::Structural,
            context: &context,
        };
        match resolver.resolve_reference(&decl.type_name, site) {
            Ok(semantic_type) => resolved.push(ResolvedProperty {
                decl,
                semantic_type,
            }),
            Err(error) => report(error, errors),
        }
    }

    resolved
}

fn resolve_container<'t>(
    resolver: &TypeResolver<'_, 't>,
    container: &Declared<'t, ContainerDecl>,
    resolved: &mut ResolvedTypes<'t>,
    errors: &mut Vec<DigestError>,
) {
    let namespace = container.namespace.as_str();
    let container_name = &container.qualified_name;

    for set in &container.decl.entity_sets {
        match resolver.resolve_entity(&set.entity_type, namespace) {
            Some((entity_type, false)) => resolved.entity_sets.push(ResolvedEndpoint {
                name: &set.name,
                container: container_name.clone(),
                entity_type,
            }),
            _ => errors.push(DigestError::UnresolvedTypeReference {
                type_name: set.entity_type.clone(),
                context: format!("entity set '{}'", qualify(container_name, &set.name)),
            }),
        }
    }

    for singleton in &container.decl.singletons {
        match resolver.resolve_entity(&singleton.type_name, namespace) {
            Some((entity_type, false)) => resolved.singletons.push(ResolvedEndpoint {
                name: &singleton.name,
                container: container_name.clone(),
                entity_type,
            }),
            _ => errors.push(DigestError::UnresolvedTypeReference {
                type_name: singleton.type_name.clone(),
                context: format!("singleton '{}'", qualify(container_name, &singleton.name)),
            }),
        }
    }

    for decl in &container.decl.operations {
        let operation_name = qualify(container_name, &decl.name);
        let errors_before = errors.len();
        let mut complete = true;

        let binding = match &decl.binding {
            None => OperationBinding::Unbound,
            Some(raw) => match resolver.resolve_entity(raw, namespace) {
                Some((entity_type, is_collection)) => OperationBinding::Bound {
                    entity_type,
                    is_collection,
                },
                None => {
                    errors.push(DigestError::UnresolvedTypeReference {
                        type_name: raw.clone(),
                        context: format!("binding of operation '{operation_name}'"),
                    });
                    OperationBinding::Unbound
                }
            },
        };

        let mut parameter_types = Vec::with_capacity(decl.parameters.len());
        for parameter in &decl.parameters {
            let context = format!(
                "parameter '{}' of operation '{operation_name}'",
                parameter.name
            );
            let site = ReferenceSite {
                namespace,
                position: TypePosition::Operation,
                context: &context,
            };
            match resolver.resolve_reference(&parameter.type_name, site) {
                Ok(semantic_type) => parameter_types.push(semantic_type),
                Err(error) => {
                    complete = false;
                    report(error, errors);
                }
            }
        }

        let return_type = decl.return_type.as_ref().and_then(|raw| {
            let context = format!("return type of operation '{operation_name}'");
            let site = ReferenceSite {
                namespace,
                position: TypePosition::Operation,
                context: &context,
            };
            match resolver.resolve_reference(raw, site) {
                Ok(semantic_type) => Some(semantic_type),
                Err(error) => {
                    complete = false;
                    report(error, errors);
                    None
                }
            }
        });

        if complete && errors.len() == errors_before {
            resolved.operations.push(ResolvedOperation {
                decl,
                container: container_name.clone(),
                binding,
                parameter_types,
                return_type,
            });
        }
    }
}

/// Records a reference failure. Broken type definitions were already reported.
fn report(error: ReferenceError, errors: &mut Vec<DigestError>) {
    if let ReferenceError::Unresolved(error) = error {
        errors.push(error);
    }
}
