//! Declaration index over a metadata tree.
//!
//! The symbol table assigns every declared type a dense [`TypeId`] within its
//! category, in document order, and indexes declarations by qualified name.
//! Namespace aliases are folded in so `Alias.Type` and `Namespace.Type` find
//! the same declaration.

use crate::ir::types::TypeId;
use crate::metadata::{
    AssociationDecl, ComplexTypeDecl, ContainerDecl, Dialect, EntityTypeDecl, EnumTypeDecl,
    MetadataTree, TypeDefinitionDecl, TypeName, split_qualified,
};
use crate::semantic::diag::DigestError;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

/// Category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Entity,
    Complex,
    Enum,
    TypeDefinition,
}

impl DeclKind {
    /// Returns a human-readable name for this category.
    pub fn name(self) -> &'static str {
        match self {
            DeclKind::Entity => "entity type",
            DeclKind::Complex => "complex type",
            DeclKind::Enum => "enum type",
            DeclKind::TypeDefinition => "type definition",
        }
    }
}

/// Reference to a declaration: its category and index within that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclRef {
    pub kind: DeclKind,
    pub id: TypeId,
}

/// A declaration together with the namespace that declares it.
#[derive(Debug, Clone)]
pub struct Declared<'t, D> {
    /// Declaring namespace.
    pub namespace: &'t SmolStr,
    /// `Namespace.Name`.
    pub qualified_name: SmolStr,
    /// The declaration itself.
    pub decl: &'t D,
}

/// Index of all declarations in a metadata tree.
#[derive(Debug, Clone)]
pub struct SymbolTable<'t> {
    dialect: Dialect,
    entity_types: Vec<Declared<'t, EntityTypeDecl>>,
    complex_types: Vec<Declared<'t, ComplexTypeDecl>>,
    enum_types: Vec<Declared<'t, EnumTypeDecl>>,
    type_definitions: Vec<Declared<'t, TypeDefinitionDecl>>,
    associations: Vec<Declared<'t, AssociationDecl>>,
    containers: Vec<Declared<'t, ContainerDecl>>,

    /// Qualified type name to declaration.
    types: HashMap<SmolStr, DeclRef>,

    /// Qualified association name to index.
    association_index: HashMap<SmolStr, usize>,

    /// Alias to namespace.
    aliases: HashMap<SmolStr, SmolStr>,
}

impl<'t> SymbolTable<'t> {
    /// Indexes a tree, reporting duplicate declarations.
    ///
    /// Duplicates are reported and the later declaration is dropped, so the
    /// table stays usable for reporting further errors in the same phase.
    pub fn build(tree: &'t MetadataTree) -> (Self, Vec<DigestError>) {
        let mut table = Self {
            dialect: tree.dialect,
            entity_types: Vec::new(),
            complex_types: Vec::new(),
            enum_types: Vec::new(),
            type_definitions: Vec::new(),
            associations: Vec::new(),
            containers: Vec::new(),
            types: HashMap::new(),
            association_index: HashMap::new(),
            aliases: HashMap::new(),
        };
        let mut errors = Vec::new();

        for schema in &tree.schemas {
            if let Some(alias) = &schema.alias {
                table
                    .aliases
                    .insert(alias.clone(), schema.namespace.clone());
            }
        }

        for schema in &tree.schemas {
            let namespace = &schema.namespace;

            for decl in &schema.entity_types {
                let qualified_name = qualify(namespace, &decl.name);
                let id = TypeId::new(table.entity_types.len());
                if table.declare(
                    &qualified_name,
                    DeclKind::Entity,
                    id,
                    namespace,
                    &mut errors,
                ) {
                    table.entity_types.push(Declared {
                        namespace,
                        qualified_name,
                        decl,
                    });
                }
            }

            for decl in &schema.complex_types {
                let qualified_name = qualify(namespace, &decl.name);
                let id = TypeId::new(table.complex_types.len());
                if table.declare(
                    &qualified_name,
                    DeclKind::Complex,
                    id,
                    namespace,
                    &mut errors,
                ) {
                    table.complex_types.push(Declared {
                        namespace,
                        qualified_name,
                        decl,
                    });
                }
            }

            for decl in &schema.enum_types {
                let qualified_name = qualify(namespace, &decl.name);
                let id = TypeId::new(table.enum_types.len());
                if table.declare(&qualified_name, DeclKind::Enum, id, namespace, &mut errors) {
                    table.enum_types.push(Declared {
                        namespace,
                        qualified_name,
                        decl,
                    });
                }
            }

            for decl in &schema.type_definitions {
                let qualified_name = qualify(namespace, &decl.name);
                let id = TypeId::new(table.type_definitions.len());
                if table.declare(
                    &qualified_name,
                    DeclKind::TypeDefinition,
                    id,
                    namespace,
                    &mut errors,
                ) {
                    table.type_definitions.push(Declared {
                        namespace,
                        qualified_name,
                        decl,
                    });
                }
            }

            for decl in &schema.associations {
                let qualified_name = qualify(namespace, &decl.name);
                if table.association_index.contains_key(&qualified_name) {
                    errors.push(DigestError::DuplicateDeclaration {
                        scope: format!("namespace '{namespace}'"),
                        name: qualified_name,
                    });
                    continue;
                }
                table
                    .association_index
                    .insert(qualified_name.clone(), table.associations.len());
                table.associations.push(Declared {
                    namespace,
                    qualified_name,
                    decl,
                });
            }

            if let Some(container) = &schema.container {
                check_container_names(container, &mut errors);
                table.containers.push(Declared {
                    namespace,
                    qualified_name: qualify(namespace, &container.name),
                    decl: container,
                });
            }
        }

        (table, errors)
    }

    fn declare(
        &mut self,
        qualified_name: &SmolStr,
        kind: DeclKind,
        id: TypeId,
        namespace: &SmolStr,
        errors: &mut Vec<DigestError>,
    ) -> bool {
        if self.types.contains_key(qualified_name) {
            errors.push(DigestError::DuplicateDeclaration {
                scope: format!("namespace '{namespace}'"),
                name: qualified_name.clone(),
            });
            return false;
        }
        self.types
            .insert(qualified_name.clone(), DeclRef { kind, id });
        true
    }

    /// Returns the dialect of the indexed tree.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Resolves an alias to its namespace, or returns the input unchanged.
    pub fn resolve_namespace<'a>(&'a self, namespace: &'a str) -> &'a str {
        self.aliases
            .get(namespace)
            .map(SmolStr::as_str)
            .unwrap_or(namespace)
    }

    /// Normalizes a type name to `Namespace.Name`, resolving aliases.
    ///
    /// Unqualified names are qualified with `context_namespace`.
    pub fn normalize(&self, name: &TypeName, context_namespace: &str) -> SmolStr {
        let namespace = match &name.namespace {
            Some(namespace) => self.resolve_namespace(namespace),
            None => context_namespace,
        };
        qualify(namespace, &name.name)
    }

    /// Looks up a declared (non-primitive) type.
    pub fn lookup(&self, name: &TypeName, context_namespace: &str) -> Option<DeclRef> {
        self.types
            .get(&self.normalize(name, context_namespace))
            .copied()
    }

    /// Looks up a declared type by its qualified (or aliased) name.
    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<DeclRef> {
        let (namespace, name) = split_qualified(qualified_name);
        match namespace {
            Some(namespace) => self
                .types
                .get(&qualify(self.resolve_namespace(namespace), name))
                .copied(),
            None => None,
        }
    }

    /// Looks up an association by (possibly aliased or unqualified) name.
    pub fn lookup_association(
        &self,
        raw: &str,
        context_namespace: &str,
    ) -> Option<&Declared<'t, AssociationDecl>> {
        let (namespace, name) = split_qualified(raw);
        let namespace = namespace
            .map(|ns| self.resolve_namespace(ns))
            .unwrap_or(context_namespace);
        self.association_index
            .get(&qualify(namespace, name))
            .map(|index| &self.associations[*index])
    }

    /// Returns the qualified name of a declaration.
    pub fn qualified_name(&self, decl: DeclRef) -> &SmolStr {
        let index = decl.id.as_usize();
        match decl.kind {
            DeclKind::Entity => &self.entity_types[index].qualified_name,
            DeclKind::Complex => &self.complex_types[index].qualified_name,
            DeclKind::Enum => &self.enum_types[index].qualified_name,
            DeclKind::TypeDefinition => &self.type_definitions[index].qualified_name,
        }
    }

    pub fn entity_types(&self) -> &[Declared<'t, EntityTypeDecl>] {
        &self.entity_types
    }

    pub fn complex_types(&self) -> &[Declared<'t, ComplexTypeDecl>] {
        &self.complex_types
    }

    pub fn enum_types(&self) -> &[Declared<'t, EnumTypeDecl>] {
        &self.enum_types
    }

    pub fn type_definitions(&self) -> &[Declared<'t, TypeDefinitionDecl>] {
        &self.type_definitions
    }

    pub fn associations(&self) -> &[Declared<'t, AssociationDecl>] {
        &self.associations
    }

    pub fn containers(&self) -> &[Declared<'t, ContainerDecl>] {
        &self.containers
    }
}

/// Joins a namespace and a local name.
pub fn qualify(namespace: &str, name: &str) -> SmolStr {
    SmolStr::from(format!("{namespace}.{name}"))
}

// Entity sets and singletons share the container's endpoint namespace on the wire.
fn check_container_names(container: &ContainerDecl, errors: &mut Vec<DigestError>) {
    let mut seen = HashSet::new();
    let endpoint_names = container
        .entity_sets
        .iter()
        .map(|set| &set.name)
        .chain(container.singletons.iter().map(|singleton| &singleton.name));

    for name in endpoint_names {
        if !seen.insert(name) {
            errors.push(DigestError::DuplicateDeclaration {
                scope: format!("container '{}'", container.name),
                name: name.clone(),
            });
        }
    }
}
