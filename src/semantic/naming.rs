//! Naming resolution: wire names to canonical identifiers.
//!
//! Every canonical name is produced in the same order:
//! 1. an override, if the user supplied one (used verbatim), otherwise
//! 2. the wire name, sanitized, then case-converted per [`NamingConfig`],
//!    with a trailing `_` when the result is a reserved word.
//!
//! Collisions are never disambiguated. Two entries of one emission scope that
//! end up with the same canonical name are a [`DigestError::DuplicateIdentifier`].

use crate::diag::Diag;
use crate::ir::symbol_table::SymbolTable;
use crate::ir::types::TypeId;
use crate::semantic::diag::DigestError;
use crate::semantic::inheritance::{InheritanceGraph, ResolvedInheritance};
use crate::semantic::navigation::ResolvedNavigation;
use crate::semantic::overrides::NamingOverrides;
use crate::semantic::type_resolver::{ResolvedProperty, ResolvedTypes};
use convert_case::{Case, Casing};
use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, trace, warn};

/// Target identifier case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// `lowerCamel`
    Camel,
    /// `UpperCamel`
    Pascal,
    /// `snake_case`
    Snake,
    /// Keep the sanitized wire name.
    Preserve,
}

impl NameCase {
    /// Converts a name to this case.
    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::Camel => name.to_case(Case::Camel),
            NameCase::Pascal => name.to_case(Case::Pascal),
            NameCase::Snake => name.to_case(Case::Snake),
            NameCase::Preserve => name.to_string(),
        }
    }
}

/// Case conversion and identifier rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Structural and navigation properties, parameters, entity sets and singletons.
    pub property_case: NameCase,

    /// Entity, complex and enum types.
    pub type_case: NameCase,

    pub operation_case: NameCase,

    /// Enum members.
    pub member_case: NameCase,

    /// Prefix of cast function names.
    pub cast_prefix: SmolStr,

    /// Identifiers of the target language that need a trailing `_`.
    pub reserved_words: Vec<SmolStr>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            property_case: NameCase::Camel,
            type_case: NameCase::Pascal,
            operation_case: NameCase::Camel,
            member_case: NameCase::Pascal,
            cast_prefix: SmolStr::new_static("as"),
            reserved_words: Vec::new(),
        }
    }
}

/// Replaces characters outside `[A-Za-z0-9_]` with `_` and prefixes names
/// whose first significant character is a digit with `N`.
///
/// ```
/// use edm_digest::semantic::naming::sanitize;
///
/// assert_eq!(sanitize("Unit Price"), "Unit_Price");
/// assert_eq!(sanitize("2ndAddress"), "N2ndAddress");
/// assert_eq!(sanitize(""), "_");
/// ```
pub fn sanitize(wire: &str) -> String {
    let mut sanitized: String = wire
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let leading_digit = sanitized
        .find(|ch: char| ch != '_')
        .filter(|position| sanitized[*position..].starts_with(|ch: char| ch.is_ascii_digit()));
    if let Some(position) = leading_digit {
        sanitized.insert(position, 'N');
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }

    sanitized
}

/// Produces canonical identifiers from wire names.
///
/// Holds no state besides its two immutable inputs, so the same wire name
/// always maps to the same canonical name.
#[derive(Debug, Clone, Copy)]
pub struct NamingResolver<'a> {
    config: &'a NamingConfig,
    overrides: &'a NamingOverrides,
}

impl<'a> NamingResolver<'a> {
    pub fn new(config: &'a NamingConfig, overrides: &'a NamingOverrides) -> Self {
        Self { config, overrides }
    }

    pub fn config(&self) -> &NamingConfig {
        self.config
    }

    /// Canonical name of an entity or complex type.
    pub fn type_name(&self, qualified_name: &str, local_name: &str) -> SmolStr {
        let canonical = match self.overrides.type_name(qualified_name, local_name) {
            Some(name) => SmolStr::from(name),
            None => self.convert(local_name, self.config.type_case),
        };
        trace!(wire = %qualified_name, canonical = %canonical, "assigned type name");
        canonical
    }

    /// Canonical name of an enum type; enum types take no overrides.
    pub fn enum_name(&self, local_name: &str) -> SmolStr {
        self.convert(local_name, self.config.type_case)
    }

    /// Canonical name of a property declared on `owner`.
    ///
    /// Looks up the owner-scoped override, then the global one, then falls
    /// back to case conversion.
    pub fn property_name(&self, owner_qualified: &str, owner_local: &str, wire: &str) -> SmolStr {
        let canonical = match self.overrides.property(owner_qualified, owner_local, wire) {
            Some(name) => SmolStr::from(name),
            None => self.convert(wire, self.config.property_case),
        };
        trace!(
            owner = %owner_qualified,
            wire = %wire,
            canonical = %canonical,
            "assigned property name"
        );
        canonical
    }

    pub fn operation_name(&self, wire: &str) -> SmolStr {
        self.convert(wire, self.config.operation_case)
    }

    pub fn member_name(&self, wire: &str) -> SmolStr {
        self.convert(wire, self.config.member_case)
    }

    /// Canonical name of an operation parameter, entity set or singleton.
    pub fn plain_name(&self, wire: &str) -> SmolStr {
        self.convert(wire, self.config.property_case)
    }

    /// Name of the function casting to a derived type, from the derived
    /// type's canonical name.
    pub fn cast_name(&self, derived_canonical: &str) -> SmolStr {
        SmolStr::from(format!(
            "{}{}",
            self.config.cast_prefix,
            NameCase::Pascal.apply(derived_canonical)
        ))
    }

    /// Sanitizes and converts a wire name.
    pub fn convert(&self, wire: &str, case: NameCase) -> SmolStr {
        let mut converted = case.apply(&sanitize(wire));
        if converted.is_empty() {
            converted.push('_');
        }
        if converted.starts_with(|ch: char| ch.is_ascii_digit()) {
            converted.insert(0, '_');
        }
        if self
            .config
            .reserved_words
            .iter()
            .any(|reserved| *reserved == converted)
        {
            converted.push('_');
        }
        SmolStr::from(converted)
    }
}

/// One entry of an emission scope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScopeEntry<'n> {
    pub wire: &'n str,
    pub canonical: &'n str,
    /// Whether collisions ending at this entry are reported in this scope.
    /// Inherited entries are checked in their declaring type's scope.
    pub reportable: bool,
}

/// Reports every canonical name claimed twice within one scope.
pub(crate) fn check_unique<'n>(
    scope: &str,
    entries: impl IntoIterator<Item = ScopeEntry<'n>>,
    errors: &mut Vec<DigestError>,
) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for entry in entries {
        match seen.entry(entry.canonical) {
            Entry::Occupied(first) => {
                if entry.reportable {
                    errors.push(DigestError::DuplicateIdentifier {
                        scope: scope.to_string(),
                        identifier: SmolStr::from(entry.canonical),
                        first: SmolStr::from(*first.get()),
                        second: SmolStr::from(entry.wire),
                    });
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.wire);
            }
        }
    }
}

/// Canonical names, parallel to the resolved declarations.
#[derive(Debug, Clone, Default)]
pub(crate) struct CanonicalNames {
    pub entity_types: Vec<SmolStr>,
    pub entity_properties: Vec<Vec<SmolStr>>,
    pub entity_navigations: Vec<Vec<SmolStr>>,
    pub complex_types: Vec<SmolStr>,
    pub complex_properties: Vec<Vec<SmolStr>>,
    pub enum_types: Vec<SmolStr>,
    pub enum_members: Vec<Vec<SmolStr>>,
    pub entity_sets: Vec<SmolStr>,
    pub singletons: Vec<SmolStr>,
    pub operations: Vec<SmolStr>,
    pub parameters: Vec<Vec<SmolStr>>,
}

/// Assigns canonical names and checks the per-type and per-model scopes.
///
/// Function and service namespaces are checked on the assembled model.
pub(crate) fn run_naming_resolution(
    symbols: &SymbolTable<'_>,
    types: &ResolvedTypes<'_>,
    inheritance: &ResolvedInheritance,
    navigations: &[Vec<ResolvedNavigation<'_>>],
    naming: &NamingResolver<'_>,
    errors: &mut Vec<DigestError>,
) -> CanonicalNames {
    let mut names = CanonicalNames::default();

    for (entity, properties) in symbols.entity_types().iter().zip(&types.entity_properties) {
        let qualified = &entity.qualified_name;
        let local = &entity.decl.name;
        names.entity_types.push(naming.type_name(qualified, local));
        names
            .entity_properties
            .push(property_names(naming, qualified, local, properties));
    }
    for (entity, edges) in symbols.entity_types().iter().zip(navigations) {
        names.entity_navigations.push(
            edges
                .iter()
                .map(|edge| {
                    naming.property_name(&entity.qualified_name, &entity.decl.name, &edge.decl.name)
                })
                .collect(),
        );
    }
    let complex_properties = &types.complex_properties;
    for (complex, properties) in symbols.complex_types().iter().zip(complex_properties) {
        let qualified = &complex.qualified_name;
        let local = &complex.decl.name;
        names.complex_types.push(naming.type_name(qualified, local));
        names
            .complex_properties
            .push(property_names(naming, qualified, local, properties));
    }
    for enumeration in symbols.enum_types() {
        names
            .enum_types
            .push(naming.enum_name(&enumeration.decl.name));
        names.enum_members.push(
            enumeration
                .decl
                .members
                .iter()
                .map(|member| naming.member_name(&member.name))
                .collect(),
        );
    }
    names.entity_sets = types
        .entity_sets
        .iter()
        .map(|set| naming.plain_name(set.name))
        .collect();
    names.singletons = types
        .singletons
        .iter()
        .map(|singleton| naming.plain_name(singleton.name))
        .collect();
    for operation in &types.operations {
        names
            .operations
            .push(naming.operation_name(&operation.decl.name));
        names.parameters.push(
            operation
                .decl
                .parameters
                .iter()
                .map(|parameter| naming.plain_name(&parameter.name))
                .collect(),
        );
    }

    check_type_namespace(symbols, &names, errors);

    let property_wires: Vec<Vec<&str>> = types
        .entity_properties
        .iter()
        .map(|properties| properties.iter().map(|p| p.decl.name.as_str()).collect())
        .collect();
    let navigation_wires: Vec<Vec<&str>> = navigations
        .iter()
        .map(|edges| edges.iter().map(|edge| edge.decl.name.as_str()).collect())
        .collect();
    for (index, entity) in symbols.entity_types().iter().enumerate() {
        let id = TypeId::new(index);
        check_unique(
            &format!("properties of '{}'", entity.qualified_name),
            flattened(
                &inheritance.entities,
                id,
                &property_wires,
                &names.entity_properties,
            ),
            errors,
        );

        check_unique(
            &format!("navigation properties of '{}'", entity.qualified_name),
            flattened(
                &inheritance.entities,
                id,
                &navigation_wires,
                &names.entity_navigations,
            ),
            errors,
        );
    }

    let complex_wires: Vec<Vec<&str>> = types
        .complex_properties
        .iter()
        .map(|properties| properties.iter().map(|p| p.decl.name.as_str()).collect())
        .collect();
    for (index, complex) in symbols.complex_types().iter().enumerate() {
        check_unique(
            &format!("properties of '{}'", complex.qualified_name),
            flattened(
                &inheritance.complexes,
                TypeId::new(index),
                &complex_wires,
                &names.complex_properties,
            ),
            errors,
        );
    }

    for (enumeration, members) in symbols.enum_types().iter().zip(&names.enum_members) {
        check_unique(
            &format!("members of enum '{}'", enumeration.qualified_name),
            enumeration
                .decl
                .members
                .iter()
                .zip(members)
                .map(|(member, canonical)| ScopeEntry {
                    wire: &member.name,
                    canonical,
                    reportable: true,
                }),
            errors,
        );
    }

    for (operation, parameters) in types.operations.iter().zip(&names.parameters) {
        check_unique(
            &format!(
                "parameters of operation '{}.{}'",
                operation.container, operation.decl.name
            ),
            operation
                .decl
                .parameters
                .iter()
                .zip(parameters)
                .map(|(parameter, canonical)| ScopeEntry {
                    wire: &parameter.name,
                    canonical,
                    reportable: true,
                }),
            errors,
        );
    }

    debug!(
        entity_types = names.entity_types.len(),
        complex_types = names.complex_types.len(),
        errors = errors.len(),
        "naming resolution finished"
    );

    names
}

fn property_names(
    naming: &NamingResolver<'_>,
    qualified: &str,
    local: &str,
    properties: &[ResolvedProperty<'_>],
) -> Vec<SmolStr> {
    properties
        .iter()
        .map(|property| naming.property_name(qualified, local, &property.decl.name))
        .collect()
}

/// Members of a type and its ancestors, root-most ancestor first.
fn flattened<'n>(
    graph: &InheritanceGraph,
    id: TypeId,
    wires: &'n [Vec<&'n str>],
    canonicals: &'n [Vec<SmolStr>],
) -> Vec<ScopeEntry<'n>> {
    graph
        .ancestors(id)
        .iter()
        .rev()
        .map(|ancestor| (*ancestor, false))
        .chain(std::iter::once((id, true)))
        .flat_map(|(owner, reportable)| {
            let index = owner.as_usize();
            wires[index]
                .iter()
                .zip(&canonicals[index])
                .map(move |(wire, canonical)| ScopeEntry {
                    wire,
                    canonical,
                    reportable,
                })
        })
        .collect()
}

fn check_type_namespace(
    symbols: &SymbolTable<'_>,
    names: &CanonicalNames,
    errors: &mut Vec<DigestError>,
) {
    let entities = symbols
        .entity_types()
        .iter()
        .zip(&names.entity_types)
        .map(|(entity, canonical)| (entity.qualified_name.as_str(), canonical.as_str()));
    let complexes = symbols
        .complex_types()
        .iter()
        .zip(&names.complex_types)
        .map(|(complex, canonical)| (complex.qualified_name.as_str(), canonical.as_str()));
    let enums = symbols
        .enum_types()
        .iter()
        .zip(&names.enum_types)
        .map(|(enumeration, canonical)| (enumeration.qualified_name.as_str(), canonical.as_str()));

    check_unique(
        "type names",
        entities
            .chain(complexes)
            .chain(enums)
            .map(|(wire, canonical)| ScopeEntry {
                wire,
                canonical,
                reportable: true,
            }),
        errors,
    );
}

/// Warns about overrides that match nothing.
///
/// Type-scoped property overrides apply to members declared on that type
/// itself; an override for an inherited member is reported as unused.
pub(crate) fn unused_override_warnings(
    symbols: &SymbolTable<'_>,
    overrides: &NamingOverrides,
) -> Vec<Diag> {
    let mut warnings = Vec::new();

    let structured = symbols
        .entity_types()
        .iter()
        .map(|entity| {
            let members: Vec<&str> = entity
                .decl
                .properties
                .iter()
                .map(|property| property.name.as_str())
                .chain(
                    entity
                        .decl
                        .navigation_properties
                        .iter()
                        .map(|navigation| navigation.name.as_str()),
                )
                .collect();
            (&entity.qualified_name, &entity.decl.name, members)
        })
        .chain(symbols.complex_types().iter().map(|complex| {
            let members: Vec<&str> = complex
                .decl
                .properties
                .iter()
                .map(|property| property.name.as_str())
                .collect();
            (&complex.qualified_name, &complex.decl.name, members)
        }))
        .collect::<Vec<_>>();

    for (key, scoped) in &overrides.entities {
        let matched: Vec<&Vec<&str>> = structured
            .iter()
            .filter(|(qualified, local, _)| *qualified == key || *local == key)
            .map(|(_, _, members)| members)
            .collect();

        if matched.is_empty() {
            warn!(type_name = %key, "naming override for unknown type");
            warnings.push(
                Diag::warning(format!("naming override for unknown type '{key}'"))
                    .with_code("digest::unused_override"),
            );
            continue;
        }

        for wire in scoped.properties.keys() {
            let declared = matched
                .iter()
                .any(|members| members.contains(&wire.as_str()));
            if !declared {
                warn!(type_name = %key, property = %wire, "naming override matches no property");
                warnings.push(
                    Diag::warning(format!(
                        "naming override for '{key}.{wire}' matches no property declared on '{key}'"
                    ))
                    .with_code("digest::unused_override"),
                );
            }
        }
    }

    for wire in overrides.properties.keys() {
        let used = structured
            .iter()
            .any(|(_, _, members)| members.contains(&wire.as_str()));
        if !used {
            warn!(property = %wire, "global naming override matches no property");
            warnings.push(
                Diag::warning(format!("global naming override for '{wire}' matches no property"))
                    .with_code("digest::unused_override"),
            );
        }
    }

    warnings
}
