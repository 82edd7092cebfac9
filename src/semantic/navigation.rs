//! Navigation resolution: one dialect-free edge per navigation property.
//!
//! Dialect A (V2) navigations join `navigation -> role -> association ->
//! opposite role -> target type`; the opposite end's multiplicity decides the
//! collection flag, and the partner is the navigation on the target that
//! walks the same association in the other direction.
//!
//! Dialect B (V4) navigations carry the target directly. A declared partner
//! path must name an existing navigation on the target (or on a derived type
//! through a `Namespace.Derived/Nav` cast segment) that points back.

use crate::ir::symbol_table::SymbolTable;
use crate::ir::types::TypeId;
use crate::metadata::{Dialect, NavigationLink, NavigationPropertyDecl, PartnerPath};
use crate::semantic::diag::DigestError;
use crate::semantic::inheritance::InheritanceGraph;
use crate::semantic::type_resolver::TypeResolver;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Cardinality of an association end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// Exactly one.
    One,
    /// Zero or one.
    ZeroOrOne,
    /// Zero or more.
    Many,
}

impl Multiplicity {
    /// Parses a wire multiplicity: `1`/`one`, `0..1`/`zero-or-one`, `*`/`many`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "one" => Some(Self::One),
            "0..1" | "zero-or-one" => Some(Self::ZeroOrOne),
            "*" | "many" => Some(Self::Many),
            _ => None,
        }
    }

    pub fn is_collection(self) -> bool {
        self == Self::Many
    }

    /// Whether a single-valued end may be absent.
    pub fn is_nullable(self) -> bool {
        self == Self::ZeroOrOne
    }
}

/// A navigation edge before naming.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedNavigation<'t> {
    pub decl: &'t NavigationPropertyDecl,
    pub target: TypeId,
    pub is_collection: bool,
    pub nullable: bool,
    pub partner: Option<SmolStr>,
    pub cast_target: Option<TypeId>,
    pub casts: Vec<TypeId>,
}

#[derive(Debug, Clone)]
struct AssociationEnd<'t> {
    role: &'t SmolStr,
    entity_type: TypeId,
    multiplicity: Multiplicity,
}

#[derive(Debug, Clone)]
struct ValidAssociation<'t> {
    ends: [AssociationEnd<'t>; 2],
}

impl<'t> ValidAssociation<'t> {
    fn end(&self, role: &str) -> Option<&AssociationEnd<'t>> {
        self.ends.iter().find(|end| end.role == role)
    }
}

struct NavigationResolver<'a, 't> {
    symbols: &'a SymbolTable<'t>,
    entities: &'a InheritanceGraph,
    types: TypeResolver<'a, 't>,
    /// Well-formed associations by qualified name.
    associations: BTreeMap<SmolStr, ValidAssociation<'t>>,
}

impl<'a, 't> NavigationResolver<'a, 't> {
    fn new(
        symbols: &'a SymbolTable<'t>,
        entities: &'a InheritanceGraph,
        errors: &mut Vec<DigestError>,
    ) -> Self {
        let mut resolver = Self {
            symbols,
            entities,
            types: TypeResolver::new(symbols),
            associations: BTreeMap::new(),
        };
        resolver.validate_associations(errors);
        resolver
    }

    fn validate_associations(&mut self, errors: &mut Vec<DigestError>) {
        for association in self.symbols.associations() {
            let relationship = &association.qualified_name;
            let ends = &association.decl.ends;

            if ends.len() != 2 {
                errors.push(DigestError::MalformedAssociation {
                    relationship: relationship.clone(),
                    reason: format!("declares {} ends instead of 2", ends.len()),
                });
                continue;
            }
            if ends[0].role == ends[1].role {
                errors.push(DigestError::MalformedAssociation {
                    relationship: relationship.clone(),
                    reason: format!("both ends use role '{}'", ends[0].role),
                });
                continue;
            }

            let mut resolved = Vec::with_capacity(2);
            for end in ends {
                let multiplicity = Multiplicity::parse(&end.multiplicity);
                if multiplicity.is_none() {
                    errors.push(DigestError::InvalidMultiplicity {
                        relationship: relationship.clone(),
                        role: end.role.clone(),
                        multiplicity: end.multiplicity.clone(),
                    });
                }
                let entity_type = match self
                    .types
                    .resolve_entity(&end.type_name, association.namespace)
                {
                    Some((id, false)) => Some(id),
                    _ => {
                        errors.push(DigestError::UnresolvedTypeReference {
                            type_name: end.type_name.clone(),
                            context: format!("role '{}' of association '{relationship}'", end.role),
                        });
                        None
                    }
                };
                if let (Some(multiplicity), Some(entity_type)) = (multiplicity, entity_type) {
                    resolved.push(AssociationEnd {
                        role: &end.role,
                        entity_type,
                        multiplicity,
                    });
                }
            }

            if let Ok(ends) = <[AssociationEnd<'t>; 2]>::try_from(resolved) {
                self.associations
                    .insert(relationship.clone(), ValidAssociation { ends });
            }
        }
    }

    fn resolve(
        &self,
        owner: TypeId,
        decl: &'t NavigationPropertyDecl,
        errors: &mut Vec<DigestError>,
    ) -> Option<ResolvedNavigation<'t>> {
        let dialect = self.symbols.dialect();
        let resolved = match (&decl.link, dialect) {
            (
                NavigationLink::Association {
                    relationship,
                    from_role,
                    to_role,
                },
                Dialect::V2,
            ) => self.resolve_association(owner, decl, relationship, from_role, to_role),
            (
                NavigationLink::Direct {
                    type_name,
                    nullable,
                    partner,
                },
                Dialect::V4,
            ) => self.resolve_direct(owner, decl, type_name, *nullable, partner.as_ref()),
            _ => Err(Some(DigestError::DialectMismatch {
                owner: self.qualified_name(owner).clone(),
                navigation: decl.name.clone(),
                dialect,
            })),
        };

        match resolved {
            Ok(navigation) => {
                trace!(
                    owner = %self.qualified_name(owner),
                    navigation = %decl.name,
                    target = %self.qualified_name(navigation.target),
                    collection = navigation.is_collection,
                    "resolved navigation"
                );
                Some(navigation)
            }
            Err(error) => {
                // `None` means the cause was already reported while validating associations.
                errors.extend(error);
                None
            }
        }
    }

    fn resolve_association(
        &self,
        owner: TypeId,
        decl: &'t NavigationPropertyDecl,
        relationship: &SmolStr,
        from_role: &SmolStr,
        to_role: &SmolStr,
    ) -> Result<ResolvedNavigation<'t>, Option<DigestError>> {
        let owner_decl = &self.symbols.entity_types()[owner.as_usize()];
        let Some(declared) = self
            .symbols
            .lookup_association(relationship, owner_decl.namespace)
        else {
            return Err(Some(DigestError::NavigationTargetNotFound {
                owner: owner_decl.qualified_name.clone(),
                navigation: decl.name.clone(),
                reason: format!("association '{relationship}' is not declared"),
            }));
        };
        let Some(association) = self.associations.get(&declared.qualified_name) else {
            return Err(None);
        };

        let malformed = |reason: String| {
            Some(DigestError::MalformedAssociation {
                relationship: declared.qualified_name.clone(),
                reason,
            })
        };
        let from = association.end(from_role).ok_or_else(|| {
            malformed(format!(
                "navigation '{}' on '{}' names undeclared role '{from_role}'",
                decl.name, owner_decl.qualified_name
            ))
        })?;
        let to = association.end(to_role).ok_or_else(|| {
            malformed(format!(
                "navigation '{}' on '{}' names undeclared role '{to_role}'",
                decl.name, owner_decl.qualified_name
            ))
        })?;
        if from.role == to.role {
            return Err(malformed(format!(
                "navigation '{}' on '{}' uses role '{from_role}' for both ends",
                decl.name, owner_decl.qualified_name
            )));
        }
        if from.entity_type != owner && !self.entities.is_ancestor(from.entity_type, owner) {
            return Err(malformed(format!(
                "role '{from_role}' is typed '{}', which is not '{}' or one of its base types",
                self.qualified_name(from.entity_type),
                owner_decl.qualified_name
            )));
        }

        // The partner walks the same association from our target role back to our source role.
        let partner = self
            .entities
            .self_and_ancestors(to.entity_type)
            .find_map(|candidate| {
                let candidate_decl = &self.symbols.entity_types()[candidate.as_usize()];
                candidate_decl
                    .decl
                    .navigation_properties
                    .iter()
                    .find(|navigation| match &navigation.link {
                        NavigationLink::Association {
                            relationship,
                            from_role: back_from,
                            to_role: back_to,
                        } => {
                            back_from == to_role
                                && back_to == from_role
                                && self
                                    .symbols
                                    .lookup_association(relationship, candidate_decl.namespace)
                                    .is_some_and(|back| {
                                        back.qualified_name == declared.qualified_name
                                    })
                        }
                        NavigationLink::Direct { .. } => false,
                    })
            })
            .map(|navigation| navigation.name.clone());

        Ok(ResolvedNavigation {
            decl,
            target: to.entity_type,
            is_collection: to.multiplicity.is_collection(),
            nullable: to.multiplicity.is_nullable(),
            partner,
            cast_target: None,
            casts: self.casts(to.entity_type),
        })
    }

    fn resolve_direct(
        &self,
        owner: TypeId,
        decl: &'t NavigationPropertyDecl,
        type_name: &SmolStr,
        nullable: Option<bool>,
        partner: Option<&SmolStr>,
    ) -> Result<ResolvedNavigation<'t>, Option<DigestError>> {
        let owner_decl = &self.symbols.entity_types()[owner.as_usize()];
        let Some((target, is_collection)) =
            self.types.resolve_entity(type_name, owner_decl.namespace)
        else {
            return Err(Some(DigestError::NavigationTargetNotFound {
                owner: owner_decl.qualified_name.clone(),
                navigation: decl.name.clone(),
                reason: format!("'{type_name}' is not a declared entity type"),
            }));
        };

        let (partner, cast_target) = match partner {
            None => (None, None),
            Some(raw) => {
                let (partner, cast_target) = self
                    .check_direct_partner(owner, decl, target, raw)
                    .map_err(Some)?;
                (Some(partner), cast_target)
            }
        };

        Ok(ResolvedNavigation {
            decl,
            target,
            is_collection,
            nullable: !is_collection && nullable.unwrap_or(true),
            partner,
            cast_target,
            casts: self.casts(target),
        })
    }

    fn check_direct_partner(
        &self,
        owner: TypeId,
        decl: &NavigationPropertyDecl,
        target: TypeId,
        raw: &SmolStr,
    ) -> Result<(SmolStr, Option<TypeId>), DigestError> {
        let owner_decl = &self.symbols.entity_types()[owner.as_usize()];
        let path = PartnerPath::parse(raw);
        let inconsistent = |reason: String| DigestError::InconsistentPartner {
            owner: owner_decl.qualified_name.clone(),
            navigation: decl.name.clone(),
            target: self.qualified_name(target).clone(),
            partner: raw.clone(),
            reason,
        };

        let declaring = match &path.cast {
            None => target,
            Some(cast) => match self.types.resolve_entity(cast, owner_decl.namespace) {
                Some((derived, false))
                    if derived == target || self.entities.is_ancestor(target, derived) =>
                {
                    derived
                }
                _ => {
                    return Err(inconsistent(format!(
                        "cast type '{cast}' is not '{}' or a type derived from it",
                        self.qualified_name(target)
                    )));
                }
            },
        };

        let Some((partner_owner, partner_decl)) = self.find_navigation(declaring, &path.navigation)
        else {
            return Err(inconsistent(format!(
                "'{}' declares no navigation property '{}'",
                self.qualified_name(declaring),
                path.navigation
            )));
        };

        if let NavigationLink::Direct {
            type_name,
            partner: back,
            ..
        } = &partner_decl.link
        {
            if let Some(back) = back {
                let back = PartnerPath::parse(back);
                if back.navigation != decl.name {
                    return Err(inconsistent(format!(
                        "the partner declares '{}' as its own partner",
                        back.navigation
                    )));
                }
            }

            let partner_namespace =
                self.symbols.entity_types()[partner_owner.as_usize()].namespace;
            if let Some((back_target, _)) =
                self.types.resolve_entity(type_name, partner_namespace)
            {
                if !self.entities.is_related(back_target, owner) {
                    return Err(inconsistent(format!(
                        "the partner targets '{}', which is unrelated to '{}'",
                        self.qualified_name(back_target),
                        owner_decl.qualified_name
                    )));
                }
            }
        }

        let cast_target = (declaring != target).then_some(declaring);
        Ok((path.navigation, cast_target))
    }

    /// Finds a navigation declared on a type or its ancestors.
    fn find_navigation(
        &self,
        start: TypeId,
        name: &str,
    ) -> Option<(TypeId, &'t NavigationPropertyDecl)> {
        self.entities.self_and_ancestors(start).find_map(|candidate| {
            self.symbols.entity_types()[candidate.as_usize()]
                .decl
                .navigation_properties
                .iter()
                .find(|navigation| navigation.name == name)
                .map(|navigation| (candidate, navigation))
        })
    }

    /// Concrete transitive descendants of a target type.
    fn casts(&self, target: TypeId) -> Vec<TypeId> {
        let entity_types = self.symbols.entity_types();
        self.entities
            .descendants(target)
            .iter()
            .copied()
            .filter(|descendant| !entity_types[descendant.as_usize()].decl.is_abstract)
            .collect()
    }

    fn qualified_name(&self, id: TypeId) -> &SmolStr {
        &self.symbols.entity_types()[id.as_usize()].qualified_name
    }
}

/// Resolves the navigation properties of every entity type.
///
/// The result is indexed by entity [`TypeId`]; each inner list follows
/// declaration order and only holds successfully resolved edges.
pub(crate) fn run_navigation_resolution<'t>(
    symbols: &SymbolTable<'t>,
    entities: &InheritanceGraph,
    errors: &mut Vec<DigestError>,
) -> Vec<Vec<ResolvedNavigation<'t>>> {
    let resolver = NavigationResolver::new(symbols, entities, errors);

    let navigations: Vec<Vec<ResolvedNavigation<'t>>> = symbols
        .entity_types()
        .iter()
        .enumerate()
        .map(|(index, entity)| {
            entity
                .decl
                .navigation_properties
                .iter()
                .filter_map(|decl| resolver.resolve(TypeId::new(index), decl, errors))
                .collect()
        })
        .collect();

    debug!(
        dialect = %symbols.dialect(),
        associations = resolver.associations.len(),
        edges = navigations.iter().map(Vec::len).sum::<usize>(),
        errors = errors.len(),
        "navigation resolution finished"
    );

    navigations
}
