//! Final validation over the assembled model.
//!
//! Checks that need the whole model at once:
//! - key properties exist, and every set or singleton target has a key
//! - each entity type's function namespace (navigations, casts, bound operations)
//! - the service namespace (entity sets, singletons, unbound operations)

use crate::ir::descriptors::OperationBinding;
use crate::ir::types::TypeId;
use crate::ir::DataModel;
use crate::semantic::assembler::DigestConfig;
use crate::semantic::diag::DigestError;
use crate::semantic::naming::{NamingResolver, ScopeEntry, check_unique};
use smol_str::SmolStr;
use std::collections::HashSet;
use tracing::debug;

pub(super) fn run_model_validation(
    model: &DataModel,
    config: &DigestConfig,
    naming: &NamingResolver<'_>,
    errors: &mut Vec<DigestError>,
) {
    check_keys(model, config, errors);
    check_function_namespaces(model, naming, errors);
    check_service_namespace(model, errors);

    debug!(errors = errors.len(), "model validation finished");
}

fn check_keys(model: &DataModel, config: &DigestConfig, errors: &mut Vec<DigestError>) {
    for entity in model.entity_types() {
        // Inherited keys are checked on the ancestor declaring them.
        if entity.base_type.is_some() && !entity.keys.is_empty() {
            let inherited = model
                .ancestors(entity.id)
                .any(|ancestor| ancestor.keys == entity.keys);
            if inherited {
                continue;
            }
        }

        let properties = model.all_properties(entity.id);
        for key in &entity.keys {
            if !properties.iter().any(|property| property.name == *key) {
                errors.push(DigestError::MissingKeyProperty {
                    entity: entity.qualified_name.clone(),
                    key: Some(key.clone()),
                    endpoint: None,
                });
            }
        }
    }

    if !config.require_keys_for_sets {
        return;
    }

    let endpoints = model
        .entity_sets()
        .iter()
        .map(|set| (&set.name, set.entity_type))
        .chain(
            model
                .singletons()
                .iter()
                .map(|singleton| (&singleton.name, singleton.entity_type)),
        );
    for (endpoint, entity_type) in endpoints {
        let entity = model.entity(entity_type);
        if entity.keys.is_empty() {
            errors.push(DigestError::MissingKeyProperty {
                entity: entity.qualified_name.clone(),
                key: None,
                endpoint: Some(endpoint.clone()),
            });
        }
    }
}

/// Navigation and cast functions plus bound operations are emitted as one
/// flat set per entity type.
fn check_function_namespaces(
    model: &DataModel,
    naming: &NamingResolver<'_>,
    errors: &mut Vec<DigestError>,
) {
    for entity in model.entity_types() {
        let mut entries: Vec<(SmolStr, SmolStr, bool)> = Vec::new();

        let inherited: Vec<TypeId> = entity.ancestors.iter().rev().copied().collect();
        for owner in inherited.iter().copied().chain(std::iter::once(entity.id)) {
            let own = owner == entity.id;
            for navigation in &model.entity(owner).navigation_properties {
                entries.push((
                    navigation.name.clone(),
                    navigation.canonical_name.clone(),
                    own,
                ));
            }
            // Overloads share a wire name and are one function.
            let mut seen = HashSet::new();
            for operation in model.bound_operations(owner) {
                if seen.insert(&operation.name) {
                    entries.push((
                        operation.name.clone(),
                        operation.canonical_name.clone(),
                        own,
                    ));
                }
            }
        }

        for descendant in model.descendants(entity.id) {
            if !descendant.is_abstract {
                entries.push((
                    descendant.qualified_name.clone(),
                    naming.cast_name(&descendant.canonical_name),
                    true,
                ));
            }
        }

        // Own entries go last so every collision involving one is reported here.
        entries.sort_by_key(|(_, _, own)| *own);
        check_unique(
            &format!("functions of '{}'", entity.qualified_name),
            entries.iter().map(|(wire, canonical, own)| ScopeEntry {
                wire,
                canonical,
                reportable: *own,
            }),
            errors,
        );
    }
}

fn check_service_namespace(model: &DataModel, errors: &mut Vec<DigestError>) {
    let mut seen_operations = HashSet::new();
    let unbound = model
        .operations()
        .iter()
        .filter(|operation| operation.binding == OperationBinding::Unbound)
        .filter(|operation| seen_operations.insert(&operation.name));

    let entries: Vec<ScopeEntry<'_>> = model
        .entity_sets()
        .iter()
        .map(|set| (&set.name, &set.canonical_name))
        .chain(
            model
                .singletons()
                .iter()
                .map(|singleton| (&singleton.name, &singleton.canonical_name)),
        )
        .chain(unbound.map(|operation| (&operation.name, &operation.canonical_name)))
        .map(|(wire, canonical)| ScopeEntry {
            wire,
            canonical,
            reportable: true,
        })
        .collect();

    check_unique("service endpoints", entries, errors);
}
