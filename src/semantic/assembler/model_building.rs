//! Turns the outputs of the resolution phases into descriptors.

use crate::ir::descriptors::{
    ComplexTypeDescriptor, EntitySetModel, EntityTypeDescriptor, EnumMemberDescriptor,
    EnumTypeDescriptor, NavigationPropertyDescriptor, OperationDescriptor, ParameterDescriptor,
    PropertyDescriptor, SingletonModel,
};
use crate::ir::symbol_table::SymbolTable;
use crate::ir::types::TypeId;
use crate::ir::{DataModel, ModelParts};
use crate::metadata::EnumMemberDecl;
use crate::semantic::inheritance::ResolvedInheritance;
use crate::semantic::naming::CanonicalNames;
use crate::semantic::navigation::ResolvedNavigation;
use crate::semantic::type_resolver::{ResolvedProperty, ResolvedTypes};
use smol_str::SmolStr;

pub(super) fn build_model(
    symbols: &SymbolTable<'_>,
    types: ResolvedTypes<'_>,
    inheritance: &ResolvedInheritance,
    navigations: Vec<Vec<ResolvedNavigation<'_>>>,
    names: CanonicalNames,
) -> DataModel {
    let CanonicalNames {
        entity_types: entity_type_names,
        entity_properties: entity_property_names,
        entity_navigations: entity_navigation_names,
        complex_types: complex_type_names,
        complex_properties: complex_property_names,
        enum_types: enum_type_names,
        enum_members: enum_member_names,
        entity_sets: entity_set_names,
        singletons: singleton_names,
        operations: operation_names,
        parameters: parameter_names,
    } = names;

    let entity_keys = effective_keys(symbols, inheritance);

    let entity_navigations: Vec<Vec<NavigationPropertyDescriptor>> = navigations
        .into_iter()
        .zip(entity_navigation_names)
        .map(|(edges, edge_names)| navigations_of(edges, edge_names))
        .collect();

    let entity_types = symbols
        .entity_types()
        .iter()
        .zip(entity_type_names)
        .zip(types.entity_properties.iter().zip(entity_property_names))
        .zip(entity_navigations)
        .enumerate()
        .map(|(index, (((entity, canonical_name), (properties, property_names)), edges))| {
            let id = TypeId::new(index);
            let keys = entity_keys[index].clone();
            EntityTypeDescriptor {
                id,
                qualified_name: entity.qualified_name.clone(),
                namespace: entity.namespace.clone(),
                name: entity.decl.name.clone(),
                canonical_name,
                base_type: types.entity_bases[index],
                is_abstract: entity.decl.is_abstract,
                is_open: entity.decl.is_open,
                properties: properties_of(properties, property_names, &keys),
                navigation_properties: edges,
                keys,
                ancestors: inheritance.entities.ancestors(id).to_vec(),
                descendants: inheritance.entities.descendants(id).to_vec(),
            }
        })
        .collect();

    let complex_types = symbols
        .complex_types()
        .iter()
        .zip(complex_type_names)
        .zip(types.complex_properties.iter().zip(complex_property_names))
        .enumerate()
        .map(|(index, ((complex, canonical_name), (properties, property_names)))| {
            let id = TypeId::new(index);
            ComplexTypeDescriptor {
                id,
                qualified_name: complex.qualified_name.clone(),
                namespace: complex.namespace.clone(),
                name: complex.decl.name.clone(),
                canonical_name,
                base_type: types.complex_bases[index],
                is_abstract: complex.decl.is_abstract,
                is_open: complex.decl.is_open,
                properties: properties_of(properties, property_names, &[]),
                ancestors: inheritance.complexes.ancestors(id).to_vec(),
                descendants: inheritance.complexes.descendants(id).to_vec(),
            }
        })
        .collect();

    let enum_types = symbols
        .enum_types()
        .iter()
        .zip(enum_type_names)
        .zip(enum_member_names)
        .enumerate()
        .map(|(index, ((enumeration, canonical_name), member_names))| EnumTypeDescriptor {
            id: TypeId::new(index),
            qualified_name: enumeration.qualified_name.clone(),
            namespace: enumeration.namespace.clone(),
            name: enumeration.decl.name.clone(),
            canonical_name,
            underlying_type: types.enum_underlying[index],
            is_flags: enumeration.decl.is_flags,
            members: members_of(&enumeration.decl.members, member_names),
        })
        .collect();

    let entity_sets = types
        .entity_sets
        .iter()
        .zip(entity_set_names)
        .map(|(set, canonical_name)| EntitySetModel {
            name: set.name.clone(),
            canonical_name,
            container: set.container.clone(),
            entity_type: set.entity_type,
        })
        .collect();

    let singletons = types
        .singletons
        .iter()
        .zip(singleton_names)
        .map(|(singleton, canonical_name)| SingletonModel {
            name: singleton.name.clone(),
            canonical_name,
            container: singleton.container.clone(),
            entity_type: singleton.entity_type,
        })
        .collect();

    let operations = types
        .operations
        .into_iter()
        .zip(operation_names)
        .zip(parameter_names)
        .map(|((operation, canonical_name), parameter_names)| OperationDescriptor {
            name: operation.decl.name.clone(),
            canonical_name,
            container: operation.container,
            binding: operation.binding,
            parameters: operation
                .decl
                .parameters
                .iter()
                .zip(operation.parameter_types)
                .zip(parameter_names)
                .map(|((parameter, semantic_type), canonical_name)| ParameterDescriptor {
                    name: parameter.name.clone(),
                    canonical_name,
                    semantic_type,
                    required: !parameter.nullable,
                })
                .collect(),
            return_type: operation.return_type,
            side_effecting: operation.decl.side_effecting,
        })
        .collect();

    DataModel::new(ModelParts {
        dialect: symbols.dialect(),
        entity_types,
        complex_types,
        enum_types,
        entity_sets,
        singletons,
        operations,
    })
}

/// Own key, or the key of the nearest ancestor declaring one.
fn effective_keys(
    symbols: &SymbolTable<'_>,
    inheritance: &ResolvedInheritance,
) -> Vec<Vec<SmolStr>> {
    let declared = symbols.entity_types();
    (0..declared.len())
        .map(|index| {
            inheritance
                .entities
                .self_and_ancestors(TypeId::new(index))
                .map(|id| &declared[id.as_usize()].decl.keys)
                .find(|keys| !keys.is_empty())
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

fn properties_of(
    properties: &[ResolvedProperty<'_>],
    canonical_names: Vec<SmolStr>,
    keys: &[SmolStr],
) -> Vec<PropertyDescriptor> {
    properties
        .iter()
        .zip(canonical_names)
        .map(|(property, canonical_name)| PropertyDescriptor {
            name: property.decl.name.clone(),
            canonical_name,
            semantic_type: property.semantic_type,
            nullable: property.decl.nullable,
            is_key: keys.contains(&property.decl.name),
        })
        .collect()
}

fn navigations_of(
    edges: Vec<ResolvedNavigation<'_>>,
    canonical_names: Vec<SmolStr>,
) -> Vec<NavigationPropertyDescriptor> {
    edges
        .into_iter()
        .zip(canonical_names)
        .map(|(edge, canonical_name)| NavigationPropertyDescriptor {
            name: edge.decl.name.clone(),
            canonical_name,
            target: edge.target,
            is_collection: edge.is_collection,
            nullable: edge.nullable,
            partner: edge.partner,
            cast_target: edge.cast_target,
            casts: edge.casts,
        })
        .collect()
}

/// Members without an explicit value take the previous value plus one.
fn members_of(
    members: &[EnumMemberDecl],
    canonical_names: Vec<SmolStr>,
) -> Vec<EnumMemberDescriptor> {
    let mut next = 0i64;
    members
        .iter()
        .zip(canonical_names)
        .map(|(member, canonical_name)| {
            let value = member.value.unwrap_or(next);
            next = value.saturating_add(1);
            EnumMemberDescriptor {
                name: member.name.clone(),
                canonical_name,
                value,
            }
        })
        .collect()
}
