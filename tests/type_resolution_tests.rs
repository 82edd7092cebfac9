//! Type resolution tests.
//!
//! Covers the primitive table, declared type lookup through namespaces and
//! aliases, type definitions, enum underlying types and the rule that entity
//! types never appear in structural positions.

mod common;

use common::{error_kinds, expect_errors, trippin_v4};
use edm_digest::ir::{PRIMITIVE_TYPES, PrimitiveType, SymbolTable, TypeKind};
use edm_digest::metadata::{
    ComplexTypeDecl, ContainerDecl, Dialect, EntityTypeDecl, EnumTypeDecl, MetadataTree,
    OperationDecl, ParameterDecl, PropertyDecl, SchemaDecl, TypeDefinitionDecl,
};
use edm_digest::semantic::{
    DigestError, DigestErrorKind, NamingOverrides, ReferenceSite, TypePosition, TypeResolver,
    assemble,
};
use proptest::prelude::*;

fn structural(namespace: &str) -> ReferenceSite<'_> {
    ReferenceSite {
        namespace,
        position: TypePosition::Structural,
        context: "property 'NS.Thing.Value'",
    }
}

fn thing_with(property_type: &str) -> MetadataTree {
    MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS").with_entity_type(
            EntityTypeDecl::new("Thing")
                .with_key("Id")
                .with_property(PropertyDecl::required("Id", "Edm.Int32"))
                .with_property(PropertyDecl::new("Value", property_type)),
        ),
    )
}

// ===== Primitive Types =====

#[test]
fn every_primitive_resolves_in_both_shapes() {
    let tree = MetadataTree::new(Dialect::V4);
    let (symbols, errors) = SymbolTable::build(&tree);
    assert!(errors.is_empty());
    let resolver = TypeResolver::new(&symbols);

    for (wire, primitive) in PRIMITIVE_TYPES {
        let single = resolver.resolve(wire, structural("NS")).unwrap();
        assert_eq!(single.kind, TypeKind::Primitive(*primitive));
        assert!(!single.is_collection);

        let collection = resolver
            .resolve(&format!("Collection({wire})"), structural("NS"))
            .unwrap();
        assert_eq!(collection.kind, TypeKind::Primitive(*primitive));
        assert!(collection.is_collection);
    }
}

#[test]
fn spatial_and_legacy_names_are_primitives() {
    let tree = MetadataTree::new(Dialect::V2);
    let (symbols, _) = SymbolTable::build(&tree);
    let resolver = TypeResolver::new(&symbols);

    let point = resolver
        .resolve("Edm.GeographyPoint", structural("NS"))
        .unwrap();
    assert_eq!(point.primitive(), Some(PrimitiveType::Spatial));

    let time = resolver.resolve("Edm.Time", structural("NS")).unwrap();
    assert_eq!(time.primitive(), Some(PrimitiveType::Duration));

    let date_time = resolver.resolve("Edm.DateTime", structural("NS")).unwrap();
    assert_eq!(date_time.primitive(), Some(PrimitiveType::DateTime));
}

proptest! {
    /// Lookup in the primitive table is total: every name either resolves or
    /// yields an UnresolvedTypeReference, never a panic.
    #[test]
    fn primitive_lookup_is_total(suffix in "[A-Za-z][A-Za-z0-9]{0,16}") {
        let tree = MetadataTree::new(Dialect::V4);
        let (symbols, _) = SymbolTable::build(&tree);
        let resolver = TypeResolver::new(&symbols);
        let wire = format!("Edm.{suffix}");

        match resolver.resolve(&wire, structural("NS")) {
            Ok(resolved) => {
                prop_assert_eq!(resolved.primitive(), PrimitiveType::from_wire(&wire));
            }
            Err(error) => {
                prop_assert_eq!(error.kind(), DigestErrorKind::UnresolvedTypeReference);
                prop_assert!(PrimitiveType::from_wire(&wire).is_none());
            }
        }
    }
}

// ===== Declared Types =====

#[test]
fn unknown_edm_name_is_unresolved() {
    let errors = expect_errors(&thing_with("Edm.Money"), &NamingOverrides::default());
    assert_eq!(
        errors,
        vec![DigestError::UnresolvedTypeReference {
            type_name: "Edm.Money".into(),
            context: "property 'NS.Thing.Value'".into(),
        }]
    );
}

#[test]
fn every_unresolved_reference_of_a_phase_is_reported() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_entity_type(
                EntityTypeDecl::new("Thing")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32"))
                    .with_property(PropertyDecl::new("A", "NS.Missing"))
                    .with_property(PropertyDecl::new("B", "Collection(Other.Missing)")),
            )
            .with_complex_type(
                ComplexTypeDecl::new("Shape").with_property(PropertyDecl::new("C", "Missing")),
            ),
    );

    let errors = expect_errors(&tree, &NamingOverrides::default());
    assert_eq!(
        error_kinds(&errors),
        vec![DigestErrorKind::UnresolvedTypeReference; 3],
        "{errors:?}"
    );
    let names: Vec<String> = errors
        .iter()
        .map(|error| match error {
            DigestError::UnresolvedTypeReference { type_name, .. } => type_name.to_string(),
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(
        names,
        vec!["NS.Missing", "Collection(Other.Missing)", "Missing"]
    );
}

#[test]
fn entity_type_in_property_position_is_rejected() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_entity_type(
                EntityTypeDecl::new("Owner")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32")),
            )
            .with_entity_type(
                EntityTypeDecl::new("Thing")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32"))
                    .with_property(PropertyDecl::new("Owner", "NS.Owner")),
            ),
    );

    let errors = expect_errors(&tree, &NamingOverrides::default());
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        DigestError::UnresolvedTypeReference { type_name, context } => {
            assert_eq!(type_name, "NS.Owner");
            assert!(
                context.contains("entity types cannot be property types"),
                "{context}"
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn entity_types_are_allowed_in_operations() {
    let model = common::assemble_cleanly(&trippin_v4(), &NamingOverrides::default());
    let airport = model
        .entity_type("Microsoft.OData.SampleService.Models.TripPin.Airport")
        .unwrap();

    let nearest = model.operation("GetNearestAirport").unwrap();
    let return_type = nearest.return_type.unwrap();
    assert_eq!(return_type.kind, TypeKind::Entity(airport.id));
    assert!(!return_type.is_collection);

    let involved = model.operation("GetInvolvedPeople").unwrap();
    assert!(involved.return_type.unwrap().is_collection);
}

#[test]
fn alias_and_unqualified_names_resolve_to_the_namespace() {
    let model = common::assemble_cleanly(&trippin_v4(), &NamingOverrides::default());
    let location = model
        .complex_type("Microsoft.OData.SampleService.Models.TripPin.Location")
        .unwrap();
    let city = model
        .complex_type("Microsoft.OData.SampleService.Models.TripPin.City")
        .unwrap();

    assert_eq!(
        location.property("City").unwrap().semantic_type.kind,
        TypeKind::Complex(city.id)
    );

    let person = model
        .entity_type("Microsoft.OData.SampleService.Models.TripPin.Person")
        .unwrap();
    let address_info = person.property("AddressInfo").unwrap().semantic_type;
    assert_eq!(address_info.kind, TypeKind::Complex(location.id));
    assert!(address_info.is_collection);
}

#[test]
fn type_definitions_resolve_to_their_underlying_primitive() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_type_definition(TypeDefinitionDecl::new("Email", "Edm.String"))
            .with_type_definition(TypeDefinitionDecl::new("Broken", "Edm.Nope"))
            .with_entity_type(
                EntityTypeDecl::new("Thing")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32"))
                    .with_property(PropertyDecl::new("Mail", "Collection(Email)")),
            ),
    );
    let (symbols, errors) = SymbolTable::build(&tree);
    assert!(errors.is_empty());
    let resolver = TypeResolver::new(&symbols);

    let mail = resolver
        .resolve("Collection(Email)", structural("NS"))
        .unwrap();
    assert_eq!(mail.primitive(), Some(PrimitiveType::Text));
    assert!(mail.is_collection);

    let broken = resolver.resolve("NS.Broken", structural("NS")).unwrap_err();
    assert!(matches!(
        broken,
        DigestError::UnresolvedTypeReference { ref type_name, .. } if type_name == "Edm.Nope"
    ));
}

fn bogus_definition_error() -> DigestError {
    DigestError::UnresolvedTypeReference {
        type_name: "Edm.Nope".into(),
        context: "type definition 'NS.Bogus'".into(),
    }
}

#[test]
fn unreferenced_broken_type_definition_fails_assembly() {
    let mut tree = thing_with("Edm.String");
    tree.schemas[0]
        .type_definitions
        .push(TypeDefinitionDecl::new("Bogus", "Edm.Nope"));

    let errors = expect_errors(&tree, &NamingOverrides::default());
    assert_eq!(errors, vec![bogus_definition_error()]);
}

#[test]
fn broken_type_definition_is_reported_once_across_references() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_type_definition(TypeDefinitionDecl::new("Bogus", "Edm.Nope"))
            .with_entity_type(
                EntityTypeDecl::new("Thing")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32"))
                    .with_property(PropertyDecl::new("A", "NS.Bogus"))
                    .with_property(PropertyDecl::new("B", "Collection(Bogus)")),
            )
            .with_container(
                ContainerDecl::new("Service")
                    .with_entity_set("Things", "NS.Thing")
                    .with_operation(
                        OperationDecl::function("Weigh")
                            .with_parameter(ParameterDecl::required("x", "NS.Bogus")),
                    ),
            ),
    );

    let errors = expect_errors(&tree, &NamingOverrides::default());
    assert_eq!(errors, vec![bogus_definition_error()]);
}

// ===== Enum Types =====

#[test]
fn enum_underlying_type_defaults_to_int32() {
    let model = common::assemble_cleanly(&trippin_v4(), &NamingOverrides::default());
    let gender = model
        .enum_type("Microsoft.OData.SampleService.Models.TripPin.PersonGender")
        .unwrap();
    assert_eq!(gender.underlying_type, PrimitiveType::Int32);
    let values: Vec<i64> = gender.members.iter().map(|member| member.value).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn non_integral_enum_underlying_type_is_rejected() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_enum_type(
                EnumTypeDecl::new("Ratio")
                    .with_underlying_type("Edm.Double")
                    .with_member("Half", Some(1)),
            )
            .with_enum_type(
                EnumTypeDecl::new("Flags")
                    .with_underlying_type("Edm.Byte")
                    .with_flags(true)
                    .with_member("A", Some(1))
                    .with_member("B", Some(2)),
            ),
    );

    let errors = assemble(&tree, &NamingOverrides::default()).unwrap_err();
    assert_eq!(
        errors,
        vec![DigestError::InvalidEnumType {
            enum_type: "NS.Ratio".into(),
            underlying: "Edm.Double".into(),
        }]
    );
}

// ===== Operations =====

#[test]
fn operation_parameters_and_bindings_resolve() {
    let tree = MetadataTree::new(Dialect::V4).with_schema(
        SchemaDecl::new("NS")
            .with_entity_type(
                EntityTypeDecl::new("Thing")
                    .with_key("Id")
                    .with_property(PropertyDecl::required("Id", "Edm.Int32")),
            )
            .with_container(
                ContainerDecl::new("Service")
                    .with_entity_set("Things", "NS.Thing")
                    .with_operation(
                        OperationDecl::action("Merge")
                            .bound_to("Collection(NS.Thing)")
                            .with_parameter(ParameterDecl::required("other", "NS.Thing"))
                            .with_parameter(ParameterDecl::optional("reason", "Edm.String")),
                    )
                    .with_operation(
                        OperationDecl::function("Broken")
                            .with_parameter(ParameterDecl::required("x", "NS.Nope")),
                    ),
            ),
    );

    let errors = expect_errors(&tree, &NamingOverrides::default());
    assert_eq!(
        error_kinds(&errors),
        vec![DigestErrorKind::UnresolvedTypeReference]
    );

    let mut tree = tree;
    if let Some(container) = tree.schemas[0].container.as_mut() {
        container
            .operations
            .retain(|operation| operation.name != "Broken");
    }
    let model = common::assemble_cleanly(&tree, &NamingOverrides::default());
    let merge = model.operation("Merge").unwrap();
    let thing = model.entity_type("NS.Thing").unwrap();

    assert!(merge.side_effecting);
    assert!(merge.return_type.is_none());
    assert_eq!(merge.binding.entity_type(), Some(thing.id));
    assert!(merge.parameters[0].required);
    assert!(!merge.parameters[1].required);
    assert_eq!(
        merge.parameters[0].semantic_type.kind,
        TypeKind::Entity(thing.id)
    );
}
