//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration tests.
//!
//! # Fixtures
//! - [`northwind_v2`] - V2 tree with associations, a composite key and a complex type
//! - [`trippin_v4`] - V4 tree with inheritance, enums, spatial types and operations
//! - [`load_fixture`] - Load a JSON metadata tree from `tests/fixtures`
//!
//! # Assembly Helpers
//! - [`assemble_cleanly`] - Assemble and panic with rendered errors on failure
//! - [`expect_errors`] - Assemble and return the errors, panicking on success
//! - [`error_kinds`] - Project errors onto their kinds

#![allow(dead_code)]

use edm_digest::metadata::{
    AssociationDecl, ComplexTypeDecl, ContainerDecl, Dialect, EntityTypeDecl, EnumTypeDecl,
    MetadataTree, NavigationPropertyDecl, OperationDecl, ParameterDecl, PropertyDecl, SchemaDecl,
};
use edm_digest::semantic::{DigestError, DigestErrorKind, ModelAssembler, NamingOverrides};
use edm_digest::{DataModel, convert_diagnostics_to_reports};
use edm_digest::semantic::diag::errors_to_diags;

// ============================================================================
// Assembly Helpers
// ============================================================================

/// Format errors as rendered diagnostics for assertion messages.
pub fn format_errors(errors: &[DigestError]) -> String {
    convert_diagnostics_to_reports(&errors_to_diags(errors))
        .iter()
        .map(|report| format!("{report:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble a tree, panicking with the rendered errors on failure.
pub fn assemble_cleanly(tree: &MetadataTree, overrides: &NamingOverrides) -> DataModel {
    match ModelAssembler::new().assemble(tree, overrides) {
        Ok(model) => model,
        Err(errors) => panic!("expected assembly to succeed:\n{}", format_errors(&errors)),
    }
}

/// Assemble a tree, expecting failure.
pub fn expect_errors(tree: &MetadataTree, overrides: &NamingOverrides) -> Vec<DigestError> {
    match ModelAssembler::new().assemble(tree, overrides) {
        Ok(_) => panic!("expected assembly to fail"),
        Err(errors) => errors,
    }
}

/// Kinds of a batch of errors, in report order.
pub fn error_kinds(errors: &[DigestError]) -> Vec<DigestErrorKind> {
    errors.iter().map(DigestError::kind).collect()
}

/// Load a JSON metadata tree from `tests/fixtures`.
pub fn load_fixture(name: &str) -> MetadataTree {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("failed to read {path}: {error}"));
    MetadataTree::from_json_str(&json)
        .unwrap_or_else(|error| panic!("failed to parse {path}: {error}"))
}

// ============================================================================
// V2 Fixture
// ============================================================================

fn association(name: &str, from: (&str, &str, &str), to: (&str, &str, &str)) -> AssociationDecl {
    AssociationDecl::new(name)
        .with_end(from.0, from.1, from.2)
        .with_end(to.0, to.1, to.2)
}

/// A Northwind-style V2 tree.
pub fn northwind_v2() -> MetadataTree {
    let schema = SchemaDecl::new("NorthwindModel")
        .with_complex_type(
            ComplexTypeDecl::new("Address")
                .with_property(PropertyDecl::new("Street", "Edm.String"))
                .with_property(PropertyDecl::new("City", "Edm.String"))
                .with_property(PropertyDecl::new("PostalCode", "Edm.String")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Category")
                .with_key("CategoryID")
                .with_property(PropertyDecl::required("CategoryID", "Edm.Int32"))
                .with_property(PropertyDecl::required("CategoryName", "Edm.String"))
                .with_property(PropertyDecl::new("Description", "Edm.String"))
                .with_property(PropertyDecl::new("Picture", "Edm.Binary"))
                .with_navigation(NavigationPropertyDecl::association(
                    "Products",
                    "NorthwindModel.FK_Products_Categories",
                    "Categories",
                    "Products",
                )),
        )
        .with_entity_type(
            EntityTypeDecl::new("Product")
                .with_key("ProductID")
                .with_property(PropertyDecl::required("ProductID", "Edm.Int32"))
                .with_property(PropertyDecl::required("ProductName", "Edm.String"))
                .with_property(PropertyDecl::new("SupplierID", "Edm.Int32"))
                .with_property(PropertyDecl::new("CategoryID", "Edm.Int32"))
                .with_property(PropertyDecl::new("QuantityPerUnit", "Edm.String"))
                .with_property(PropertyDecl::new("UnitPrice", "Edm.Decimal"))
                .with_property(PropertyDecl::new("UnitsInStock", "Edm.Int16"))
                .with_property(PropertyDecl::required("Discontinued", "Edm.Boolean"))
                .with_navigation(NavigationPropertyDecl::association(
                    "Category",
                    "NorthwindModel.FK_Products_Categories",
                    "Products",
                    "Categories",
                ))
                .with_navigation(NavigationPropertyDecl::association(
                    "Supplier",
                    "NorthwindModel.FK_Products_Suppliers",
                    "Products",
                    "Suppliers",
                ))
                .with_navigation(NavigationPropertyDecl::association(
                    "Order_Details",
                    "NorthwindModel.FK_Order_Details_Products",
                    "Products",
                    "Order_Details",
                )),
        )
        .with_entity_type(
            EntityTypeDecl::new("Supplier")
                .with_key("SupplierID")
                .with_property(PropertyDecl::required("SupplierID", "Edm.Int32"))
                .with_property(PropertyDecl::required("CompanyName", "Edm.String"))
                .with_property(PropertyDecl::new("Address", "NorthwindModel.Address"))
                .with_navigation(NavigationPropertyDecl::association(
                    "Products",
                    "NorthwindModel.FK_Products_Suppliers",
                    "Suppliers",
                    "Products",
                )),
        )
        .with_entity_type(
            EntityTypeDecl::new("Order")
                .with_key("OrderID")
                .with_property(PropertyDecl::required("OrderID", "Edm.Int32"))
                .with_property(PropertyDecl::new("OrderDate", "Edm.DateTime"))
                .with_property(PropertyDecl::new("Freight", "Edm.Decimal"))
                .with_property(PropertyDecl::new("ShipAddress", "NorthwindModel.Address"))
                .with_navigation(NavigationPropertyDecl::association(
                    "Order_Details",
                    "NorthwindModel.FK_Order_Details_Orders",
                    "Orders",
                    "Order_Details",
                )),
        )
        .with_entity_type(
            EntityTypeDecl::new("Order_Detail")
                .with_key("OrderID")
                .with_key("ProductID")
                .with_property(PropertyDecl::required("OrderID", "Edm.Int32"))
                .with_property(PropertyDecl::required("ProductID", "Edm.Int32"))
                .with_property(PropertyDecl::required("UnitPrice", "Edm.Decimal"))
                .with_property(PropertyDecl::required("Quantity", "Edm.Int16"))
                .with_property(PropertyDecl::required("Discount", "Edm.Single"))
                .with_navigation(NavigationPropertyDecl::association(
                    "Order",
                    "NorthwindModel.FK_Order_Details_Orders",
                    "Order_Details",
                    "Orders",
                ))
                .with_navigation(NavigationPropertyDecl::association(
                    "Product",
                    "NorthwindModel.FK_Order_Details_Products",
                    "Order_Details",
                    "Products",
                )),
        )
        .with_association(association(
            "FK_Products_Categories",
            ("Categories", "NorthwindModel.Category", "0..1"),
            ("Products", "NorthwindModel.Product", "*"),
        ))
        .with_association(association(
            "FK_Products_Suppliers",
            ("Suppliers", "NorthwindModel.Supplier", "0..1"),
            ("Products", "NorthwindModel.Product", "*"),
        ))
        .with_association(association(
            "FK_Order_Details_Orders",
            ("Orders", "NorthwindModel.Order", "1"),
            ("Order_Details", "NorthwindModel.Order_Detail", "*"),
        ))
        .with_association(association(
            "FK_Order_Details_Products",
            ("Products", "NorthwindModel.Product", "1"),
            ("Order_Details", "NorthwindModel.Order_Detail", "*"),
        ))
        .with_container(
            ContainerDecl::new("NorthwindEntities")
                .with_entity_set("Categories", "NorthwindModel.Category")
                .with_entity_set("Products", "NorthwindModel.Product")
                .with_entity_set("Suppliers", "NorthwindModel.Supplier")
                .with_entity_set("Orders", "NorthwindModel.Order")
                .with_entity_set("Order_Details", "NorthwindModel.Order_Detail")
                .with_operation(
                    OperationDecl::function("TopProducts")
                        .with_parameter(ParameterDecl::required("count", "Edm.Int32"))
                        .returning("Collection(NorthwindModel.Product)"),
                ),
        );

    MetadataTree::new(Dialect::V2).with_schema(schema)
}

// ============================================================================
// V4 Fixture
// ============================================================================

fn nav(name: &str, type_name: &str) -> NavigationPropertyDecl {
    NavigationPropertyDecl::direct(name, type_name)
}

/// A TripPin-style V4 tree.
///
/// `PublicTransportation` is abstract, so `PlanItem`'s concrete descendants
/// are exactly `Flight` and `Event`.
pub fn trippin_v4() -> MetadataTree {
    let schema = SchemaDecl::new("Microsoft.OData.SampleService.Models.TripPin")
        .with_alias("Trippin")
        .with_enum_type(
            EnumTypeDecl::new("PersonGender")
                .with_member("Male", None)
                .with_member("Female", None)
                .with_member("Unknown", None),
        )
        .with_complex_type(
            ComplexTypeDecl::new("City")
                .with_property(PropertyDecl::new("CountryRegion", "Edm.String"))
                .with_property(PropertyDecl::new("Name", "Edm.String"))
                .with_property(PropertyDecl::new("Region", "Edm.String")),
        )
        .with_complex_type(
            ComplexTypeDecl::new("Location")
                .with_property(PropertyDecl::new("Address", "Edm.String"))
                .with_property(PropertyDecl::new("City", "Trippin.City")),
        )
        .with_complex_type(
            ComplexTypeDecl::new("EventLocation")
                .with_base_type("Trippin.Location")
                .with_property(PropertyDecl::new("BuildingInfo", "Edm.String")),
        )
        .with_complex_type(
            ComplexTypeDecl::new("AirportLocation")
                .with_base_type("Trippin.Location")
                .with_property(PropertyDecl::new("Loc", "Edm.GeographyPoint")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Photo")
                .with_key("Id")
                .with_property(PropertyDecl::required("Id", "Edm.Int64"))
                .with_property(PropertyDecl::new("Name", "Edm.String")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Person")
                .with_open(true)
                .with_key("UserName")
                .with_property(PropertyDecl::required("UserName", "Edm.String"))
                .with_property(PropertyDecl::required("FirstName", "Edm.String"))
                .with_property(PropertyDecl::required("LastName", "Edm.String"))
                .with_property(PropertyDecl::new("Emails", "Collection(Edm.String)"))
                .with_property(PropertyDecl::new("AddressInfo", "Collection(Trippin.Location)"))
                .with_property(PropertyDecl::new("Gender", "Trippin.PersonGender"))
                .with_property(PropertyDecl::required("Concurrency", "Edm.Int64"))
                .with_navigation(nav("Friends", "Collection(Trippin.Person)"))
                .with_navigation(nav("Trips", "Collection(Trippin.Trip)"))
                .with_navigation(nav("Photo", "Trippin.Photo")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Airline")
                .with_key("AirlineCode")
                .with_property(PropertyDecl::required("AirlineCode", "Edm.String"))
                .with_property(PropertyDecl::new("Name", "Edm.String")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Airport")
                .with_key("IcaoCode")
                .with_property(PropertyDecl::required("IcaoCode", "Edm.String"))
                .with_property(PropertyDecl::new("Name", "Edm.String"))
                .with_property(PropertyDecl::new("IataCode", "Edm.String"))
                .with_property(PropertyDecl::new("Location", "Trippin.AirportLocation")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Trip")
                .with_key("TripId")
                .with_property(PropertyDecl::required("TripId", "Edm.Int32"))
                .with_property(PropertyDecl::new("ShareId", "Edm.Guid"))
                .with_property(PropertyDecl::new("Description", "Edm.String"))
                .with_property(PropertyDecl::required("Name", "Edm.String"))
                .with_property(PropertyDecl::required("Budget", "Edm.Single"))
                .with_property(PropertyDecl::required("StartsAt", "Edm.DateTimeOffset"))
                .with_property(PropertyDecl::required("EndsAt", "Edm.DateTimeOffset"))
                .with_property(PropertyDecl::required("Tags", "Collection(Edm.String)"))
                .with_navigation(nav("Photos", "Collection(Trippin.Photo)"))
                .with_navigation(nav("PlanItems", "Collection(Trippin.PlanItem)")),
        )
        .with_entity_type(
            EntityTypeDecl::new("PlanItem")
                .with_key("PlanItemId")
                .with_property(PropertyDecl::required("PlanItemId", "Edm.Int32"))
                .with_property(PropertyDecl::new("ConfirmationCode", "Edm.String"))
                .with_property(PropertyDecl::new("StartsAt", "Edm.DateTimeOffset"))
                .with_property(PropertyDecl::new("EndsAt", "Edm.DateTimeOffset"))
                .with_property(PropertyDecl::new("Duration", "Edm.Duration")),
        )
        .with_entity_type(
            EntityTypeDecl::new("PublicTransportation")
                .with_base_type("Trippin.PlanItem")
                .with_abstract(true)
                .with_property(PropertyDecl::new("SeatNumber", "Edm.String")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Flight")
                .with_base_type("Trippin.PublicTransportation")
                .with_property(PropertyDecl::new("FlightNumber", "Edm.String"))
                .with_navigation(nav("From", "Trippin.Airport"))
                .with_navigation(nav("To", "Trippin.Airport"))
                .with_navigation(nav("Airline", "Trippin.Airline")),
        )
        .with_entity_type(
            EntityTypeDecl::new("Event")
                .with_base_type("Trippin.PlanItem")
                .with_property(PropertyDecl::new("EventLocation", "Trippin.EventLocation"))
                .with_property(PropertyDecl::new("Description", "Edm.String")),
        )
        .with_container(
            ContainerDecl::new("DefaultContainer")
                .with_entity_set("People", "Trippin.Person")
                .with_entity_set("Airlines", "Trippin.Airline")
                .with_entity_set("Airports", "Trippin.Airport")
                .with_entity_set("Photos", "Trippin.Photo")
                .with_singleton("Me", "Trippin.Person")
                .with_operation(
                    OperationDecl::function("GetNearestAirport")
                        .with_parameter(ParameterDecl::required("lat", "Edm.Double"))
                        .with_parameter(ParameterDecl::required("lon", "Edm.Double"))
                        .returning("Trippin.Airport"),
                )
                .with_operation(OperationDecl::action("ResetDataSource"))
                .with_operation(
                    OperationDecl::function("GetFavoriteAirline")
                        .bound_to("Trippin.Person")
                        .returning("Trippin.Airline"),
                )
                .with_operation(
                    OperationDecl::function("GetFriendsTrips")
                        .bound_to("Trippin.Person")
                        .with_parameter(ParameterDecl::required("userName", "Edm.String"))
                        .returning("Collection(Trippin.Trip)"),
                )
                .with_operation(
                    OperationDecl::function("GetInvolvedPeople")
                        .bound_to("Trippin.Trip")
                        .returning("Collection(Trippin.Person)"),
                )
                .with_operation(
                    OperationDecl::action("ShareTrip")
                        .bound_to("Trippin.Person")
                        .with_parameter(ParameterDecl::required("userName", "Edm.String"))
                        .with_parameter(ParameterDecl::required("tripId", "Edm.Int32")),
                ),
        );

    MetadataTree::new(Dialect::V4).with_schema(schema)
}

/// Replaces the entity type with the given local name in the first schema.
pub fn replace_entity(tree: &mut MetadataTree, entity: EntityTypeDecl) {
    let schema = &mut tree.schemas[0];
    if let Some(existing) = schema
        .entity_types
        .iter_mut()
        .find(|existing| existing.name == entity.name)
    {
        *existing = entity;
    } else {
        schema.entity_types.push(entity);
    }
}
