//! Metadata digestion for OData-style data services.
//!
//! This library turns a service's metadata tree, in either relationship
//! dialect, into a canonical and validated data model for code emitters.
//! Failures are reported as [`DigestError`]s that lower into miette
//! diagnostics for rendering.
//!
//! # Example
//!
//! ```
//! use edm_digest::metadata::{
//!     AssociationDecl, Dialect, EntityTypeDecl, MetadataTree, NavigationPropertyDecl,
//!     PropertyDecl, SchemaDecl,
//! };
//! use edm_digest::{NamingOverrides, assemble};
//!
//! let tree = MetadataTree::new(Dialect::V2).with_schema(
//!     SchemaDecl::new("Shop")
//!         .with_entity_type(
//!             EntityTypeDecl::new("Category")
//!                 .with_key("ID")
//!                 .with_property(PropertyDecl::required("ID", "Edm.Int32"))
//!                 .with_navigation(NavigationPropertyDecl::association(
//!                     "Products", "Shop.CategoryProduct", "Category", "Product",
//!                 )),
//!         )
//!         .with_entity_type(
//!             EntityTypeDecl::new("Product")
//!                 .with_key("ID")
//!                 .with_property(PropertyDecl::required("ID", "Edm.Int32")),
//!         )
//!         .with_association(
//!             AssociationDecl::new("CategoryProduct")
//!                 .with_end("Category", "Shop.Category", "1")
//!                 .with_end("Product", "Shop.Product", "*"),
//!         ),
//! );
//!
//! let model = assemble(&tree, &NamingOverrides::default()).unwrap();
//! let category = model.entity_type("Shop.Category").unwrap();
//! assert!(category.navigation("Products").unwrap().is_collection);
//! ```

pub mod diag;
pub mod ir;
pub mod metadata;
pub mod semantic;

// Re-export the diagnostic model.
pub use diag::{Diag, DiagSeverity, convert_diag_to_report, convert_diagnostics_to_reports};

// Re-export the model and the assembler entry points.
pub use ir::{DataModel, DigestOutcome, DigestResult};
pub use metadata::{Dialect, MetadataTree};
pub use semantic::{
    DigestConfig, DigestError, DigestErrorKind, ModelAssembler, NamingOverrides, assemble,
};
