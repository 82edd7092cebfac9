//! Resolution of metadata trees into data models.
//!
//! This module turns a raw [`MetadataTree`](crate::metadata::MetadataTree)
//! into a validated [`DataModel`](crate::ir::DataModel):
//! - Type references resolved against primitives and declared types
//! - Inheritance graphs with ancestor and descendant closures
//! - Both relationship dialects normalized into one navigation edge form
//! - Override-aware, collision-free canonical identifiers
//!
//! # Architecture
//!
//! The [`ModelAssembler`] runs the resolvers as phases, in dependency order:
//!
//! 1. **Declarations** - Index declared types, associations and endpoints
//! 2. **Types** - Resolve property, parameter, return and base type references
//! 3. **Inheritance** - Detect cycles, compute closures
//! 4. **Navigation** - Join associations (V2) or check partners (V4), compute casts
//! 5. **Naming** - Assign canonical names, detect per-type collisions
//! 6. **Validation** - Check keys and the function and service namespaces
//!
//! Errors are collected within a phase. A failed phase stops assembly, so
//! later phases never run against unresolved input.
//!
//! # Example
//!
//! ```
//! use edm_digest::metadata::{Dialect, EntityTypeDecl, MetadataTree, PropertyDecl, SchemaDecl};
//! use edm_digest::semantic::{ModelAssembler, NamingOverrides};
//!
//! let tree = MetadataTree::new(Dialect::V4).with_schema(
//!     SchemaDecl::new("Demo").with_entity_type(
//!         EntityTypeDecl::new("Person")
//!             .with_key("UserName")
//!             .with_property(PropertyDecl::required("UserName", "Edm.String")),
//!     ),
//! );
//!
//! let model = ModelAssembler::new()
//!     .assemble(&tree, &NamingOverrides::default())
//!     .expect("tree is consistent");
//!
//! let person = model.entity_type("Demo.Person").unwrap();
//! assert_eq!(person.properties[0].canonical_name, "userName");
//! ```

pub mod assembler;
pub mod diag;
pub mod inheritance;
pub mod naming;
pub mod navigation;
pub mod overrides;
pub mod type_resolver;

pub use assembler::{DigestConfig, DigestPhase, ModelAssembler, assemble};
pub use diag::{DigestError, DigestErrorKind};
pub use inheritance::InheritanceGraph;
pub use naming::{NameCase, NamingConfig, NamingResolver};
pub use navigation::Multiplicity;
pub use overrides::{EntityOverrides, NamingOverrides};
pub use type_resolver::{ReferenceSite, TypePosition, TypeResolver};
