//! Digestion errors and their lowering into [`Diag`]s.

use crate::diag::Diag;
use crate::metadata::Dialect;
use smol_str::SmolStr;
use thiserror::Error;

/// Categories of digestion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestErrorKind {
    /// A type reference names no declared type.
    UnresolvedTypeReference,

    /// The base-type relation contains a cycle.
    CyclicInheritance,

    /// A navigation property's target cannot be found.
    NavigationTargetNotFound,

    /// Two navigation properties disagree about being partners.
    InconsistentPartner,

    /// Two canonical identifiers collide within one emission scope.
    DuplicateIdentifier,

    /// An entity type lacks a usable key.
    MissingKeyProperty,

    /// An association end declares an unknown multiplicity.
    InvalidMultiplicity,

    /// Two declarations share a qualified name.
    DuplicateDeclaration,

    /// A relationship uses the form of the other dialect.
    DialectMismatch,

    /// An association is structurally broken.
    MalformedAssociation,

    /// An enum type has a non-integral underlying type.
    InvalidEnumType,
}

impl DigestErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::UnresolvedTypeReference => "UnresolvedTypeReference",
            Self::CyclicInheritance => "CyclicInheritance",
            Self::NavigationTargetNotFound => "NavigationTargetNotFound",
            Self::InconsistentPartner => "InconsistentPartner",
            Self::DuplicateIdentifier => "DuplicateIdentifier",
            Self::MissingKeyProperty => "MissingKeyProperty",
            Self::InvalidMultiplicity => "InvalidMultiplicity",
            Self::DuplicateDeclaration => "DuplicateDeclaration",
            Self::DialectMismatch => "DialectMismatch",
            Self::MalformedAssociation => "MalformedAssociation",
            Self::InvalidEnumType => "InvalidEnumType",
        }
    }

    /// Returns the diagnostic code for this error kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::UnresolvedTypeReference => "digest::unresolved_type_reference",
            Self::CyclicInheritance => "digest::cyclic_inheritance",
            Self::NavigationTargetNotFound => "digest::navigation_target_not_found",
            Self::InconsistentPartner => "digest::inconsistent_partner",
            Self::DuplicateIdentifier => "digest::duplicate_identifier",
            Self::MissingKeyProperty => "digest::missing_key_property",
            Self::InvalidMultiplicity => "digest::invalid_multiplicity",
            Self::DuplicateDeclaration => "digest::duplicate_declaration",
            Self::DialectMismatch => "digest::dialect_mismatch",
            Self::MalformedAssociation => "digest::malformed_association",
            Self::InvalidEnumType => "digest::invalid_enum_type",
        }
    }
}

/// A hard failure found while digesting a metadata tree.
///
/// Every variant carries enough context to produce an actionable message
/// without re-inspecting the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("unresolved type reference '{type_name}' in {context}")]
    UnresolvedTypeReference {
        /// The wire type reference as written.
        type_name: SmolStr,
        /// Declaring context, e.g. "property 'NS.Product.Supplier'".
        context: String,
    },

    #[error("cyclic inheritance between {}", .members.join(" -> "))]
    CyclicInheritance {
        /// Qualified names of the cycle members, in base-type order.
        members: Vec<SmolStr>,
    },

    #[error("navigation property '{navigation}' on '{owner}' has no target: {reason}")]
    NavigationTargetNotFound {
        owner: SmolStr,
        navigation: SmolStr,
        reason: String,
    },

    #[error(
        "navigation property '{navigation}' on '{owner}' and its partner '{partner}' on '{target}' are inconsistent: {reason}"
    )]
    InconsistentPartner {
        owner: SmolStr,
        navigation: SmolStr,
        target: SmolStr,
        partner: SmolStr,
        reason: String,
    },

    #[error("duplicate identifier '{identifier}' in {scope}: '{first}' and '{second}'")]
    DuplicateIdentifier {
        /// Emission scope, e.g. "properties of 'NS.Product'".
        scope: String,
        /// The colliding canonical identifier.
        identifier: SmolStr,
        /// Wire name of the first claimant.
        first: SmolStr,
        /// Wire name of the second claimant.
        second: SmolStr,
    },

    #[error("{}", missing_key_message(.entity, .key.as_deref(), .endpoint.as_deref()))]
    MissingKeyProperty {
        entity: SmolStr,
        /// Key name that does not match a property, if that is the problem.
        key: Option<SmolStr>,
        /// Entity set or singleton that requires the key, if any.
        endpoint: Option<SmolStr>,
    },

    #[error("association '{relationship}' role '{role}' has invalid multiplicity '{multiplicity}'")]
    InvalidMultiplicity {
        relationship: SmolStr,
        role: SmolStr,
        multiplicity: SmolStr,
    },

    #[error("duplicate declaration of '{name}' in {scope}")]
    DuplicateDeclaration { scope: String, name: SmolStr },

    #[error(
        "navigation property '{navigation}' on '{owner}' does not use the {dialect} relationship form"
    )]
    DialectMismatch {
        owner: SmolStr,
        navigation: SmolStr,
        dialect: Dialect,
    },

    #[error("association '{relationship}' is malformed: {reason}")]
    MalformedAssociation {
        relationship: SmolStr,
        reason: String,
    },

    #[error("enum type '{enum_type}' has non-integral underlying type '{underlying}'")]
    InvalidEnumType {
        enum_type: SmolStr,
        underlying: SmolStr,
    },
}

fn missing_key_message(entity: &str, key: Option<&str>, endpoint: Option<&str>) -> String {
    match (key, endpoint) {
        (Some(key), _) => format!(
            "entity type '{entity}' declares key '{key}' which is not one of its properties"
        ),
        (None, Some(endpoint)) => {
            format!("entity type '{entity}' is exposed by '{endpoint}' but has no key property")
        }
        (None, None) => format!("entity type '{entity}' has no key property"),
    }
}

impl DigestError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> DigestErrorKind {
        match self {
            Self::UnresolvedTypeReference { .. } => DigestErrorKind::UnresolvedTypeReference,
            Self::CyclicInheritance { .. } => DigestErrorKind::CyclicInheritance,
            Self::NavigationTargetNotFound { .. } => DigestErrorKind::NavigationTargetNotFound,
            Self::InconsistentPartner { .. } => DigestErrorKind::InconsistentPartner,
            Self::DuplicateIdentifier { .. } => DigestErrorKind::DuplicateIdentifier,
            Self::MissingKeyProperty { .. } => DigestErrorKind::MissingKeyProperty,
            Self::InvalidMultiplicity { .. } => DigestErrorKind::InvalidMultiplicity,
            Self::DuplicateDeclaration { .. } => DigestErrorKind::DuplicateDeclaration,
            Self::DialectMismatch { .. } => DigestErrorKind::DialectMismatch,
            Self::MalformedAssociation { .. } => DigestErrorKind::MalformedAssociation,
            Self::InvalidEnumType { .. } => DigestErrorKind::InvalidEnumType,
        }
    }

    /// Converts this error to a diagnostic.
    pub fn to_diag(&self) -> Diag {
        let diag = Diag::error(self.to_string()).with_code(self.kind().code());

        match self {
            Self::UnresolvedTypeReference { .. } => {
                diag.with_help("declare the referenced type or correct the reference")
            }
            Self::CyclicInheritance { members } => diag
                .with_help("remove one of the base type references in the cycle")
                .with_note(format!("{} types take part in the cycle", members.len())),
            Self::NavigationTargetNotFound { .. } => {
                diag.with_help("the target entity type must be declared in the metadata")
            }
            Self::InconsistentPartner { .. } => {
                diag.with_help("partners must name each other or leave the partner unset")
            }
            Self::DuplicateIdentifier { .. } => diag
                .with_help("add a naming override for one of the colliding names")
                .with_note("colliding identifiers are never renamed automatically"),
            Self::MissingKeyProperty { .. } => {
                diag.with_help("declare a key on the entity type or one of its ancestors")
            }
            Self::InvalidMultiplicity { .. } => {
                diag.with_help("valid multiplicities are '1', '0..1' and '*'")
            }
            Self::DuplicateDeclaration { .. } => diag,
            Self::DialectMismatch { dialect, .. } => match dialect {
                Dialect::V2 => diag.with_help("V2 navigation properties reference an association"),
                Dialect::V4 => diag.with_help("V4 navigation properties declare their target type"),
            },
            Self::MalformedAssociation { .. } => {
                diag.with_help("an association declares exactly two uniquely named roles")
            }
            Self::InvalidEnumType { .. } => diag.with_help(
                "use Edm.Byte, Edm.SByte, Edm.Int16, Edm.Int32 or Edm.Int64 as underlying type",
            ),
        }
    }
}

/// Lowers a batch of errors into diagnostics.
pub fn errors_to_diags(errors: &[DigestError]) -> Vec<Diag> {
    errors.iter().map(DigestError::to_diag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_members() {
        let error = DigestError::CyclicInheritance {
            members: vec!["NS.A".into(), "NS.B".into(), "NS.A".into()],
        };
        assert_eq!(
            error.to_string(),
            "cyclic inheritance between NS.A -> NS.B -> NS.A"
        );
        assert_eq!(error.kind(), DigestErrorKind::CyclicInheritance);
    }

    #[test]
    fn missing_key_messages() {
        let unknown_key = DigestError::MissingKeyProperty {
            entity: "NS.Product".into(),
            key: Some("Code".into()),
            endpoint: None,
        };
        assert!(unknown_key.to_string().contains("declares key 'Code'"));

        let no_key = DigestError::MissingKeyProperty {
            entity: "NS.Product".into(),
            key: None,
            endpoint: Some("Products".into()),
        };
        assert!(no_key.to_string().contains("exposed by 'Products'"));
    }

    #[test]
    fn to_diag_carries_code_and_help() {
        let error = DigestError::DuplicateIdentifier {
            scope: "navigation properties of 'NS.Person'".into(),
            identifier: "friends".into(),
            first: "Friends".into(),
            second: "friends".into(),
        };
        let diag = error.to_diag();
        assert!(diag.is_error());
        assert_eq!(diag.code.as_deref(), Some("digest::duplicate_identifier"));
        assert!(diag.help.is_some());
        assert!(diag.message.contains("'Friends' and 'friends'"));
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            DigestErrorKind::UnresolvedTypeReference.name(),
            "UnresolvedTypeReference"
        );
        assert_eq!(
            DigestErrorKind::InvalidMultiplicity.code(),
            "digest::invalid_multiplicity"
        );
    }
}
