//! Semantic types and the fixed primitive type table.

use std::fmt;

/// Dense index of a declared type within its category arena
/// (entity, complex or enum types of a [`crate::ir::DataModel`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

impl TypeId {
    /// Creates a new type ID.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Semantic category of a wire primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Text (`Edm.String`).
    Text,

    /// Boolean (`Edm.Boolean`).
    Boolean,

    /// Unsigned 8-bit integer (`Edm.Byte`).
    UInt8,

    /// Signed 8-bit integer (`Edm.SByte`).
    Int8,

    /// 16-bit integer.
    Int16,

    /// 32-bit integer.
    Int32,

    /// 64-bit integer.
    Int64,

    /// Single precision float.
    Single,

    /// Double precision float.
    Double,

    /// Arbitrary precision decimal.
    Decimal,

    /// Calendar date without time.
    Date,

    /// Date and time without offset (V2 `Edm.DateTime`).
    DateTime,

    /// Date and time with offset.
    DateTimeOffset,

    /// Time of day.
    TimeOfDay,

    /// Duration (`Edm.Duration`, V2 `Edm.Time`).
    Duration,

    /// Binary data.
    Binary,

    /// Globally unique identifier.
    Guid,

    /// Media stream.
    Stream,

    /// Geography or geometry value.
    Spatial,
}

/// Wire name to semantic type mapping.
///
/// Both dialects share the table: names that only exist in one dialect never
/// appear in documents of the other.
pub const PRIMITIVE_TYPES: &[(&str, PrimitiveType)] = &[
    ("Edm.String", PrimitiveType::Text),
    ("Edm.Boolean", PrimitiveType::Boolean),
    ("Edm.Byte", PrimitiveType::UInt8),
    ("Edm.SByte", PrimitiveType::Int8),
    ("Edm.Int16", PrimitiveType::Int16),
    ("Edm.Int32", PrimitiveType::Int32),
    ("Edm.Int64", PrimitiveType::Int64),
    ("Edm.Single", PrimitiveType::Single),
    ("Edm.Double", PrimitiveType::Double),
    ("Edm.Decimal", PrimitiveType::Decimal),
    ("Edm.Date", PrimitiveType::Date),
    ("Edm.DateTime", PrimitiveType::DateTime),
    ("Edm.DateTimeOffset", PrimitiveType::DateTimeOffset),
    ("Edm.TimeOfDay", PrimitiveType::TimeOfDay),
    ("Edm.Time", PrimitiveType::Duration),
    ("Edm.Duration", PrimitiveType::Duration),
    ("Edm.Binary", PrimitiveType::Binary),
    ("Edm.Guid", PrimitiveType::Guid),
    ("Edm.Stream", PrimitiveType::Stream),
    ("Edm.Geography", PrimitiveType::Spatial),
    ("Edm.GeographyPoint", PrimitiveType::Spatial),
    ("Edm.GeographyLineString", PrimitiveType::Spatial),
    ("Edm.GeographyPolygon", PrimitiveType::Spatial),
    ("Edm.GeographyMultiPoint", PrimitiveType::Spatial),
    ("Edm.GeographyMultiLineString", PrimitiveType::Spatial),
    ("Edm.GeographyMultiPolygon", PrimitiveType::Spatial),
    ("Edm.GeographyCollection", PrimitiveType::Spatial),
    ("Edm.Geometry", PrimitiveType::Spatial),
    ("Edm.GeometryPoint", PrimitiveType::Spatial),
    ("Edm.GeometryLineString", PrimitiveType::Spatial),
    ("Edm.GeometryPolygon", PrimitiveType::Spatial),
    ("Edm.GeometryMultiPoint", PrimitiveType::Spatial),
    ("Edm.GeometryMultiLineString", PrimitiveType::Spatial),
    ("Edm.GeometryMultiPolygon", PrimitiveType::Spatial),
    ("Edm.GeometryCollection", PrimitiveType::Spatial),
];

impl PrimitiveType {
    /// Looks up a qualified wire name (`Edm.Int32`) in [`PRIMITIVE_TYPES`].
    pub fn from_wire(name: &str) -> Option<Self> {
        PRIMITIVE_TYPES
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|(_, primitive)| *primitive)
    }

    /// Returns true for integral types usable as enum underlying types.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::UInt8
                | PrimitiveType::Int8
                | PrimitiveType::Int16
                | PrimitiveType::Int32
                | PrimitiveType::Int64
        )
    }

    /// Returns true for date, time and duration types.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PrimitiveType::Date
                | PrimitiveType::DateTime
                | PrimitiveType::DateTimeOffset
                | PrimitiveType::TimeOfDay
                | PrimitiveType::Duration
        )
    }

    /// Returns a human-readable name for this type.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Text => "Text",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::UInt8 => "UInt8",
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::Single => "Single",
            PrimitiveType::Double => "Double",
            PrimitiveType::Decimal => "Decimal",
            PrimitiveType::Date => "Date",
            PrimitiveType::DateTime => "DateTime",
            PrimitiveType::DateTimeOffset => "DateTimeOffset",
            PrimitiveType::TimeOfDay => "TimeOfDay",
            PrimitiveType::Duration => "Duration",
            PrimitiveType::Binary => "Binary",
            PrimitiveType::Guid => "Guid",
            PrimitiveType::Stream => "Stream",
            PrimitiveType::Spatial => "Spatial",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a resolved type reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A primitive type (type definitions resolve here too).
    Primitive(PrimitiveType),

    /// A declared complex type.
    Complex(TypeId),

    /// A declared enum type.
    Enum(TypeId),

    /// A declared entity type (operation positions only).
    Entity(TypeId),
}

/// A fully resolved type reference.
///
/// Collection wrappers set `is_collection` instead of introducing a separate
/// type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticType {
    pub kind: TypeKind,
    pub is_collection: bool,
}

impl SemanticType {
    /// Creates a single-valued type.
    pub fn single(kind: TypeKind) -> Self {
        Self {
            kind,
            is_collection: false,
        }
    }

    /// Creates a collection type.
    pub fn collection(kind: TypeKind) -> Self {
        Self {
            kind,
            is_collection: true,
        }
    }

    /// Returns the primitive category, if this is a primitive type.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.kind {
            TypeKind::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    /// Returns true if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    /// Returns true if this references an entity type.
    pub fn is_entity(&self) -> bool {
        matches!(self.kind, TypeKind::Entity(_))
    }
}
