use prost_types::field_descriptor_proto::{Label, Type};
use serde::Serialize;

/// Physical encoding class of a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WireCategory {
    Varint,
    Fixed32,
    Fixed64,
    LengthDelimited,
    Group,
}

impl WireCategory {
    pub fn name(self) -> &'static str {
        match self {
            WireCategory::Varint          => "varint",
            WireCategory::Fixed32         => "fixed32",
            WireCategory::Fixed64         => "fixed64",
            WireCategory::LengthDelimited => "length-delimited",
            WireCategory::Group           => "group",
        }
    }
}

/// The eighteen field types a descriptor can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl From<Type> for FieldType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Double   => FieldType::Double,
            Type::Float    => FieldType::Float,
            Type::Int64    => FieldType::Int64,
            Type::Uint64   => FieldType::Uint64,
            Type::Int32    => FieldType::Int32,
            Type::Fixed64  => FieldType::Fixed64,
            Type::Fixed32  => FieldType::Fixed32,
            Type::Bool     => FieldType::Bool,
            Type::String   => FieldType::String,
            Type::Group    => FieldType::Group,
            Type::Message  => FieldType::Message,
            Type::Bytes    => FieldType::Bytes,
            Type::Uint32   => FieldType::Uint32,
            Type::Enum     => FieldType::Enum,
            Type::Sfixed32 => FieldType::Sfixed32,
            Type::Sfixed64 => FieldType::Sfixed64,
            Type::Sint32   => FieldType::Sint32,
            Type::Sint64   => FieldType::Sint64,
        }
    }
}

impl FieldType {
    pub fn wire_category(self) -> WireCategory {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum => WireCategory::Varint,
            FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => WireCategory::Fixed32,
            FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => WireCategory::Fixed64,
            FieldType::String | FieldType::Bytes | FieldType::Message => WireCategory::LengthDelimited,
            FieldType::Group => WireCategory::Group,
        }
    }

    /// Whether values of this type refer to another declared type.
    pub fn is_named(self) -> bool {
        matches!(self, FieldType::Message | FieldType::Group | FieldType::Enum)
    }

    pub fn is_message(self) -> bool {
        matches!(self, FieldType::Message | FieldType::Group)
    }

    /// The keyword used for this type in `.proto` source.
    pub fn proto_name(self) -> &'static str {
        match self {
            FieldType::Double   => "double",
            FieldType::Float    => "float",
            FieldType::Int64    => "int64",
            FieldType::Uint64   => "uint64",
            FieldType::Int32    => "int32",
            FieldType::Fixed64  => "fixed64",
            FieldType::Fixed32  => "fixed32",
            FieldType::Bool     => "bool",
            FieldType::String   => "string",
            FieldType::Group    => "group",
            FieldType::Message  => "message",
            FieldType::Bytes    => "bytes",
            FieldType::Uint32   => "uint32",
            FieldType::Enum     => "enum",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Sint32   => "sint32",
            FieldType::Sint64   => "sint64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    Optional,
    Required,
    Repeated,
}

impl From<Label> for Cardinality {
    fn from(label: Label) -> Self {
        match label {
            Label::Optional => Cardinality::Optional,
            Label::Required => Cardinality::Required,
            Label::Repeated => Cardinality::Repeated,
        }
    }
}

impl Cardinality {
    pub fn proto_name(self) -> &'static str {
        match self {
            Cardinality::Optional => "optional",
            Cardinality::Required => "required",
            Cardinality::Repeated => "repeated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Syntax {
    Proto2,
    Proto3,
}

impl Syntax {
    /// Files without a syntax statement are proto2.
    pub fn parse(syntax: &str) -> Self {
        match syntax {
            "proto3" => Syntax::Proto3,
            _ => Syntax::Proto2,
        }
    }
}

#[test]
fn wire_categories() {
    assert_eq!(FieldType::Sint64.wire_category(), WireCategory::Varint);
    assert_eq!(FieldType::Enum.wire_category(), WireCategory::Varint);
    assert_eq!(FieldType::Float.wire_category(), WireCategory::Fixed32);
    assert_eq!(FieldType::Sfixed64.wire_category(), WireCategory::Fixed64);
    assert_eq!(FieldType::Message.wire_category(), WireCategory::LengthDelimited);
    assert_eq!(FieldType::Group.wire_category(), WireCategory::Group);
}

#[test]
fn wire_category_names() {
    assert_eq!(WireCategory::Varint.name(), "varint");
    assert_eq!(WireCategory::LengthDelimited.name(), "length-delimited");
}

#[test]
fn syntax_defaults_to_proto2() {
    assert_eq!(Syntax::parse(""), Syntax::Proto2);
    assert_eq!(Syntax::parse("proto2"), Syntax::Proto2);
    assert_eq!(Syntax::parse("proto3"), Syntax::Proto3);
}
