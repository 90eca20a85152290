use protobean_schema::{EnumId, FieldSlot, FieldType, MessageId, MessageType, Syntax, WireCategory};

use crate::{
    compiler::Context,
    emit::{ClassName, ImportSet},
    error::BeanError,
    mangle::unescape,
    utils::quote,
};

/// Scalar value types, after folding the wire-only distinctions (zigzag,
/// fixed width) that don't change the Java type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    fn of(ty: FieldType) -> Option<ScalarKind> {
        Some(match ty {
            FieldType::Double => ScalarKind::Double,
            FieldType::Float => ScalarKind::Float,
            FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => ScalarKind::Int32,
            FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => ScalarKind::Int64,
            FieldType::Uint32 | FieldType::Fixed32 => ScalarKind::Uint32,
            FieldType::Uint64 | FieldType::Fixed64 => ScalarKind::Uint64,
            FieldType::Bool => ScalarKind::Bool,
            FieldType::String => ScalarKind::String,
            FieldType::Bytes => ScalarKind::Bytes,
            FieldType::Message | FieldType::Group | FieldType::Enum => return None,
        })
    }

    pub fn primitive(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 | ScalarKind::Uint32 => "int",
            ScalarKind::Int64 | ScalarKind::Uint64 => "long",
            ScalarKind::Bool => "boolean",
            ScalarKind::String => "String",
            ScalarKind::Bytes => "byte[]",
        }
    }

    /// The reference type used inside generics and for nullable fields.
    pub fn boxed(self) -> &'static str {
        match self {
            ScalarKind::Double => "Double",
            ScalarKind::Float => "Float",
            ScalarKind::Int32 | ScalarKind::Uint32 => "Integer",
            ScalarKind::Int64 | ScalarKind::Uint64 => "Long",
            ScalarKind::Bool => "Boolean",
            ScalarKind::String => "String",
            ScalarKind::Bytes => "byte[]",
        }
    }

    /// What an unset field of this type reads as.
    pub fn zero(self) -> &'static str {
        match self {
            ScalarKind::Double => "0.0d",
            ScalarKind::Float => "0.0f",
            ScalarKind::Int32 | ScalarKind::Uint32 => "0",
            ScalarKind::Int64 | ScalarKind::Uint64 => "0L",
            ScalarKind::Bool => "false",
            ScalarKind::String => "\"\"",
            ScalarKind::Bytes => "null",
        }
    }
}

/// A single value of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Scalar(ScalarKind),
    Message(MessageId),
    Enum(EnumId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar { value: ScalarKind, repeated: bool },
    Message { id: MessageId, repeated: bool },
    Enum { id: EnumId, repeated: bool },
    Map { key: ScalarKind, value: ValueType },
    OneofVariant { oneof: usize, payload: ValueType },
    Extension { extendee: MessageId, payload: ValueType, repeated: bool },
}

/// An explicit `[default = ...]`, re-encoded for Java.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultLiteral {
    Literal(String),
    /// Number of the enum value the default names.
    Enum { id: EnumId, number: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedField<'a> {
    pub slot:     &'a FieldSlot,
    pub kind:     FieldKind,
    pub wire:     WireCategory,
    pub default:  Option<DefaultLiteral>,
    /// Tracks presence: proto3 `optional` scalars become nullable.
    pub nullable: bool,
}

fn value_of(ctx: &Context<'_>, field: &FieldSlot) -> Result<ValueType, BeanError> {
    if let Some(scalar) = ScalarKind::of(field.ty) {
        return Ok(ValueType::Scalar(scalar));
    }
    if field.ty.is_message() {
        Ok(ValueType::Message(ctx.index.resolve_message(&field.type_name)?))
    } else {
        Ok(ValueType::Enum(ctx.index.resolve_enum(&field.type_name)?))
    }
}

/// Sorts a field into its [`FieldKind`]. `scope` is the message declaring
/// the field, absent for file-level extensions.
pub fn classify<'a>(
    ctx: &Context<'_>,
    scope: Option<&MessageType>,
    field: &'a FieldSlot,
) -> Result<ClassifiedField<'a>, BeanError> {
    let value = value_of(ctx, field)?;
    let repeated = field.is_repeated();

    let kind = if let Some(extendee) = &field.extendee {
        FieldKind::Extension { extendee: ctx.index.resolve_message(extendee)?, payload: value, repeated }
    } else if let Some(group) = scope.and_then(|m| m.variant_group(field)) {
        FieldKind::OneofVariant { oneof: group.index, payload: value }
    } else {
        match value {
            ValueType::Message(id) if repeated && ctx.graph.message(id).map_entry => map_kind(ctx, id)?,
            ValueType::Message(id) => FieldKind::Message { id, repeated },
            ValueType::Enum(id) => FieldKind::Enum { id, repeated },
            ValueType::Scalar(value) => FieldKind::Scalar { value, repeated },
        }
    };

    let default = match (&field.default_value, repeated) {
        (Some(text), false) => explicit_default(ctx, field, value, text)?,
        _ => None,
    };

    Ok(ClassifiedField {
        slot: field,
        kind,
        wire: field.ty.wire_category(),
        default,
        nullable: field.proto3_optional && matches!(value, ValueType::Scalar(_) | ValueType::Enum(_)),
    })
}

fn map_kind(ctx: &Context<'_>, entry: MessageId) -> Result<FieldKind, BeanError> {
    let message = ctx.graph.message(entry);
    let by_number = |n: i32| message.fields.iter().find(|f| f.number == n);
    let malformed = || BeanError::MalformedMapEntry(message.full_name.clone());

    let key = by_number(1).and_then(|f| ScalarKind::of(f.ty)).ok_or_else(malformed)?;
    let value = value_of(ctx, by_number(2).ok_or_else(malformed)?)?;
    Ok(FieldKind::Map { key, value })
}

fn explicit_default(
    ctx: &Context<'_>,
    field: &FieldSlot,
    value: ValueType,
    text: &str,
) -> Result<Option<DefaultLiteral>, BeanError> {
    let literal = match value {
        ValueType::Message(_) => return Ok(None),
        ValueType::Enum(id) => {
            let e = ctx.graph.enum_type(id);
            let value = e.value_named(text).ok_or_else(|| BeanError::UnknownEnumDefault {
                field: field.name.clone(),
                value: text.to_string(),
            })?;
            return Ok(Some(DefaultLiteral::Enum { id, number: value.number }));
        }
        ValueType::Scalar(scalar) => match scalar {
            ScalarKind::Bool => text.to_string(),
            ScalarKind::String => quote(text),
            ScalarKind::Bytes => {
                let bytes: Vec<String> = unescape(text).iter().map(|&b| (b as i8).to_string()).collect();
                format!("new byte[] {{{}}}", bytes.join(", "))
            }
            ScalarKind::Float => float_literal(text, "Float", 'f', text.parse::<f32>().ok().map(|v| format!("{:?}", v))),
            ScalarKind::Double => float_literal(text, "Double", 'd', text.parse::<f64>().ok().map(|v| format!("{:?}", v))),
            ScalarKind::Int32 => text.to_string(),
            ScalarKind::Int64 => format!("{}L", text),
            ScalarKind::Uint32 => match text.parse::<u32>() {
                Ok(v) => (v as i32).to_string(),
                Err(_) => text.to_string(),
            },
            ScalarKind::Uint64 => match text.parse::<u64>() {
                Ok(v) => format!("{}L", v as i64),
                Err(_) => format!("{}L", text),
            },
        },
    };
    Ok(Some(DefaultLiteral::Literal(literal)))
}

fn float_literal(text: &str, class: &str, suffix: char, reparsed: Option<String>) -> String {
    match text {
        "inf" => format!("{}.POSITIVE_INFINITY", class),
        "-inf" => format!("{}.NEGATIVE_INFINITY", class),
        "nan" => format!("{}.NaN", class),
        _ => format!("{}{}", reparsed.as_deref().unwrap_or(text), suffix),
    }
}

pub fn list_class() -> ClassName {
    ClassName::library("java.util", "List")
}

pub fn map_class() -> ClassName {
    ClassName::library("java.util", "Map")
}

impl ValueType {
    pub fn render(&self, ctx: &Context<'_>, imports: &mut ImportSet, boxed: bool) -> String {
        match self {
            ValueType::Scalar(s) if boxed => s.boxed().to_string(),
            ValueType::Scalar(s) => s.primitive().to_string(),
            ValueType::Message(id) => imports.reference(&ctx.alloc.message_class(ctx.graph, *id)),
            ValueType::Enum(id) => imports.reference(&ctx.alloc.enum_class(ctx.graph, *id)),
        }
    }

    /// The value an unset field of this type reads as.
    pub fn zero(&self, ctx: &Context<'_>, imports: &mut ImportSet) -> String {
        match self {
            ValueType::Scalar(s) => s.zero().to_string(),
            ValueType::Message(_) => "null".to_string(),
            ValueType::Enum(id) => first_constant(ctx, imports, *id),
        }
    }
}

fn first_constant(ctx: &Context<'_>, imports: &mut ImportSet, id: EnumId) -> String {
    match ctx.alloc.enum_plan(id).constants.first() {
        Some(constant) => format!("{}.{}", imports.reference(&ctx.alloc.enum_class(ctx.graph, id)), constant),
        None => "null".to_string(),
    }
}

impl ClassifiedField<'_> {
    /// The declared Java type of the bean field (for a oneof variant, of the
    /// wrapper's payload).
    pub fn render_type(&self, ctx: &Context<'_>, imports: &mut ImportSet) -> String {
        let list = |imports: &mut ImportSet, item: String| format!("{}<{}>", imports.reference(&list_class()), item);
        match self.kind {
            FieldKind::Scalar { value, repeated: false } => ValueType::Scalar(value).render(ctx, imports, self.nullable),
            FieldKind::Scalar { value, repeated: true } => list(imports, value.boxed().to_string()),
            FieldKind::Message { id, repeated } | FieldKind::Extension { payload: ValueType::Message(id), repeated, .. } => {
                let class = ValueType::Message(id).render(ctx, imports, true);
                if repeated { list(imports, class) } else { class }
            }
            FieldKind::Enum { id, repeated } | FieldKind::Extension { payload: ValueType::Enum(id), repeated, .. } => {
                let class = ValueType::Enum(id).render(ctx, imports, true);
                if repeated { list(imports, class) } else { class }
            }
            FieldKind::Extension { payload: ValueType::Scalar(value), repeated, .. } => {
                if repeated { list(imports, value.boxed().to_string()) } else { value.primitive().to_string() }
            }
            FieldKind::Map { key, value } => {
                let map = imports.reference(&map_class());
                let value = value.render(ctx, imports, true);
                format!("{}<{}, {}>", map, key.boxed(), value)
            }
            FieldKind::OneofVariant { payload, .. } => payload.render(ctx, imports, false),
        }
    }

    /// Right-hand side of an explicit default constant.
    pub fn render_default(&self, ctx: &Context<'_>, imports: &mut ImportSet) -> Option<String> {
        match self.default.as_ref()? {
            DefaultLiteral::Literal(text) => Some(text.clone()),
            DefaultLiteral::Enum { id, number } => {
                let class = imports.reference(&ctx.alloc.enum_class(ctx.graph, *id));
                Some(format!("{}.forNumber({})", class, number))
            }
        }
    }

    /// Field initializer, given the name of its default constant. `None`
    /// leaves the Java default in place.
    pub fn initializer(&self, ctx: &Context<'_>, imports: &mut ImportSet, default_const: Option<&str>) -> Option<String> {
        if let Some(constant) = default_const {
            return Some(if self.is_bytes() { format!("{}.clone()", constant) } else { constant.to_string() });
        }
        if self.nullable {
            return None;
        }
        match self.kind {
            FieldKind::Scalar { repeated: true, .. }
            | FieldKind::Message { repeated: true, .. }
            | FieldKind::Enum { repeated: true, .. } => {
                imports.reference(&ClassName::library("java.util", "ArrayList"));
                Some("new ArrayList<>()".to_string())
            }
            FieldKind::Map { .. } => {
                imports.reference(&ClassName::library("java.util", "HashMap"));
                Some("new HashMap<>()".to_string())
            }
            FieldKind::Scalar { value: ScalarKind::String, .. } => Some("\"\"".to_string()),
            FieldKind::Enum { id, repeated: false } => Some(first_constant(ctx, imports, id)),
            _ => None,
        }
    }

    /// The value a oneof variant getter returns when another variant is set.
    pub fn getter_default(&self, ctx: &Context<'_>, imports: &mut ImportSet, default_const: Option<&str>) -> String {
        if let Some(constant) = default_const {
            return if self.is_bytes() { format!("{}.clone()", constant) } else { constant.to_string() };
        }
        match self.kind {
            FieldKind::OneofVariant { payload, .. } => payload.zero(ctx, imports),
            _ => "null".to_string(),
        }
    }

    /// The schema declaration this field came from, for doc lines.
    pub fn describe(&self, syntax: Syntax) -> String {
        let label = match self.kind {
            FieldKind::Map { .. } => "",
            _ if self.slot.is_repeated() => "repeated ",
            _ if syntax == Syntax::Proto3 && !self.slot.proto3_optional => "",
            _ => self.slot.cardinality.proto_name(),
        };
        let space = if label.is_empty() || label.ends_with(' ') { "" } else { " " };
        let ty = match self.kind {
            FieldKind::Map { .. } => "map".to_string(),
            _ if self.slot.ty.is_named() => self.slot.type_name.trim_start_matches('.').to_string(),
            _ => self.slot.ty.proto_name().to_string(),
        };
        format!("{}{}{} {} = {}; ({})", label, space, ty, self.slot.name, self.slot.number, self.wire.name())
    }

    /// The type of one value, for everything but maps.
    pub fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            FieldKind::Scalar { value, .. } => Some(ValueType::Scalar(value)),
            FieldKind::Message { id, .. } => Some(ValueType::Message(id)),
            FieldKind::Enum { id, .. } => Some(ValueType::Enum(id)),
            FieldKind::OneofVariant { payload, .. } | FieldKind::Extension { payload, .. } => Some(payload),
            FieldKind::Map { .. } => None,
        }
    }

    pub fn is_bytes(&self) -> bool {
        self.value_type() == Some(ValueType::Scalar(ScalarKind::Bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_literals() {
        assert_eq!(float_literal("inf", "Float", 'f', None), "Float.POSITIVE_INFINITY");
        assert_eq!(float_literal("-inf", "Double", 'd', None), "Double.NEGATIVE_INFINITY");
        assert_eq!(float_literal("nan", "Double", 'd', None), "Double.NaN");
        assert_eq!(float_literal("1.5", "Float", 'f', "1.5".parse::<f32>().ok().map(|v| format!("{:?}", v))), "1.5f");
        assert_eq!(float_literal("3", "Double", 'd', "3".parse::<f64>().ok().map(|v| format!("{:?}", v))), "3.0d");
        assert_eq!(float_literal("x", "Float", 'f', None), "xf");
    }

    #[test]
    fn scalar_folding() {
        assert_eq!(ScalarKind::of(FieldType::Sfixed32), Some(ScalarKind::Int32));
        assert_eq!(ScalarKind::of(FieldType::Fixed64), Some(ScalarKind::Uint64));
        assert_eq!(ScalarKind::of(FieldType::Group), None);
        assert_eq!(ScalarKind::Uint32.primitive(), "int");
        assert_eq!(ScalarKind::Bytes.boxed(), "byte[]");
        assert_eq!(ScalarKind::Int64.zero(), "0L");
    }
}
