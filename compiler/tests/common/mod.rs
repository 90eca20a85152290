#![allow(dead_code)]

use prost_types::{
    compiler::CodeGeneratorRequest,
    descriptor_proto::ExtensionRange,
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    MessageOptions, OneofDescriptorProto,
};
use protobean_compiler::{compile_request, Artifact, BeanError};

pub fn file(name: &str, package: &str, syntax: &str) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.into()),
        package: Some(package.into()),
        syntax: Some(syntax.into()),
        ..Default::default()
    }
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto { name: Some(name.into()), field: fields, ..Default::default() }
}

pub fn scalar(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// A message- or enum-typed field; `type_name` is fully qualified.
pub fn named(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto { type_name: Some(type_name.into()), ..scalar(name, number, ty) }
}

pub fn repeated(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto { label: Some(Label::Repeated as i32), ..field }
}

pub fn in_oneof(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto { oneof_index: Some(index), ..field }
}

pub fn proto3_optional(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto { oneof_index: Some(index), proto3_optional: Some(true), ..field }
}

pub fn with_default(field: FieldDescriptorProto, value: &str) -> FieldDescriptorProto {
    FieldDescriptorProto { default_value: Some(value.into()), ..field }
}

pub fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto { name: Some(name.into()), ..Default::default() }
}

/// The synthetic entry type protoc generates for `map<K, V> name`.
pub fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        field: vec![scalar("key", 1, key), FieldDescriptorProto { name: Some("value".into()), number: Some(2), ..value }],
        options: Some(MessageOptions { map_entry: Some(true), ..Default::default() }),
        ..Default::default()
    }
}

pub fn extension_range(start: i32, end: i32) -> ExtensionRange {
    ExtensionRange { start: Some(start), end: Some(end), ..Default::default() }
}

pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.into()),
        value: values
            .iter()
            .map(|(n, v)| EnumValueDescriptorProto { name: Some((*n).into()), number: Some(*v), ..Default::default() })
            .collect(),
        ..Default::default()
    }
}

pub fn request(parameter: &str, files: Vec<FileDescriptorProto>, generate: &[&str]) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: generate.iter().map(|s| s.to_string()).collect(),
        parameter: Some(parameter.into()),
        proto_file: files,
        ..Default::default()
    }
}

/// `package demo; message Hello { string msg = 1; int32 code = 2; }`
pub fn hello() -> FileDescriptorProto {
    let mut f = file("demo.proto", "demo", "proto3");
    f.message_type.push(message("Hello", vec![scalar("msg", 1, Type::String), scalar("code", 2, Type::Int32)]));
    f
}

pub fn compile(parameter: &str, files: Vec<FileDescriptorProto>, generate: &[&str]) -> Result<Vec<Artifact>, BeanError> {
    compile_request(&request(parameter, files, generate))
}

pub fn find<'a>(artifacts: &'a [Artifact], path: &str) -> &'a str {
    match artifacts.iter().find(|a| a.path == path) {
        Some(a) => &a.content,
        None => panic!("no artifact {}; have {:?}", path, artifacts.iter().map(|a| &a.path).collect::<Vec<_>>()),
    }
}

pub fn paths(artifacts: &[Artifact]) -> Vec<&str> {
    artifacts.iter().map(|a| a.path.as_str()).collect()
}
