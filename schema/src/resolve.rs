use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::SchemaError,
    graph::{EnumId, MessageId, SchemaGraph, TypeRef},
};

/// Global map from fully qualified name to type handle, across every file
/// in the request.
#[derive(Debug, Default)]
pub struct TypeIndex {
    by_name: HashMap<String, TypeRef>,
}

impl TypeIndex {
    pub fn build(graph: &SchemaGraph) -> TypeIndex {
        let mut by_name = HashMap::new();
        for unit in graph.units() {
            for (index, message) in unit.messages.iter().enumerate() {
                by_name
                    .entry(message.full_name.clone())
                    .or_insert(TypeRef::Message(MessageId { file: unit.id, index }));
            }
            for (index, e) in unit.enums.iter().enumerate() {
                by_name
                    .entry(e.full_name.clone())
                    .or_insert(TypeRef::Enum(EnumId { file: unit.id, index }));
            }
        }
        debug!(types = by_name.len(), "built type index");
        TypeIndex { by_name }
    }

    pub fn resolve(&self, name: &str) -> Result<TypeRef, SchemaError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnresolvedType(name.to_string()))
    }

    pub fn resolve_message(&self, name: &str) -> Result<MessageId, SchemaError> {
        match self.resolve(name)? {
            TypeRef::Message(id) => Ok(id),
            TypeRef::Enum(_) => Err(SchemaError::KindMismatch { name: name.to_string(), expected: "a message" }),
        }
    }

    pub fn resolve_enum(&self, name: &str) -> Result<EnumId, SchemaError> {
        match self.resolve(name)? {
            TypeRef::Enum(id) => Ok(id),
            TypeRef::Message(_) => Err(SchemaError::KindMismatch { name: name.to_string(), expected: "an enum" }),
        }
    }

    /// Resolves every field type and extendee in the graph so dangling
    /// references surface before any output is produced.
    pub fn check_references(&self, graph: &SchemaGraph) -> Result<(), SchemaError> {
        for unit in graph.units() {
            let scoped = unit.messages.iter().flat_map(|m| m.fields.iter().chain(m.extensions.iter()));
            for field in scoped.chain(unit.extensions.iter()) {
                if field.ty.is_message() {
                    self.resolve_message(&field.type_name)?;
                } else if field.ty.is_named() {
                    self.resolve_enum(&field.type_name)?;
                }
                if let Some(extendee) = &field.extendee {
                    self.resolve_message(extendee)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FileId;
    use prost_types::{
        field_descriptor_proto::{Label, Type},
        DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    };

    fn file(name: &str, package: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.into()),
            package: Some(package.into()),
            message_type: messages,
            ..Default::default()
        }
    }

    fn reference(name: &str, ty: Type, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            type_name: Some(type_name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_across_files_including_cycles() {
        let a = DescriptorProto {
            name: Some("A".into()),
            field: vec![reference("b", Type::Message, ".two.B")],
            ..Default::default()
        };
        let b = DescriptorProto {
            name: Some("B".into()),
            field: vec![reference("a", Type::Message, ".one.A")],
            enum_type: vec![EnumDescriptorProto { name: Some("Kind".into()), ..Default::default() }],
            ..Default::default()
        };
        let graph = SchemaGraph::build(&[file("one.proto", "one", vec![a]), file("two.proto", "two", vec![b])]).unwrap();
        let index = TypeIndex::build(&graph);
        assert!(index.resolve(".one.A").is_ok());
        index.check_references(&graph).unwrap();
        assert_eq!(index.resolve_message(".two.B").unwrap(), MessageId { file: FileId(1), index: 0 });
        assert_eq!(index.resolve_enum(".two.B.Kind").unwrap(), EnumId { file: FileId(1), index: 0 });
    }

    #[test]
    fn dangling_reference_is_fatal() {
        let a = DescriptorProto {
            name: Some("A".into()),
            field: vec![reference("gone", Type::Message, ".one.Gone")],
            ..Default::default()
        };
        let graph = SchemaGraph::build(&[file("one.proto", "one", vec![a])]).unwrap();
        let index = TypeIndex::build(&graph);
        match index.check_references(&graph) {
            Err(SchemaError::UnresolvedType(name)) => assert_eq!(name, ".one.Gone"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn kind_mismatch() {
        let a = DescriptorProto {
            name: Some("A".into()),
            field: vec![reference("a", Type::Enum, ".one.A")],
            ..Default::default()
        };
        let graph = SchemaGraph::build(&[file("one.proto", "one", vec![a])]).unwrap();
        let index = TypeIndex::build(&graph);
        assert!(matches!(index.check_references(&graph), Err(SchemaError::KindMismatch { .. })));
    }

    #[test]
    fn first_insert_wins() {
        let graph = SchemaGraph::build(&[
            file("one.proto", "p", vec![DescriptorProto { name: Some("Dup".into()), ..Default::default() }]),
            file("two.proto", "p", vec![DescriptorProto { name: Some("Dup".into()), ..Default::default() }]),
        ])
        .unwrap();
        let index = TypeIndex::build(&graph);
        assert_eq!(index.resolve_message(".p.Dup").unwrap().file, FileId(0));
    }
}
