use std::collections::{BTreeMap, HashMap};

use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::SchemaError,
    wire::{Cardinality, FieldType, Syntax},
    ENUM_VALUE, FILE_ENUM_TYPE, FILE_EXTENSION, FILE_MESSAGE_TYPE, MESSAGE_ENUM_TYPE,
    MESSAGE_EXTENSION, MESSAGE_FIELD, MESSAGE_NESTED_TYPE, MESSAGE_ONEOF,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId {
    pub file:  FileId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnumId {
    pub file:  FileId,
    pub index: usize,
}

/// A resolved reference to a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TypeRef {
    Message(MessageId),
    Enum(EnumId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comments {
    pub leading:  Option<String>,
    pub trailing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JavaOptions {
    pub package:         Option<String>,
    pub outer_classname: Option<String>,
    pub multiple_files:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSlot {
    pub name:            String,
    pub json_name:       Option<String>,
    pub number:          i32,
    pub cardinality:     Cardinality,
    pub ty:              FieldType,
    pub type_name:       String,
    pub oneof_index:     Option<usize>,
    pub default_value:   Option<String>,
    pub proto3_optional: bool,
    pub extendee:        Option<String>,
    pub deprecated:      bool,
    pub index:           usize,
    pub path:            Vec<i32>,
}

impl FieldSlot {
    fn wrap(raw: &FieldDescriptorProto, index: usize, path: Vec<i32>) -> Self {
        FieldSlot {
            name:            raw.name().to_string(),
            json_name:       raw.json_name.clone(),
            number:          raw.number(),
            cardinality:     raw.label().into(),
            ty:              raw.r#type().into(),
            type_name:       raw.type_name().to_string(),
            oneof_index:     raw.oneof_index.and_then(|i| usize::try_from(i).ok()),
            default_value:   raw.default_value.clone(),
            proto3_optional: raw.proto3_optional(),
            extendee:        raw.extendee.clone(),
            deprecated:      raw.options.as_ref().is_some_and(|o| o.deprecated()),
            index,
            path,
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneofGroup {
    pub name:      String,
    pub index:     usize,
    pub path:      Vec<i32>,
    pub fields:    Vec<usize>,
    /// Generated by protoc for a proto3 `optional` field; not a real union.
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageType {
    pub name:            String,
    pub type_name:       Vec<String>,
    pub full_name:       String,
    pub path:            Vec<i32>,
    pub index:           usize,
    pub parent:          Option<usize>,
    pub fields:          Vec<FieldSlot>,
    pub oneofs:          Vec<OneofGroup>,
    pub extensions:      Vec<FieldSlot>,
    pub nested:          Vec<usize>,
    pub enums:           Vec<usize>,
    pub declared_nested: usize,
    pub declared_enums:  usize,
    pub map_entry:       bool,
    pub group:           bool,
    pub deprecated:      bool,
    /// Half-open `[start, end)` field-number ranges reserved for extensions.
    pub extension_ranges: Vec<(i32, i32)>,
}

impl MessageType {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// The union a field belongs to, ignoring proto3 synthetic oneofs.
    pub fn variant_group(&self, field: &FieldSlot) -> Option<&OneofGroup> {
        let oneof = self.oneofs.get(field.oneof_index?)?;
        if oneof.synthetic {
            None
        } else {
            Some(oneof)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name:       String,
    pub number:     i32,
    pub path:       Vec<i32>,
    pub deprecated: bool,
    /// Index of the first value declared with the same number.
    pub alias_of:   Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub name:       String,
    pub type_name:  Vec<String>,
    pub full_name:  String,
    pub path:       Vec<i32>,
    pub index:      usize,
    pub parent:     Option<usize>,
    pub values:     Vec<EnumValue>,
    pub deprecated: bool,
}

impl EnumType {
    fn wrap(
        raw: &EnumDescriptorProto,
        package: &str,
        parent: Option<(usize, &[String])>,
        index: usize,
        path: Vec<i32>,
    ) -> Self {
        let mut type_name = parent.map(|(_, names)| names.to_vec()).unwrap_or_default();
        type_name.push(raw.name().to_string());

        let mut first_by_number: HashMap<i32, usize> = HashMap::new();
        let values = raw
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let alias_of = match first_by_number.get(&v.number()) {
                    Some(&first) => Some(first),
                    None => {
                        first_by_number.insert(v.number(), i);
                        None
                    }
                };
                let mut value_path = path.clone();
                value_path.extend([ENUM_VALUE, i as i32]);
                EnumValue {
                    name:       v.name().to_string(),
                    number:     v.number(),
                    path:       value_path,
                    deprecated: v.options.as_ref().is_some_and(|o| o.deprecated()),
                    alias_of,
                }
            })
            .collect();

        EnumType {
            name:       raw.name().to_string(),
            full_name:  full_name(package, &type_name),
            type_name,
            path,
            index,
            parent:     parent.map(|(p, _)| p),
            values,
            deprecated: raw.options.as_ref().is_some_and(|o| o.deprecated()),
        }
    }

    pub fn value_named(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// One input file, wrapped and linked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaUnit {
    pub id:           FileId,
    pub name:         String,
    pub package:      String,
    pub syntax:       Syntax,
    pub java:         JavaOptions,
    pub deprecated:   bool,
    pub dependencies: Vec<String>,
    /// Messages in pre-order: every message precedes its nested children.
    pub messages:     Vec<MessageType>,
    /// Top-level enums first, then nested enums in message order.
    pub enums:        Vec<EnumType>,
    pub extensions:   Vec<FieldSlot>,
    pub comments:     BTreeMap<String, Comments>,
    /// Types made visible to importers through `import public`.
    pub reexports:    Vec<TypeRef>,
}

struct Flattened<'a> {
    raw:       &'a DescriptorProto,
    parent:    Option<usize>,
    index:     usize,
    path:      Vec<i32>,
    type_name: Vec<String>,
}

fn flatten<'a>(
    list: &'a [DescriptorProto],
    parent: Option<usize>,
    parent_path: &[i32],
    parent_type_name: &[String],
    tag: i32,
    out: &mut Vec<Flattened<'a>>,
) {
    for (i, raw) in list.iter().enumerate() {
        let mut path = parent_path.to_vec();
        path.extend([tag, i as i32]);
        let mut type_name = parent_type_name.to_vec();
        type_name.push(raw.name().to_string());

        let me = out.len();
        out.push(Flattened { raw, parent, index: i, path: path.clone(), type_name: type_name.clone() });
        flatten(&raw.nested_type, Some(me), &path, &type_name, MESSAGE_NESTED_TYPE, out);
    }
}

/// `.package.Outer.Inner`, or `.Outer.Inner` for files without a package.
pub fn full_name(package: &str, type_name: &[String]) -> String {
    if package.is_empty() {
        format!(".{}", type_name.join("."))
    } else {
        format!(".{}.{}", package, type_name.join("."))
    }
}

/// The key under which comments for a source path are stored.
pub fn path_key(path: &[i32]) -> String {
    path.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
}

/// Attaches every message to its parent, checking each parent ends up with
/// exactly the number of nested types its descriptor declared.
pub fn link_nested(messages: &mut [MessageType]) -> Result<(), SchemaError> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); messages.len()];
    for (i, message) in messages.iter().enumerate() {
        if let Some(parent) = message.parent {
            children
                .get_mut(parent)
                .ok_or_else(|| SchemaError::DanglingParent { name: message.full_name.clone(), parent })?
                .push(i);
        }
    }

    for (message, nested) in messages.iter_mut().zip(children) {
        if nested.len() != message.declared_nested {
            return Err(SchemaError::NestingMismatch {
                name:     message.full_name.clone(),
                declared: message.declared_nested,
                attached: nested.len(),
            });
        }
        message.nested = nested;
    }
    Ok(())
}

/// Attaches nested enums to their already linked parent messages.
pub fn link_enums(messages: &mut [MessageType], enums: &[EnumType]) -> Result<(), SchemaError> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); messages.len()];
    for (i, e) in enums.iter().enumerate() {
        if let Some(parent) = e.parent {
            children
                .get_mut(parent)
                .ok_or_else(|| SchemaError::DanglingParent { name: e.full_name.clone(), parent })?
                .push(i);
        }
    }

    for (message, nested) in messages.iter_mut().zip(children) {
        if nested.len() != message.declared_enums {
            return Err(SchemaError::EnumNestingMismatch {
                name:     message.full_name.clone(),
                declared: message.declared_enums,
                attached: nested.len(),
            });
        }
        message.enums = nested;
    }
    Ok(())
}

fn wrap_fields(list: &[FieldDescriptorProto], parent_path: &[i32], tag: i32) -> Vec<FieldSlot> {
    list.iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut path = parent_path.to_vec();
            path.extend([tag, i as i32]);
            FieldSlot::wrap(raw, i, path)
        })
        .collect()
}

impl SchemaUnit {
    /// Wraps one file descriptor. Cross-file links (`reexports`) are filled
    /// in by [`SchemaGraph::build`].
    pub fn wrap(id: FileId, raw: &FileDescriptorProto) -> Result<SchemaUnit, SchemaError> {
        let package = raw.package().to_string();

        // 1) Pre-order walk over the message tree
        let mut flat = Vec::new();
        flatten(&raw.message_type, None, &[], &[], FILE_MESSAGE_TYPE, &mut flat);

        let mut messages: Vec<MessageType> = flat
            .iter()
            .map(|f| {
                let name = full_name(&package, &f.type_name);
                let fields = wrap_fields(&f.raw.field, &f.path, MESSAGE_FIELD);
                let oneofs = f
                    .raw
                    .oneof_decl
                    .iter()
                    .enumerate()
                    .map(|(i, o)| {
                        let members: Vec<usize> = fields
                            .iter()
                            .filter(|field| field.oneof_index == Some(i))
                            .map(|field| field.index)
                            .collect();
                        let synthetic = !members.is_empty()
                            && members.iter().all(|&m| fields[m].proto3_optional);
                        let mut path = f.path.clone();
                        path.extend([MESSAGE_ONEOF, i as i32]);
                        OneofGroup { name: o.name().to_string(), index: i, path, fields: members, synthetic }
                    })
                    .collect();
                let group = f.parent.is_some_and(|p| {
                    flat[p].raw.field.iter().any(|field| {
                        field.r#type() == prost_types::field_descriptor_proto::Type::Group
                            && field.type_name() == name
                    })
                });

                MessageType {
                    name: f.raw.name().to_string(),
                    type_name: f.type_name.clone(),
                    full_name: name,
                    path: f.path.clone(),
                    index: f.index,
                    parent: f.parent,
                    extensions: wrap_fields(&f.raw.extension, &f.path, MESSAGE_EXTENSION),
                    fields,
                    oneofs,
                    nested: Vec::new(),
                    enums: Vec::new(),
                    declared_nested: f.raw.nested_type.len(),
                    declared_enums: f.raw.enum_type.len(),
                    map_entry: f.raw.options.as_ref().is_some_and(|o| o.map_entry()),
                    group,
                    deprecated: f.raw.options.as_ref().is_some_and(|o| o.deprecated()),
                    extension_ranges: f.raw.extension_range.iter().map(|r| (r.start(), r.end())).collect(),
                }
            })
            .collect();

        // 2) Link children to parents
        link_nested(&mut messages)?;

        // 3) Enums, after messages exist to attach to
        let mut enums = Vec::new();
        for (i, e) in raw.enum_type.iter().enumerate() {
            enums.push(EnumType::wrap(e, &package, None, i, vec![FILE_ENUM_TYPE, i as i32]));
        }
        for (m, f) in flat.iter().enumerate() {
            for (i, e) in f.raw.enum_type.iter().enumerate() {
                let mut path = f.path.clone();
                path.extend([MESSAGE_ENUM_TYPE, i as i32]);
                enums.push(EnumType::wrap(e, &package, Some((m, f.type_name.as_slice())), i, path));
            }
        }
        link_enums(&mut messages, &enums)?;

        // 4) Comments by source path
        let mut comments = BTreeMap::new();
        for loc in raw.source_code_info.iter().flat_map(|info| info.location.iter()) {
            if loc.leading_comments.is_none() && loc.trailing_comments.is_none() {
                continue;
            }
            comments.entry(path_key(&loc.path)).or_insert_with(|| Comments {
                leading:  loc.leading_comments.clone(),
                trailing: loc.trailing_comments.clone(),
            });
        }

        let options = raw.options.as_ref();
        Ok(SchemaUnit {
            id,
            name: raw.name().to_string(),
            package,
            syntax: Syntax::parse(raw.syntax()),
            java: JavaOptions {
                package:         options.and_then(|o| o.java_package.clone()),
                outer_classname: options.and_then(|o| o.java_outer_classname.clone()),
                multiple_files:  options.is_some_and(|o| o.java_multiple_files()),
            },
            deprecated: options.is_some_and(|o| o.deprecated()),
            dependencies: raw.dependency.clone(),
            messages,
            enums,
            extensions: wrap_fields(&raw.extension, &[], FILE_EXTENSION),
            comments,
            reexports: Vec::new(),
        })
    }

    pub fn top_level_messages(&self) -> impl Iterator<Item = (usize, &MessageType)> {
        self.messages.iter().enumerate().filter(|(_, m)| m.is_top_level())
    }

    pub fn top_level_enums(&self) -> impl Iterator<Item = (usize, &EnumType)> {
        self.enums.iter().enumerate().filter(|(_, e)| e.parent.is_none())
    }

    pub fn comments_at(&self, path: &[i32]) -> Option<&Comments> {
        self.comments.get(&path_key(path))
    }

    /// File name without directories or the `.proto` extension.
    pub fn base_name(&self) -> &str {
        let file = self.name.rsplit('/').next().unwrap_or(&self.name);
        file.strip_suffix(".proto").unwrap_or(file)
    }

    /// Every non-map-entry message and every enum, as handles.
    pub fn exported_types(&self) -> Vec<TypeRef> {
        let messages = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.map_entry)
            .map(|(index, _)| TypeRef::Message(MessageId { file: self.id, index }));
        let enums = (0..self.enums.len()).map(|index| TypeRef::Enum(EnumId { file: self.id, index }));
        messages.chain(enums).collect()
    }
}

/// The whole request: every input file, wrapped and linked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaGraph {
    pub units: Vec<SchemaUnit>,
    #[serde(skip)]
    by_name:   HashMap<String, FileId>,
}

impl SchemaGraph {
    pub fn build(files: &[FileDescriptorProto]) -> Result<SchemaGraph, SchemaError> {
        let mut units = Vec::with_capacity(files.len());
        let mut by_name = HashMap::new();
        for (i, raw) in files.iter().enumerate() {
            let unit = SchemaUnit::wrap(FileId(i), raw)?;
            debug!(
                file = %unit.name,
                messages = unit.messages.len(),
                enums = unit.enums.len(),
                "wrapped file"
            );
            by_name.entry(unit.name.clone()).or_insert(FileId(i));
            units.push(unit);
        }

        // Public imports make the imported file's types visible to importers.
        for (i, raw) in files.iter().enumerate() {
            let mut reexports = Vec::new();
            for &dep in &raw.public_dependency {
                let dependency = usize::try_from(dep)
                    .ok()
                    .and_then(|d| raw.dependency.get(d))
                    .ok_or_else(|| SchemaError::UnknownDependency {
                        file:       raw.name().to_string(),
                        dependency: format!("#{}", dep),
                    })?;
                let target = by_name.get(dependency).ok_or_else(|| SchemaError::UnknownDependency {
                    file:       raw.name().to_string(),
                    dependency: dependency.clone(),
                })?;
                reexports.extend(units[target.0].exported_types());
            }
            units[i].reexports = reexports;
        }

        Ok(SchemaGraph { units, by_name })
    }

    pub fn units(&self) -> &[SchemaUnit] {
        &self.units
    }

    pub fn unit(&self, id: FileId) -> &SchemaUnit {
        &self.units[id.0]
    }

    pub fn file_named(&self, name: &str) -> Option<FileId> {
        self.by_name.get(name).copied()
    }

    pub fn message(&self, id: MessageId) -> &MessageType {
        &self.units[id.file.0].messages[id.index]
    }

    pub fn enum_type(&self, id: EnumId) -> &EnumType {
        &self.units[id.file.0].enums[id.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        field_descriptor_proto::{Label, Type},
        source_code_info::Location,
        EnumValueDescriptorProto, FileOptions, MessageOptions, OneofDescriptorProto, SourceCodeInfo,
    };

    fn message(name: &str, nested: Vec<DescriptorProto>) -> DescriptorProto {
        DescriptorProto { name: Some(name.into()), nested_type: nested, ..Default::default() }
    }

    fn bare(name: &str, parent: Option<usize>, declared_nested: usize) -> MessageType {
        MessageType {
            name: name.into(),
            type_name: vec![name.into()],
            full_name: format!(".t.{}", name),
            path: vec![],
            index: 0,
            parent,
            fields: vec![],
            oneofs: vec![],
            extensions: vec![],
            nested: vec![],
            enums: vec![],
            declared_nested,
            declared_enums: 0,
            map_entry: false,
            group: false,
            deprecated: false,
            extension_ranges: vec![],
        }
    }

    #[test]
    fn pre_order_with_parent_links() {
        let file = FileDescriptorProto {
            name: Some("a.proto".into()),
            package: Some("pkg".into()),
            message_type: vec![
                message("Outer", vec![message("Mid", vec![message("Leaf", vec![])]), message("Side", vec![])]),
                message("Other", vec![]),
            ],
            ..Default::default()
        };
        let unit = SchemaUnit::wrap(FileId(0), &file).unwrap();
        let names: Vec<&str> = unit.messages.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, [".pkg.Outer", ".pkg.Outer.Mid", ".pkg.Outer.Mid.Leaf", ".pkg.Outer.Side", ".pkg.Other"]);
        assert_eq!(unit.messages[0].nested, vec![1, 3]);
        assert_eq!(unit.messages[1].nested, vec![2]);
        assert_eq!(unit.messages[2].parent, Some(1));
        assert_eq!(unit.messages[3].path, vec![4, 0, 3, 1]);
        assert_eq!(unit.messages[4].path, vec![4, 1]);
    }

    #[test]
    fn nesting_mismatch_is_fatal() {
        let mut messages = vec![bare("Outer", None, 2), bare("Inner", Some(0), 0)];
        let err = link_nested(&mut messages).unwrap_err();
        assert!(matches!(err, SchemaError::NestingMismatch { declared: 2, attached: 1, .. }));
    }

    #[test]
    fn dangling_parent_is_fatal() {
        let mut messages = vec![bare("Orphan", Some(7), 0)];
        assert!(matches!(link_nested(&mut messages), Err(SchemaError::DanglingParent { parent: 7, .. })));
    }

    #[test]
    fn enum_nesting_mismatch_is_fatal() {
        let mut messages = vec![bare("Outer", None, 0)];
        messages[0].declared_enums = 1;
        let err = link_enums(&mut messages, &[]).unwrap_err();
        assert!(matches!(err, SchemaError::EnumNestingMismatch { declared: 1, attached: 0, .. }));
    }

    #[test]
    fn empty_package_names() {
        assert_eq!(full_name("", &["A".into(), "B".into()]), ".A.B");
        assert_eq!(full_name("x.y", &["A".into()]), ".x.y.A");
    }

    #[test]
    fn enums_aliases_and_comments() {
        let color = EnumDescriptorProto {
            name: Some("Color".into()),
            value: vec![
                EnumValueDescriptorProto { name: Some("RED".into()), number: Some(0), ..Default::default() },
                EnumValueDescriptorProto { name: Some("GREEN".into()), number: Some(1), ..Default::default() },
                EnumValueDescriptorProto { name: Some("VERT".into()), number: Some(1), ..Default::default() },
            ],
            ..Default::default()
        };
        let mut holder = message("Holder", vec![]);
        holder.enum_type.push(color.clone());
        let file = FileDescriptorProto {
            name: Some("dir/colors.proto".into()),
            message_type: vec![holder],
            enum_type: vec![color],
            source_code_info: Some(SourceCodeInfo {
                location: vec![
                    Location { path: vec![5, 0], leading_comments: Some(" Colors.\n".into()), ..Default::default() },
                    Location { path: vec![4, 0], ..Default::default() },
                ],
            }),
            ..Default::default()
        };
        let unit = SchemaUnit::wrap(FileId(0), &file).unwrap();
        assert_eq!(unit.base_name(), "colors");
        assert_eq!(unit.enums.len(), 2);
        assert_eq!(unit.enums[0].full_name, ".Color");
        assert_eq!(unit.enums[1].full_name, ".Holder.Color");
        assert_eq!(unit.enums[1].path, vec![4, 0, 4, 0]);
        assert_eq!(unit.messages[0].enums, vec![1]);
        assert_eq!(unit.enums[0].values[2].alias_of, Some(1));
        assert_eq!(unit.enums[0].values[1].alias_of, None);
        assert_eq!(unit.comments.len(), 1);
        assert_eq!(unit.comments_at(&[5, 0]).unwrap().leading.as_deref(), Some(" Colors.\n"));
    }

    #[test]
    fn map_entries_groups_and_synthetic_oneofs() {
        let entry = DescriptorProto {
            name: Some("CountsEntry".into()),
            options: Some(MessageOptions { map_entry: Some(true), ..Default::default() }),
            ..Default::default()
        };
        let group = message("Result", vec![]);
        let holder = DescriptorProto {
            name: Some("Holder".into()),
            field: vec![
                FieldDescriptorProto {
                    name: Some("result".into()),
                    number: Some(1),
                    label: Some(Label::Optional as i32),
                    r#type: Some(Type::Group as i32),
                    type_name: Some(".p.Holder.Result".into()),
                    ..Default::default()
                },
                FieldDescriptorProto {
                    name: Some("maybe".into()),
                    number: Some(2),
                    label: Some(Label::Optional as i32),
                    r#type: Some(Type::Int32 as i32),
                    oneof_index: Some(0),
                    proto3_optional: Some(true),
                    ..Default::default()
                },
            ],
            oneof_decl: vec![OneofDescriptorProto { name: Some("_maybe".into()), ..Default::default() }],
            nested_type: vec![entry, group],
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("h.proto".into()),
            package: Some("p".into()),
            syntax: Some("proto3".into()),
            message_type: vec![holder],
            options: Some(FileOptions { java_multiple_files: Some(true), ..Default::default() }),
            ..Default::default()
        };
        let unit = SchemaUnit::wrap(FileId(0), &file).unwrap();
        assert!(unit.messages[1].map_entry);
        assert!(unit.messages[2].group);
        assert!(unit.messages[0].oneofs[0].synthetic);
        assert!(unit.messages[0].variant_group(&unit.messages[0].fields[1]).is_none());
        assert!(unit.java.multiple_files);
        assert_eq!(unit.syntax, Syntax::Proto3);
        assert_eq!(unit.exported_types().len(), 2);
    }

    #[test]
    fn public_imports_are_reexported() {
        let base = FileDescriptorProto {
            name: Some("base.proto".into()),
            message_type: vec![message("Base", vec![])],
            ..Default::default()
        };
        let facade = FileDescriptorProto {
            name: Some("facade.proto".into()),
            dependency: vec!["base.proto".into()],
            public_dependency: vec![0],
            ..Default::default()
        };
        let graph = SchemaGraph::build(&[base, facade]).unwrap();
        assert_eq!(graph.file_named("facade.proto"), Some(FileId(1)));
        assert_eq!(
            graph.unit(FileId(1)).reexports,
            vec![TypeRef::Message(MessageId { file: FileId(0), index: 0 })]
        );
    }

    #[test]
    fn unknown_public_import_is_fatal() {
        let facade = FileDescriptorProto {
            name: Some("facade.proto".into()),
            dependency: vec!["missing.proto".into()],
            public_dependency: vec![0],
            ..Default::default()
        };
        assert!(matches!(SchemaGraph::build(&[facade]), Err(SchemaError::UnknownDependency { .. })));
    }
}
