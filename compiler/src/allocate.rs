use protobean_schema::{EnumId, FieldSlot, FileId, MessageId, MessageType, SchemaGraph, SchemaUnit};
use tracing::debug;

use crate::{
    emit::ClassName,
    mangle::{camel_case, lower_camel_case, proto_java_camel, upper_snake_case},
    naming::{java_package_suffix, NameRegistry, OBJECT_METHODS},
    params::{Layout, Params},
};

const ENUM_MEMBERS: [&str; 8] = ["number", "getNumber", "forNumber", "values", "valueOf", "ordinal", "name", "compareTo"];

/// Every name the emitters use, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub files: Vec<FilePlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    pub vo_package:        String,
    pub converter_class:   String,
    /// Outer class holding every type, in [`Layout::File`].
    pub wrapper_class:     Option<String>,
    /// Holder for file-level extension constants.
    pub extensions_class:  Option<String>,
    pub extensions:        Vec<ExtensionPlan>,
    /// Package of the protobuf-java classes.
    pub proto_package:     String,
    /// protobuf-java outer class, absent with `java_multiple_files`.
    pub proto_outer_class: Option<String>,
    pub messages:          Vec<MessagePlan>,
    pub enums:             Vec<EnumPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePlan {
    pub class_name: String,
    pub fields:     Vec<MemberPlan>,
    /// One entry per declared oneof; `None` for proto3 synthetic ones.
    pub oneofs:     Vec<Option<OneofPlan>>,
    pub extensions: Vec<ExtensionPlan>,
    pub converter:  ConverterPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPlan {
    /// The bean field, or the payload field of the variant wrapper.
    pub field:          String,
    pub number_const:   String,
    pub default_const:  Option<String>,
    /// Stem of the protobuf-java accessors, `get{stem}()`.
    pub proto_accessor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofPlan {
    pub field:             String,
    pub iface:             String,
    pub case_enum:         String,
    pub case_getter:       String,
    pub not_set:           String,
    pub proto_case_getter: String,
    pub proto_not_set:     String,
    pub variants:          Vec<VariantPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPlan {
    pub field_index:         usize,
    pub wrapper:             String,
    pub case_constant:       String,
    pub setter:              String,
    pub getter:              String,
    pub proto_case_constant: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPlan {
    pub number_const:   String,
    pub extendee_const: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPlan {
    pub class_name: String,
    pub constants:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterPlan {
    pub decode: String,
    pub encode: String,
    pub bytes:  String,
}

impl Allocation {
    pub fn file(&self, id: FileId) -> &FilePlan {
        &self.files[id.0]
    }

    pub fn message(&self, id: MessageId) -> &MessagePlan {
        &self.files[id.file.0].messages[id.index]
    }

    pub fn enum_plan(&self, id: EnumId) -> &EnumPlan {
        &self.files[id.file.0].enums[id.index]
    }

    fn enclosing(&self, graph: &SchemaGraph, file: FileId, mut parent: Option<usize>) -> Vec<String> {
        let plan = self.file(file);
        let mut chain = Vec::new();
        while let Some(i) = parent {
            chain.push(plan.messages[i].class_name.clone());
            parent = graph.unit(file).messages[i].parent;
        }
        if let Some(wrapper) = &plan.wrapper_class {
            chain.push(wrapper.clone());
        }
        chain.reverse();
        chain
    }

    /// The value-object class generated for a message.
    pub fn message_class(&self, graph: &SchemaGraph, id: MessageId) -> ClassName {
        let mut path = self.enclosing(graph, id.file, graph.message(id).parent);
        path.push(self.message(id).class_name.clone());
        ClassName::new(&self.file(id.file).vo_package, path)
    }

    pub fn enum_class(&self, graph: &SchemaGraph, id: EnumId) -> ClassName {
        let mut path = self.enclosing(graph, id.file, graph.enum_type(id).parent);
        path.push(self.enum_plan(id).class_name.clone());
        ClassName::new(&self.file(id.file).vo_package, path)
    }

    fn proto_class(&self, file: FileId, type_name: &[String]) -> ClassName {
        let plan = self.file(file);
        let path = plan.proto_outer_class.iter().cloned().chain(type_name.iter().cloned()).collect();
        ClassName::new(&plan.proto_package, path)
    }

    /// The protobuf-java class for a message.
    pub fn proto_message_class(&self, graph: &SchemaGraph, id: MessageId) -> ClassName {
        self.proto_class(id.file, &graph.message(id).type_name)
    }

    pub fn proto_enum_class(&self, graph: &SchemaGraph, id: EnumId) -> ClassName {
        self.proto_class(id.file, &graph.enum_type(id).type_name)
    }

    pub fn converter_class(&self, params: &Params, file: FileId) -> ClassName {
        ClassName::library(&params.converter_package, &self.file(file).converter_class)
    }
}

/// The naming pass. Files are visited in a fixed order (files to generate
/// first, in request order, then the rest) so earlier files keep the
/// unsuffixed names.
pub struct Allocator<'a> {
    graph:  &'a SchemaGraph,
    params: &'a Params,
}

impl<'a> Allocator<'a> {
    pub fn new(graph: &'a SchemaGraph, params: &'a Params) -> Self {
        Allocator { graph, params }
    }

    pub fn allocate(&self, gen_files: &[FileId]) -> Allocation {
        let mut order: Vec<FileId> = gen_files.to_vec();
        for unit in self.graph.units() {
            if !order.contains(&unit.id) {
                order.push(unit.id);
            }
        }

        let mut packages = NameRegistry::new();
        let mut converters = NameRegistry::with_reserved();
        let mut files: Vec<Option<FilePlan>> = vec![None; self.graph.units().len()];
        for id in order {
            let plan = self.plan_file(self.graph.unit(id), &mut packages, &mut converters);
            debug!(file = %self.graph.unit(id).name, package = %plan.vo_package, converter = %plan.converter_class, "allocated names");
            files[id.0] = Some(plan);
        }
        Allocation { files: files.into_iter().flatten().collect() }
    }

    fn plan_file(&self, unit: &SchemaUnit, packages: &mut NameRegistry, converters: &mut NameRegistry) -> FilePlan {
        // 1) Value-object package, unique across the run
        let source = if unit.package.is_empty() { unit.base_name() } else { unit.package.as_str() };
        let suffix = java_package_suffix(source);
        let vo_package = if suffix.is_empty() {
            packages.claim(&self.params.vo_package)
        } else {
            packages.claim(&format!("{}.{}", self.params.vo_package, suffix))
        };

        // 2) Converter class, unique within the converter package
        let base = unit
            .java
            .outer_classname
            .clone()
            .or_else(|| unit.package.rsplit('.').next().filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| unit.base_name().to_string());
        let strip = base.len() > 2 && base.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("pb"));
        let base = if strip { base[2..].to_string() } else { base };
        let converter_class = converters.claim(&format!("{}Converter", camel_case(&base)));

        // 3) protobuf-java naming
        let proto_package = unit.java.package.clone().unwrap_or_else(|| unit.package.clone());
        let proto_outer_class = if unit.java.multiple_files {
            None
        } else {
            Some(unit.java.outer_classname.clone().unwrap_or_else(|| {
                let outer = proto_java_camel(unit.base_name());
                let clashes = unit.messages.iter().any(|m| m.name == outer) || unit.enums.iter().any(|e| e.name == outer);
                if clashes {
                    format!("{}OuterClass", outer)
                } else {
                    outer
                }
            }))
        };

        // 4) Top-level classes
        let mut top = NameRegistry::with_reserved();
        let mut message_names: Vec<Option<String>> = vec![None; unit.messages.len()];
        let mut enum_names: Vec<Option<String>> = vec![None; unit.enums.len()];
        for (i, message) in unit.top_level_messages() {
            if !message.map_entry {
                message_names[i] = Some(top.claim(&message.name));
            }
        }
        for (i, e) in unit.top_level_enums() {
            enum_names[i] = Some(top.claim(&e.name));
        }
        let extensions_class = if unit.extensions.is_empty() {
            None
        } else {
            Some(top.claim(&format!("{}Extensions", camel_case(unit.base_name()))))
        };
        let wrapper_class = match self.params.layout {
            Layout::Type => None,
            Layout::File => Some(top.claim(&format!("{}Beans", camel_case(unit.base_name())))),
        };
        let mut holder = NameRegistry::with_reserved();
        let extensions = unit.extensions.iter().map(|ext| extension_plan(ext, &mut holder)).collect();

        // 5) Per message, in pre-order so a parent names its children first
        let mut methods = NameRegistry::with_reserved();
        methods.reserve(OBJECT_METHODS);
        let mut messages = Vec::with_capacity(unit.messages.len());
        for (i, message) in unit.messages.iter().enumerate() {
            let class_name = message_names[i].clone().unwrap_or_else(|| message.name.clone());

            let mut scope = NameRegistry::with_reserved();
            scope.reserve(self.ancestors(unit, i, &message_names));
            for &n in &message.nested {
                if !unit.messages[n].map_entry {
                    message_names[n] = Some(scope.claim(&unit.messages[n].name));
                }
            }
            for &e in &message.enums {
                enum_names[e] = Some(scope.claim(&unit.enums[e].name));
            }

            let (fields, oneofs, extensions) = plan_members(message, &mut scope);
            let stem = camel_case(&message.type_name.join(""));
            let converter = ConverterPlan {
                decode: methods.claim(&format!("to{}", stem)),
                encode: methods.claim(&format!("to{}Pb", stem)),
                bytes:  methods.claim(&format!("to{}Bytes", stem)),
            };
            messages.push(MessagePlan { class_name, fields, oneofs, extensions, converter });
        }

        // 6) Enum constants
        let enums = unit
            .enums
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut constants = NameRegistry::with_reserved();
                constants.reserve(ENUM_MEMBERS);
                EnumPlan {
                    class_name: enum_names[i].clone().unwrap_or_else(|| e.name.clone()),
                    constants:  e.values.iter().map(|v| constants.claim(&v.name)).collect(),
                }
            })
            .collect();

        FilePlan {
            vo_package,
            converter_class,
            wrapper_class,
            extensions_class,
            extensions,
            proto_package,
            proto_outer_class,
            messages,
            enums,
        }
    }

    /// Class names of a message and everything enclosing it; Java forbids a
    /// nested class reusing any of them.
    fn ancestors(&self, unit: &SchemaUnit, index: usize, names: &[Option<String>]) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = Some(index);
        while let Some(i) = cur {
            out.push(names[i].clone().unwrap_or_else(|| unit.messages[i].name.clone()));
            cur = unit.messages[i].parent;
        }
        out
    }
}

fn extension_plan(ext: &FieldSlot, names: &mut NameRegistry) -> ExtensionPlan {
    let constant = upper_snake_case(&ext.name);
    ExtensionPlan {
        number_const:   names.claim(&format!("{}_FIELD_NUMBER", constant)),
        extendee_const: names.claim(&format!("{}_EXTENDEE", constant)),
    }
}

/// Names inside one message class. `scope` holds the nested class names
/// claimed so far; union types are added to it.
fn plan_members(
    message: &MessageType,
    scope: &mut NameRegistry,
) -> (Vec<MemberPlan>, Vec<Option<OneofPlan>>, Vec<ExtensionPlan>) {
    let mut members = NameRegistry::with_reserved();
    members.reserve(OBJECT_METHODS);

    let mut oneofs: Vec<Option<OneofPlan>> = message
        .oneofs
        .iter()
        .map(|o| {
            if o.synthetic {
                return None;
            }
            let stem = camel_case(&o.name);
            Some(OneofPlan {
                field:             String::new(),
                iface:             scope.claim(&stem),
                case_enum:         scope.claim(&format!("{}Case", stem)),
                case_getter:       String::new(),
                not_set:           String::new(),
                proto_case_getter: format!("get{}Case", proto_java_camel(&o.name)),
                proto_not_set:     format!("{}_NOT_SET", o.name.to_uppercase()),
                variants:          Vec::new(),
            })
        })
        .collect();

    let mut fields: Vec<MemberPlan> = Vec::with_capacity(message.fields.len());
    for field in &message.fields {
        let group = message.variant_group(field);
        let plan = match group {
            Some(g) => oneofs.get_mut(g.index).and_then(Option::as_mut),
            None => None,
        };
        let ident = match (group, plan) {
            (Some(group), Some(plan)) => {
                let stem = camel_case(&group.name);
                if plan.variants.is_empty() {
                    plan.field = members.claim(&lower_camel_case(&group.name));
                    plan.case_getter = members.claim(&format!("get{}Case", stem));
                }
                let field_stem = camel_case(&field.name);
                plan.variants.push(VariantPlan {
                    field_index:         field.index,
                    wrapper:             scope.claim(&format!("{}{}", stem, field_stem)),
                    case_constant:       String::new(),
                    setter:              members.claim(&format!("set{}", field_stem)),
                    getter:              members.claim(&format!("get{}", field_stem)),
                    proto_case_constant: field.name.to_uppercase(),
                });
                NameRegistry::with_reserved().claim(&lower_camel_case(&field.name))
            }
            _ => members.claim(&lower_camel_case(&field.name)),
        };
        fields.push(MemberPlan {
            field:          ident,
            number_const:   String::new(),
            default_const:  None,
            proto_accessor: proto_java_camel(&field.name),
        });
    }

    for (plan, field) in fields.iter_mut().zip(&message.fields) {
        plan.number_const = members.claim(&format!("{}_FIELD_NUMBER", upper_snake_case(&field.name)));
    }
    for (plan, field) in fields.iter_mut().zip(&message.fields) {
        if field.default_value.is_some() && !field.is_repeated() {
            plan.default_const = Some(members.claim(&format!("DEFAULT_{}", upper_snake_case(&field.name))));
        }
    }
    let extensions = message.extensions.iter().map(|ext| extension_plan(ext, &mut members)).collect();

    // Discriminant constants live in their own enum.
    for (oneof, plan) in message.oneofs.iter().zip(oneofs.iter_mut()) {
        let Some(plan) = plan else { continue };
        let mut constants = NameRegistry::with_reserved();
        constants.reserve(ENUM_MEMBERS);
        for variant in plan.variants.iter_mut() {
            variant.case_constant = constants.claim(&upper_snake_case(&message.fields[variant.field_index].name));
        }
        plan.not_set = constants.claim(&format!("{}_NOT_SET", upper_snake_case(&oneof.name)));
    }

    (fields, oneofs, extensions)
}
