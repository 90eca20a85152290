use protobean_schema::{FileId, MessageId, SchemaUnit, Syntax};
use tracing::debug;

use crate::{
    allocate::{FilePlan, MemberPlan, OneofPlan},
    classify::{classify, map_class, ClassifiedField, FieldKind, ScalarKind, ValueType},
    compiler::Context,
    emit::{Artifact, ClassName, CodeWriter, ImportSet},
    error::BeanError,
    gen_java::prologue,
    utils::java_path,
};

fn byte_string() -> ClassName {
    ClassName::library("com.google.protobuf", "ByteString")
}

fn parse_error() -> ClassName {
    ClassName::library("com.google.protobuf", "InvalidProtocolBufferException")
}

/// The converter artifact of one file, if it declares any messages.
pub fn generate_converter(ctx: &Context<'_>, file: FileId) -> Result<Option<Artifact>, BeanError> {
    let unit = ctx.graph.unit(file);
    let plan = ctx.alloc.file(file);
    let messages: Vec<usize> = (0..unit.messages.len()).filter(|&i| !unit.messages[i].map_entry).collect();
    if messages.is_empty() {
        return Ok(None);
    }

    let class = ctx.alloc.converter_class(ctx.params, file);
    let mut gen = ConverterWriter { ctx, unit, plan, file, imports: ImportSet::new(&class.package) };
    gen.imports.declare(class.simple());

    let mut w = CodeWriter::new();
    w.annotated(&[], "public class ", class.simple(), " {");
    w.body("}", |w| {
        for &i in &messages {
            let id = MessageId { file, index: i };
            if unit.messages[i].is_top_level() {
                gen.parse_bytes(w, id)?;
                w.blank();
            }
            gen.decode(w, id)?;
            w.blank();
            gen.encode(w, id)?;
            w.blank();
            if unit.messages[i].is_top_level() {
                gen.encode_bytes(w, id)?;
                w.blank();
            }
        }
        Ok(())
    })?;

    let prologue = prologue(&class.package, unit, &gen.imports);
    debug!(file = %unit.name, converter = %class.qualified(), "generated converter");
    Ok(Some(Artifact::assemble(java_path(&class.package, class.simple()), &unit.name, prologue, w)))
}

struct ConverterWriter<'a> {
    ctx:     &'a Context<'a>,
    unit:    &'a SchemaUnit,
    plan:    &'a FilePlan,
    file:    FileId,
    imports: ImportSet,
}

impl<'a> ConverterWriter<'a> {
    /// Proto3 enums are open: protobuf-java exposes their raw numbers
    /// through `*Value` accessors.
    fn open_enums(&self) -> bool {
        self.unit.syntax == Syntax::Proto3
    }

    fn accessor_suffix(&self, value: ValueType) -> &'static str {
        match value {
            ValueType::Enum(_) if self.open_enums() => "Value",
            _ => "",
        }
    }

    fn bean_class(&mut self, id: MessageId) -> String {
        let class = self.ctx.alloc.message_class(self.ctx.graph, id);
        self.imports.reference(&class)
    }

    fn proto_class(&mut self, id: MessageId) -> String {
        let class = self.ctx.alloc.proto_message_class(self.ctx.graph, id);
        self.imports.reference(&class)
    }

    /// Calls a converter method, through the owning converter class when
    /// the message lives in another file.
    fn call(&mut self, id: MessageId, method: &str, arg: &str) -> String {
        if id.file == self.file {
            format!("{}({})", method, arg)
        } else {
            let class = self.ctx.alloc.converter_class(self.ctx.params, id.file);
            format!("{}.{}({})", self.imports.reference(&class), method, arg)
        }
    }

    /// Type of one element as protobuf-java hands it out.
    fn proto_element(&mut self, value: ValueType) -> String {
        match value {
            ValueType::Scalar(ScalarKind::Bytes) => self.imports.reference(&byte_string()),
            ValueType::Scalar(s) => s.boxed().to_string(),
            ValueType::Message(id) => self.proto_class(id),
            ValueType::Enum(_) if self.open_enums() => "Integer".to_string(),
            ValueType::Enum(id) => {
                let class = self.ctx.alloc.proto_enum_class(self.ctx.graph, id);
                self.imports.reference(&class)
            }
        }
    }

    /// Bean form of a value read from protobuf-java through an accessor
    /// carrying [`Self::accessor_suffix`].
    fn decode_value(&mut self, value: ValueType, expr: &str) -> String {
        match value {
            ValueType::Scalar(ScalarKind::Bytes) => format!("{}.toByteArray()", expr),
            ValueType::Scalar(_) => expr.to_string(),
            ValueType::Message(id) => {
                let method = self.ctx.alloc.message(id).converter.decode.clone();
                self.call(id, &method, expr)
            }
            ValueType::Enum(id) => {
                let class = self.ctx.alloc.enum_class(self.ctx.graph, id);
                let class = self.imports.reference(&class);
                if self.open_enums() {
                    format!("{}.forNumber({})", class, expr)
                } else {
                    format!("{}.forNumber({}.getNumber())", class, expr)
                }
            }
        }
    }

    /// protobuf-java form of a bean value, for a setter carrying
    /// [`Self::accessor_suffix`].
    fn encode_value(&mut self, value: ValueType, expr: &str) -> String {
        match value {
            ValueType::Scalar(ScalarKind::Bytes) => {
                format!("{}.copyFrom({})", self.imports.reference(&byte_string()), expr)
            }
            ValueType::Scalar(_) => expr.to_string(),
            ValueType::Message(id) => {
                let method = self.ctx.alloc.message(id).converter.encode.clone();
                self.call(id, &method, expr)
            }
            ValueType::Enum(_) if self.open_enums() => format!("{}.getNumber()", expr),
            ValueType::Enum(id) => {
                let class = self.ctx.alloc.proto_enum_class(self.ctx.graph, id);
                format!("{}.forNumber({}.getNumber())", self.imports.reference(&class), expr)
            }
        }
    }

    fn classified(&self, id: MessageId) -> Result<Vec<ClassifiedField<'a>>, BeanError> {
        let unit: &'a SchemaUnit = self.unit;
        let message = &unit.messages[id.index];
        message.fields.iter().map(|f| classify(self.ctx, Some(message), f)).collect()
    }

    /// `toX(byte[])`: parse, convert, and report parse failures as `null`.
    fn parse_bytes(&mut self, w: &mut CodeWriter, id: MessageId) -> Result<(), BeanError> {
        let bean = self.bean_class(id);
        let proto = self.proto_class(id);
        let error = self.imports.reference(&parse_error());
        let ctx = self.ctx;
        let method = &ctx.alloc.message(id).converter.decode;

        w.block(&format!("public static {} {}(byte[] data) {{", bean, method), "}", |w| {
            w.block("try {", &format!("}} catch ({} e) {{", error), |w| {
                w.line(format!("return {}({}.parseFrom(data));", method, proto));
                Ok(())
            })?;
            w.body("}", |w| {
                w.line("e.printStackTrace();");
                w.line("return null;");
                Ok(())
            })
        })
    }

    fn decode(&mut self, w: &mut CodeWriter, id: MessageId) -> Result<(), BeanError> {
        let (unit, file_plan) = (self.unit, self.plan);
        let message = &unit.messages[id.index];
        let plan = &file_plan.messages[id.index];
        let fields = self.classified(id)?;
        let bean = self.bean_class(id);
        let proto = self.proto_class(id);

        w.annotated(&message.path, &format!("public static {} ", bean), &plan.converter.decode, &format!("({} pb) {{", proto));
        w.body("}", |w| {
            w.block("if (pb == null) {", "}", |w| {
                w.line("return null;");
                Ok(())
            })?;
            w.line(format!("{0} bean = new {0}();", bean));
            for (field, member) in fields.iter().zip(&plan.fields) {
                match field.kind {
                    FieldKind::OneofVariant { oneof, .. } => {
                        let Some(oneof_plan) = plan.oneofs[oneof].as_ref() else { continue };
                        if oneof_plan.variants.first().map(|v| v.field_index) == Some(field.slot.index) {
                            self.decode_oneof(w, oneof_plan, &fields, &plan.fields)?;
                        }
                    }
                    _ => self.decode_field(w, field, member)?,
                }
            }
            w.line("return bean;");
            Ok(())
        })
    }

    fn decode_field(&mut self, w: &mut CodeWriter, field: &ClassifiedField<'_>, member: &MemberPlan) -> Result<(), BeanError> {
        let stem = &member.proto_accessor;
        let target = &member.field;
        match field.kind {
            FieldKind::Scalar { repeated: false, .. }
            | FieldKind::Message { repeated: false, .. }
            | FieldKind::Enum { repeated: false, .. } => {
                let Some(value) = field.value_type() else { return Ok(()) };
                let get = format!("pb.get{}{}()", stem, self.accessor_suffix(value));
                let expr = self.decode_value(value, &get);
                if field.nullable || matches!(value, ValueType::Message(_)) {
                    w.block(&format!("if (pb.has{}()) {{", stem), "}", |w| {
                        w.line(format!("bean.{} = {};", target, expr));
                        Ok(())
                    })?;
                } else {
                    w.line(format!("bean.{} = {};", target, expr));
                }
            }
            FieldKind::Scalar { value, repeated: true } if value != ScalarKind::Bytes => {
                w.line(format!("bean.{}.addAll(pb.get{}List());", target, stem));
            }
            FieldKind::Scalar { repeated: true, .. }
            | FieldKind::Message { repeated: true, .. }
            | FieldKind::Enum { repeated: true, .. } => {
                let Some(value) = field.value_type() else { return Ok(()) };
                let element = self.proto_element(value);
                let item = self.decode_value(value, "item");
                let header = format!("for ({} item : pb.get{}{}List()) {{", element, stem, self.accessor_suffix(value));
                w.block(&header, "}", |w| {
                    w.line(format!("bean.{}.add({});", target, item));
                    Ok(())
                })?;
            }
            FieldKind::Map { value: ValueType::Scalar(s), .. } if s != ScalarKind::Bytes => {
                w.line(format!("bean.{}.putAll(pb.get{}Map());", target, stem));
            }
            FieldKind::Map { key, value } => {
                let entry = self.imports.reference(&map_class().nested("Entry"));
                let element = self.proto_element(value);
                let item = self.decode_value(value, "entry.getValue()");
                let header = format!(
                    "for ({}<{}, {}> entry : pb.get{}{}Map().entrySet()) {{",
                    entry,
                    key.boxed(),
                    element,
                    stem,
                    self.accessor_suffix(value)
                );
                w.block(&header, "}", |w| {
                    w.line(format!("bean.{}.put(entry.getKey(), {});", target, item));
                    Ok(())
                })?;
            }
            FieldKind::OneofVariant { .. } | FieldKind::Extension { .. } => {}
        }
        Ok(())
    }

    fn decode_oneof(
        &mut self,
        w: &mut CodeWriter,
        plan: &OneofPlan,
        fields: &[ClassifiedField<'_>],
        members: &[MemberPlan],
    ) -> Result<(), BeanError> {
        let mut arms = Vec::with_capacity(plan.variants.len());
        for variant in &plan.variants {
            let field = &fields[variant.field_index];
            let Some(value) = field.value_type() else { continue };
            let stem = &members[variant.field_index].proto_accessor;
            let get = format!("pb.get{}{}()", stem, self.accessor_suffix(value));
            let expr = self.decode_value(value, &get);
            arms.push((variant.proto_case_constant.clone(), vec![format!("bean.{}({});", variant.setter, expr)]));
        }
        switch(w, &format!("pb.{}()", plan.proto_case_getter), &arms)
    }

    fn encode(&mut self, w: &mut CodeWriter, id: MessageId) -> Result<(), BeanError> {
        let file_plan = self.plan;
        let plan = &file_plan.messages[id.index];
        let fields = self.classified(id)?;
        let bean = self.bean_class(id);
        let proto = self.proto_class(id);

        w.block(&format!("public static {} {}({} bean) {{", proto, plan.converter.encode, bean), "}", |w| {
            w.block("if (bean == null) {", "}", |w| {
                w.line("return null;");
                Ok(())
            })?;
            w.line(format!("{0}.Builder builder = {0}.newBuilder();", proto));
            for (field, member) in fields.iter().zip(&plan.fields) {
                match field.kind {
                    FieldKind::OneofVariant { oneof, .. } => {
                        let Some(oneof_plan) = plan.oneofs[oneof].as_ref() else { continue };
                        if oneof_plan.variants.first().map(|v| v.field_index) == Some(field.slot.index) {
                            self.encode_oneof(w, oneof_plan, &fields, &plan.fields)?;
                        }
                    }
                    _ => self.encode_field(w, field, member)?,
                }
            }
            w.line("return builder.build();");
            Ok(())
        })
    }

    fn encode_field(&mut self, w: &mut CodeWriter, field: &ClassifiedField<'_>, member: &MemberPlan) -> Result<(), BeanError> {
        let stem = &member.proto_accessor;
        let source = format!("bean.{}", member.field);
        let guarded = |w: &mut CodeWriter, line: String| {
            w.block(&format!("if ({} != null) {{", source), "}", |w| {
                w.line(line);
                Ok(())
            })
        };

        match field.kind {
            FieldKind::Scalar { value, repeated: false } => {
                let line = format!("builder.set{}({});", stem, self.encode_value(ValueType::Scalar(value), &source));
                let primitive = !field.nullable && !matches!(value, ScalarKind::String | ScalarKind::Bytes);
                if primitive {
                    w.line(line);
                } else {
                    guarded(w, line)?;
                }
            }
            FieldKind::Message { repeated: false, .. } | FieldKind::Enum { repeated: false, .. } => {
                let Some(value) = field.value_type() else { return Ok(()) };
                let line = format!("builder.set{}{}({});", stem, self.accessor_suffix(value), self.encode_value(value, &source));
                guarded(w, line)?;
            }
            FieldKind::Scalar { value, repeated: true } if value != ScalarKind::Bytes => {
                guarded(w, format!("builder.addAll{}({});", stem, source))?;
            }
            FieldKind::Scalar { repeated: true, .. }
            | FieldKind::Message { repeated: true, .. }
            | FieldKind::Enum { repeated: true, .. } => {
                let Some(value) = field.value_type() else { return Ok(()) };
                let element = value.render(self.ctx, &mut self.imports, true);
                let item = self.encode_value(value, "item");
                let suffix = self.accessor_suffix(value);
                w.block(&format!("if ({} != null) {{", source), "}", |w| {
                    w.block(&format!("for ({} item : {}) {{", element, source), "}", |w| {
                        w.line(format!("builder.add{}{}({});", stem, suffix, item));
                        Ok(())
                    })
                })?;
            }
            FieldKind::Map { value: ValueType::Scalar(s), .. } if s != ScalarKind::Bytes => {
                guarded(w, format!("builder.putAll{}({});", stem, source))?;
            }
            FieldKind::Map { key, value } => {
                let entry = self.imports.reference(&map_class().nested("Entry"));
                let element = value.render(self.ctx, &mut self.imports, true);
                let item = self.encode_value(value, "entry.getValue()");
                let suffix = self.accessor_suffix(value);
                let header = format!("for ({}<{}, {}> entry : {}.entrySet()) {{", entry, key.boxed(), element, source);
                w.block(&format!("if ({} != null) {{", source), "}", |w| {
                    w.block(&header, "}", |w| {
                        w.line(format!("builder.put{}{}(entry.getKey(), {});", stem, suffix, item));
                        Ok(())
                    })
                })?;
            }
            FieldKind::OneofVariant { .. } | FieldKind::Extension { .. } => {}
        }
        Ok(())
    }

    fn encode_oneof(
        &mut self,
        w: &mut CodeWriter,
        plan: &OneofPlan,
        fields: &[ClassifiedField<'_>],
        members: &[MemberPlan],
    ) -> Result<(), BeanError> {
        let mut arms = Vec::with_capacity(plan.variants.len());
        for variant in &plan.variants {
            let field = &fields[variant.field_index];
            let Some(value) = field.value_type() else { continue };
            let stem = &members[variant.field_index].proto_accessor;
            let getter = format!("bean.{}()", variant.getter);
            let suffix = self.accessor_suffix(value);
            let set = format!("builder.set{}{}({});", stem, suffix, self.encode_value(value, &getter));
            // A wrapper may carry a null reference payload.
            let statements = match value {
                ValueType::Scalar(s) if !matches!(s, ScalarKind::String | ScalarKind::Bytes) => vec![set],
                _ => vec![format!("if ({} != null) {{", getter), format!("    {}", set), "}".to_string()],
            };
            arms.push((variant.case_constant.clone(), statements));
        }
        switch(w, &format!("bean.{}()", plan.case_getter), &arms)
    }

    fn encode_bytes(&mut self, w: &mut CodeWriter, id: MessageId) -> Result<(), BeanError> {
        let bean = self.bean_class(id);
        let ctx = self.ctx;
        let converter = &ctx.alloc.message(id).converter;
        w.block(&format!("public static byte[] {}({} bean) {{", converter.bytes, bean), "}", |w| {
            w.line(format!("return bean == null ? null : {}(bean).toByteArray();", converter.encode));
            Ok(())
        })
    }
}

/// A `switch` over enum constants; each arm runs its lines, then breaks.
fn switch(w: &mut CodeWriter, selector: &str, arms: &[(String, Vec<String>)]) -> Result<(), BeanError> {
    w.block(&format!("switch ({}) {{", selector), "}", |w| {
        for (label, statements) in arms {
            w.line(format!("case {}:", label));
            for statement in statements {
                w.line(format!("    {}", statement));
            }
            w.line("    break;");
        }
        w.line("default:");
        w.line("    break;");
        Ok(())
    })
}
