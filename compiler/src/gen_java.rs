use protobean_schema::{FieldSlot, FileId, MessageType, OneofGroup, SchemaUnit};
use tracing::debug;

use crate::{
    allocate::{ExtensionPlan, FilePlan, MemberPlan, OneofPlan},
    classify::{classify, ClassifiedField, FieldKind, ScalarKind, ValueType},
    compiler::Context,
    emit::{Artifact, ClassName, CodeWriter, ImportSet},
    error::BeanError,
    utils::{java_path, quote},
};

pub const GENERATED_BY: &str = "// Code generated by protoc-gen-bean. DO NOT EDIT.";

/// Highest field number protobuf allows, printed as `max` in range comments.
const MAX_FIELD_NUMBER: i32 = 536_870_911;

/// Package line, generated-code header and sorted imports.
pub fn prologue(package: &str, unit: &SchemaUnit, imports: &ImportSet) -> String {
    let mut out = String::new();
    if !package.is_empty() {
        out.push_str(&format!("package {};\n\n", package));
    }
    out.push_str(GENERATED_BY);
    out.push('\n');
    out.push_str(&format!("// source: {}\n", unit.name));
    if unit.deprecated {
        out.push_str(&format!("// {} is marked deprecated.\n", unit.name));
    }
    out.push('\n');

    let imports = imports.lines();
    for line in &imports {
        out.push_str(line);
        out.push('\n');
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    out
}

/// The value-object artifacts of one file.
pub fn generate_beans(ctx: &Context<'_>, file: FileId) -> Result<Vec<Artifact>, BeanError> {
    let unit = ctx.graph.unit(file);
    let plan = ctx.alloc.file(file);
    let messages: Vec<usize> = unit.top_level_messages().filter(|(_, m)| !m.map_entry).map(|(i, _)| i).collect();
    let enums: Vec<usize> = unit.top_level_enums().map(|(i, _)| i).collect();

    let mut artifacts = Vec::new();
    match &plan.wrapper_class {
        Some(wrapper) => {
            if messages.is_empty() && enums.is_empty() && unit.extensions.is_empty() {
                return Ok(artifacts);
            }
            let mut gen = BeanWriter::new(ctx, unit, plan);
            gen.imports.declare(wrapper);
            for &i in &messages {
                gen.declare_message(i, true);
            }
            for &e in &enums {
                gen.imports.declare_nested(&plan.enums[e].class_name);
            }
            if let Some(holder) = &plan.extensions_class {
                gen.imports.declare_nested(holder);
            }

            let mut w = CodeWriter::new();
            w.annotated(&[], "public final class ", wrapper, " {");
            w.body("}", |w| {
                w.line(format!("private {}() {{}}", wrapper));
                w.blank();
                for &i in &messages {
                    gen.message(w, i, "public static ")?;
                    w.blank();
                }
                for &e in &enums {
                    gen.enumeration(w, e)?;
                    w.blank();
                }
                gen.extensions_holder(w, "public static ")
            })?;
            artifacts.push(gen.finish(wrapper, w));
        }
        None => {
            for &i in &messages {
                let class_name = &plan.messages[i].class_name;
                let mut gen = BeanWriter::new(ctx, unit, plan);
                gen.imports.declare(class_name);
                gen.declare_message(i, false);
                let mut w = CodeWriter::new();
                gen.message(&mut w, i, "public ")?;
                artifacts.push(gen.finish(class_name, w));
            }
            for &e in &enums {
                let class_name = &plan.enums[e].class_name;
                let mut gen = BeanWriter::new(ctx, unit, plan);
                gen.imports.declare(class_name);
                let mut w = CodeWriter::new();
                gen.enumeration(&mut w, e)?;
                artifacts.push(gen.finish(class_name, w));
            }
            if let Some(holder) = &plan.extensions_class {
                let mut gen = BeanWriter::new(ctx, unit, plan);
                gen.imports.declare(holder);
                let mut w = CodeWriter::new();
                gen.extensions_holder(&mut w, "public ")?;
                artifacts.push(gen.finish(holder, w));
            }
        }
    }

    debug!(file = %unit.name, artifacts = artifacts.len(), "generated beans");
    Ok(artifacts)
}

struct BeanWriter<'a> {
    ctx:     &'a Context<'a>,
    unit:    &'a SchemaUnit,
    plan:    &'a FilePlan,
    imports: ImportSet,
}

impl<'a> BeanWriter<'a> {
    fn new(ctx: &'a Context<'a>, unit: &'a SchemaUnit, plan: &'a FilePlan) -> Self {
        BeanWriter { ctx, unit, plan, imports: ImportSet::new(&plan.vo_package) }
    }

    fn finish(self, class_name: &str, body: CodeWriter) -> Artifact {
        let prologue = prologue(&self.plan.vo_package, self.unit, &self.imports);
        Artifact::assemble(java_path(&self.plan.vo_package, class_name), &self.unit.name, prologue, body)
    }

    /// Registers every class declared inside a message, so references to
    /// top-level classes of the same simple name get qualified.
    fn declare_message(&mut self, index: usize, nested: bool) {
        let (unit, file_plan) = (self.unit, self.plan);
        let message = &unit.messages[index];
        let plan = &file_plan.messages[index];
        if nested {
            self.imports.declare_nested(&plan.class_name);
        }
        for oneof in plan.oneofs.iter().flatten() {
            self.imports.declare_nested(&oneof.iface);
            self.imports.declare_nested(&oneof.case_enum);
            for variant in &oneof.variants {
                self.imports.declare_nested(&variant.wrapper);
            }
        }
        for &e in &message.enums {
            self.imports.declare_nested(&file_plan.enums[e].class_name);
        }
        for &n in &message.nested {
            if !unit.messages[n].map_entry {
                self.declare_message(n, true);
            }
        }
    }

    fn leading(&self, w: &mut CodeWriter, path: &[i32]) {
        w.comment(self.unit.comments_at(path).and_then(|c| c.leading.as_deref()));
    }

    fn trailing(&self, w: &mut CodeWriter, path: &[i32]) {
        w.comment(self.unit.comments_at(path).and_then(|c| c.trailing.as_deref()));
    }

    fn message(&mut self, w: &mut CodeWriter, index: usize, modifiers: &str) -> Result<(), BeanError> {
        let (unit, file_plan) = (self.unit, self.plan);
        let message = &unit.messages[index];
        let plan = &file_plan.messages[index];
        let fields = message
            .fields
            .iter()
            .map(|f| classify(self.ctx, Some(message), f))
            .collect::<Result<Vec<_>, _>>()?;

        self.leading(w, &message.path);
        if message.deprecated {
            w.line("@Deprecated");
        }
        w.annotated(&message.path, &format!("{}class ", modifiers), &plan.class_name, " {");
        w.body("}", |w| {
            self.trailing(w, &message.path);

            // Fields, with each oneof expanded in place of its first member
            for (field, member) in fields.iter().zip(&plan.fields) {
                match field.kind {
                    FieldKind::OneofVariant { oneof, .. } => {
                        let Some(oneof_plan) = plan.oneofs[oneof].as_ref() else { continue };
                        if oneof_plan.variants.first().map(|v| v.field_index) == Some(field.slot.index) {
                            self.oneof(w, &message.oneofs[oneof], oneof_plan, &fields, &plan.fields)?;
                            w.blank();
                        }
                    }
                    _ => {
                        self.field(w, field, member);
                        w.blank();
                    }
                }
            }

            // Constants
            for (field, member) in fields.iter().zip(&plan.fields) {
                w.line(format!("public static final int {} = {};", member.number_const, field.slot.number));
            }
            for (field, member) in fields.iter().zip(&plan.fields) {
                let (Some(constant), Some(value)) = (&member.default_const, field.value_type()) else { continue };
                let Some(literal) = field.render_default(self.ctx, &mut self.imports) else { continue };
                let ty = value.render(self.ctx, &mut self.imports, false);
                w.line(format!("public static final {} {} = {};", ty, constant, literal));
            }
            w.blank();
            self.extension_constants(w, Some(message), &message.extensions, &plan.extensions)?;
            for &(start, end) in &message.extension_ranges {
                match end - 1 {
                    last if last >= MAX_FIELD_NUMBER => w.line(format!("// extensions {} to max;", start)),
                    last if last == start => w.line(format!("// extensions {};", start)),
                    last => w.line(format!("// extensions {} to {};", start, last)),
                }
            }
            w.blank();

            // Accessors
            for (group, oneof_plan) in message.oneofs.iter().zip(&plan.oneofs) {
                if let Some(oneof_plan) = oneof_plan {
                    self.oneof_accessors(w, group, oneof_plan, &fields, &plan.fields)?;
                }
            }
            self.to_string(w, &plan.class_name, &fields, &plan.fields, &plan.oneofs)?;
            w.blank();

            for &e in &message.enums {
                self.enumeration(w, e)?;
                w.blank();
            }
            for &n in &message.nested {
                if !unit.messages[n].map_entry {
                    self.message(w, n, "public static ")?;
                    w.blank();
                }
            }
            Ok(())
        })
    }

    fn field(&mut self, w: &mut CodeWriter, field: &ClassifiedField<'_>, member: &MemberPlan) {
        self.leading(w, &field.slot.path);
        w.line(format!("// {}", field.describe(self.unit.syntax)));
        if field.slot.deprecated {
            w.line("@Deprecated");
        }
        let ty = field.render_type(self.ctx, &mut self.imports);
        let suffix = match field.initializer(self.ctx, &mut self.imports, member.default_const.as_deref()) {
            Some(init) => format!(" = {};", init),
            None => ";".to_string(),
        };
        w.annotated(&field.slot.path, &format!("public {} ", ty), &member.field, &suffix);
        self.trailing(w, &field.slot.path);
    }

    /// Discriminant enum, union interface, one wrapper per variant and the
    /// union field itself.
    fn oneof(
        &mut self,
        w: &mut CodeWriter,
        group: &OneofGroup,
        plan: &OneofPlan,
        fields: &[ClassifiedField<'_>],
        members: &[MemberPlan],
    ) -> Result<(), BeanError> {
        self.leading(w, &group.path);
        w.block(&format!("public enum {} {{", plan.case_enum), "}", |w| {
            for variant in &plan.variants {
                w.line(format!("{}({}),", variant.case_constant, fields[variant.field_index].slot.number));
            }
            w.line(format!("{}(0);", plan.not_set));
            w.blank();
            w.line("private final int number;");
            w.blank();
            w.block(&format!("{}(int number) {{", plan.case_enum), "}", |w| {
                w.line("this.number = number;");
                Ok(())
            })?;
            w.blank();
            w.block("public int getNumber() {", "}", |w| {
                w.line("return number;");
                Ok(())
            })?;
            w.blank();
            w.block(&format!("public static {} forNumber(int number) {{", plan.case_enum), "}", |w| {
                w.block("switch (number) {", "}", |w| {
                    for variant in &plan.variants {
                        let number = fields[variant.field_index].slot.number;
                        w.line(format!("case {}: return {};", number, variant.case_constant));
                    }
                    w.line(format!("case 0: return {};", plan.not_set));
                    w.line("default: return null;");
                    Ok(())
                })
            })
        })?;
        w.blank();

        w.block(&format!("public interface {} {{", plan.iface), "}", |w| {
            w.line(format!("{} {}();", plan.case_enum, plan.case_getter));
            Ok(())
        })?;
        w.blank();

        for variant in &plan.variants {
            let field = &fields[variant.field_index];
            let payload = &members[variant.field_index].field;
            let ty = field.render_type(self.ctx, &mut self.imports);
            let shown = self.show(field, payload);

            self.leading(w, &field.slot.path);
            w.line(format!("// {}", field.describe(self.unit.syntax)));
            if field.slot.deprecated {
                w.line("@Deprecated");
            }
            w.block(
                &format!("public static final class {} implements {} {{", variant.wrapper, plan.iface),
                "}",
                |w| {
                    w.annotated(&field.slot.path, &format!("public final {} ", ty), payload, ";");
                    w.blank();
                    w.block(&format!("public {}({} {}) {{", variant.wrapper, ty, payload), "}", |w| {
                        w.line(format!("this.{0} = {0};", payload));
                        Ok(())
                    })?;
                    w.blank();
                    w.line("@Override");
                    w.block(&format!("public {} {}() {{", plan.case_enum, plan.case_getter), "}", |w| {
                        w.line(format!("return {}.{};", plan.case_enum, variant.case_constant));
                        Ok(())
                    })?;
                    w.blank();
                    w.line("@Override");
                    w.block("public String toString() {", "}", |w| {
                        w.line(format!("return {} + {} + \"}}\";", quote(&format!("{}{{{}=", variant.wrapper, payload)), shown));
                        Ok(())
                    })
                },
            )?;
            w.blank();
        }

        w.annotated(&group.path, &format!("public {} ", plan.iface), &plan.field, ";");
        Ok(())
    }

    fn oneof_accessors(
        &mut self,
        w: &mut CodeWriter,
        group: &OneofGroup,
        plan: &OneofPlan,
        fields: &[ClassifiedField<'_>],
        members: &[MemberPlan],
    ) -> Result<(), BeanError> {
        w.annotated(&group.path, &format!("public {} ", plan.case_enum), &plan.case_getter, "() {");
        w.body("}", |w| {
            w.line(format!(
                "return {0} == null ? {1}.{2} : {0}.{3}();",
                plan.field, plan.case_enum, plan.not_set, plan.case_getter
            ));
            Ok(())
        })?;
        w.blank();

        for variant in &plan.variants {
            let field = &fields[variant.field_index];
            let member = &members[variant.field_index];
            let ty = field.render_type(self.ctx, &mut self.imports);
            let fallback = field.getter_default(self.ctx, &mut self.imports, member.default_const.as_deref());

            w.block(&format!("public void {}({} {}) {{", variant.setter, ty, member.field), "}", |w| {
                w.line(format!("this.{} = new {}({});", plan.field, variant.wrapper, member.field));
                Ok(())
            })?;
            w.blank();
            w.block(&format!("public {} {}() {{", ty, variant.getter), "}", |w| {
                w.line(format!(
                    "return {0} instanceof {1} ? (({1}) {0}).{2} : {3};",
                    plan.field, variant.wrapper, member.field, fallback
                ));
                Ok(())
            })?;
            w.blank();
        }
        Ok(())
    }

    /// Java expression printing `expr` inside `toString`.
    fn show(&mut self, field: &ClassifiedField<'_>, expr: &str) -> String {
        match field.kind {
            FieldKind::Scalar { value: ScalarKind::String, repeated: false }
            | FieldKind::OneofVariant { payload: ValueType::Scalar(ScalarKind::String), .. } => {
                format!("\"'\" + {} + \"'\"", expr)
            }
            FieldKind::Scalar { value: ScalarKind::Bytes, repeated: false }
            | FieldKind::OneofVariant { payload: ValueType::Scalar(ScalarKind::Bytes), .. } => {
                let arrays = self.imports.reference(&ClassName::library("java.util", "Arrays"));
                format!("{}.toString({})", arrays, expr)
            }
            FieldKind::Scalar { .. }
            | FieldKind::Message { .. }
            | FieldKind::Enum { .. }
            | FieldKind::Map { .. }
            | FieldKind::OneofVariant { .. }
            | FieldKind::Extension { .. } => expr.to_string(),
        }
    }

    fn to_string(
        &mut self,
        w: &mut CodeWriter,
        class_name: &str,
        fields: &[ClassifiedField<'_>],
        members: &[MemberPlan],
        oneofs: &[Option<OneofPlan>],
    ) -> Result<(), BeanError> {
        let mut parts: Vec<(String, String)> = Vec::new();
        let mut seen_oneofs = Vec::new();
        for (field, member) in fields.iter().zip(members) {
            match field.kind {
                FieldKind::OneofVariant { oneof, .. } => {
                    let Some(plan) = oneofs.get(oneof).and_then(Option::as_ref) else { continue };
                    if !seen_oneofs.contains(&oneof) {
                        seen_oneofs.push(oneof);
                        parts.push((plan.field.clone(), plan.field.clone()));
                    }
                }
                _ => parts.push((member.field.clone(), self.show(field, &member.field))),
            }
        }

        w.line("@Override");
        w.block("public String toString() {", "}", |w| {
            if parts.is_empty() {
                w.line(format!("return {};", quote(&format!("{}{{}}", class_name))));
                return Ok(());
            }
            w.line(format!("return {}", quote(&format!("{}{{", class_name))));
            for (i, (label, expr)) in parts.iter().enumerate() {
                let sep = if i == 0 { "" } else { ", " };
                w.line(format!("    + {} + {}", quote(&format!("{}{}=", sep, label)), expr));
            }
            w.line("    + \"}\";");
            Ok(())
        })
    }

    fn enumeration(&mut self, w: &mut CodeWriter, index: usize) -> Result<(), BeanError> {
        let (unit, file_plan) = (self.unit, self.plan);
        let e = &unit.enums[index];
        let plan = &file_plan.enums[index];

        self.leading(w, &e.path);
        if e.deprecated {
            w.line("@Deprecated");
        }
        w.annotated(&e.path, "public enum ", &plan.class_name, " {");
        w.body("}", |w| {
            self.trailing(w, &e.path);
            if e.values.is_empty() {
                w.line(";");
            }
            for (i, (value, constant)) in e.values.iter().zip(&plan.constants).enumerate() {
                self.leading(w, &value.path);
                if let Some(first) = value.alias_of {
                    w.line(format!("// Duplicate value: {}, alias of {}", value.number, plan.constants[first]));
                }
                if value.deprecated {
                    w.line("@Deprecated");
                }
                let end = if i + 1 == e.values.len() { ';' } else { ',' };
                w.annotated(&value.path, "", constant, &format!("({}){}", value.number, end));
                self.trailing(w, &value.path);
            }
            w.blank();

            w.line("private final int number;");
            w.blank();
            w.block(&format!("{}(int number) {{", plan.class_name), "}", |w| {
                w.line("this.number = number;");
                Ok(())
            })?;
            w.blank();
            w.block("public int getNumber() {", "}", |w| {
                w.line("return number;");
                Ok(())
            })?;
            w.blank();

            let fallback = plan.constants.first().map(String::as_str).unwrap_or("null");
            w.block(&format!("public static {} forNumber(int number) {{", plan.class_name), "}", |w| {
                w.block("switch (number) {", "}", |w| {
                    for (value, constant) in e.values.iter().zip(&plan.constants) {
                        if value.alias_of.is_none() {
                            w.line(format!("case {}: return {};", value.number, constant));
                        }
                    }
                    w.line(format!("default: return {};", fallback));
                    Ok(())
                })
            })
        })
    }

    fn extension_constants(
        &mut self,
        w: &mut CodeWriter,
        scope: Option<&MessageType>,
        extensions: &[FieldSlot],
        plans: &[ExtensionPlan],
    ) -> Result<(), BeanError> {
        for (ext, plan) in extensions.iter().zip(plans) {
            let field = classify(self.ctx, scope, ext)?;
            let FieldKind::Extension { extendee, .. } = field.kind else { continue };
            let target = &self.ctx.graph.message(extendee).full_name;

            self.leading(w, &ext.path);
            w.line(format!("// extend {} {{ {} }}", target.trim_start_matches('.'), field.describe(self.unit.syntax)));
            w.annotated(&ext.path, "public static final int ", &plan.number_const, &format!(" = {};", ext.number));
            w.line(format!(
                "public static final String {} = {};",
                plan.extendee_const,
                quote(target.trim_start_matches('.'))
            ));
            w.blank();
        }
        Ok(())
    }

    fn extensions_holder(&mut self, w: &mut CodeWriter, modifiers: &str) -> Result<(), BeanError> {
        let (unit, plan) = (self.unit, self.plan);
        let Some(holder) = &plan.extensions_class else { return Ok(()) };
        w.line(format!("{}final class {} {{", modifiers, holder));
        w.body("}", |w| {
            w.line(format!("private {}() {{}}", holder));
            w.blank();
            self.extension_constants(w, None, &unit.extensions, &plan.extensions)
        })
    }
}
