use std::collections::{BTreeMap, BTreeSet};

use crate::{error::BeanError, naming::is_reserved};

const INDENT: &str = "    ";

/// Packages whose classes generated code names by their simple name.
const LIBRARY_PACKAGES: [&str; 3] = ["java.lang", "java.util", "com.google.protobuf"];

/// Byte span of a generated identifier and the source path it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub path:  Vec<i32>,
    pub begin: usize,
    pub end:   usize,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Output path relative to the plugin's output directory.
    pub path:        String,
    /// The proto file the artifact was generated from.
    pub source:      String,
    pub content:     String,
    pub annotations: Vec<Annotation>,
}

impl Artifact {
    /// Joins a file prologue (package, header comment, imports) with a body
    /// rendered separately, shifting the body's annotations to match.
    pub fn assemble(path: String, source: &str, prologue: String, body: CodeWriter) -> Artifact {
        let offset = prologue.len();
        let (text, annotations) = body.finish();
        Artifact {
            path,
            source: source.to_string(),
            content: prologue + &text,
            annotations: annotations
                .into_iter()
                .map(|a| Annotation { begin: a.begin + offset, end: a.end + offset, path: a.path })
                .collect(),
        }
    }
}

/// Indentation-aware text buffer for one artifact.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf:         String,
    depth:       usize,
    annotations: Vec<Annotation>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.indent();
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// A separating empty line. Never doubled, never directly after an
    /// opening brace and never at the start of the buffer.
    pub fn blank(&mut self) {
        if self.buf.is_empty() || self.buf.ends_with("\n\n") || self.buf.ends_with("{\n") {
            return;
        }
        self.buf.push('\n');
    }

    /// Writes `prefix name suffix` on one line, recording the span of `name`
    /// against `path`.
    pub fn annotated(&mut self, path: &[i32], prefix: &str, name: &str, suffix: &str) {
        self.indent();
        self.buf.push_str(prefix);
        let begin = self.buf.len();
        self.buf.push_str(name);
        self.annotations.push(Annotation { path: path.to_vec(), begin, end: self.buf.len() });
        self.buf.push_str(suffix);
        self.buf.push('\n');
    }

    /// Emits `header`, runs `body` one level deeper, then emits `footer`.
    pub fn block<F>(&mut self, header: &str, footer: &str, body: F) -> Result<(), BeanError>
    where
        F: FnOnce(&mut Self) -> Result<(), BeanError>,
    {
        self.line(header);
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.line(footer);
        result
    }

    /// Like [`CodeWriter::block`] with the header line already written, as
    /// when the header carries an annotation.
    pub fn body<F>(&mut self, footer: &str, body: F) -> Result<(), BeanError>
    where
        F: FnOnce(&mut Self) -> Result<(), BeanError>,
    {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.line(footer);
        result
    }

    /// Passes a proto comment through as `//` lines.
    pub fn comment(&mut self, text: Option<&str>) {
        let Some(text) = text else { return };
        for line in comment_lines(text) {
            self.line(format!("//{}", disarm_unicode_escapes(line)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> (String, Vec<Annotation>) {
        (self.buf, self.annotations)
    }
}

/// Splits comment text into lines, dropping the final newline protoc
/// leaves on every comment.
pub fn comment_lines(text: &str) -> impl Iterator<Item = &str> {
    text.strip_suffix('\n').unwrap_or(text).split('\n').map(|l| l.trim_end())
}

/// javac decodes `\uXXXX` before lexing, even inside comments, so a
/// backslash that could start one is doubled. A run of backslashes before
/// `u` is only an escape when its length is odd.
pub fn disarm_unicode_escapes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut run = 0;
    for c in line.chars() {
        match c {
            '\\' => run += 1,
            'u' if run % 2 == 1 => {
                out.push('\\');
                run = 0;
            }
            '\r' => {
                out.push(' ');
                run = 0;
                continue;
            }
            _ => run = 0,
        }
        out.push(c);
    }
    out
}

/// A Java class: its package and the chain of enclosing class names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName {
    pub package: String,
    pub path:    Vec<String>,
}

impl ClassName {
    pub fn new(package: &str, path: Vec<String>) -> Self {
        ClassName { package: package.to_string(), path }
    }

    pub fn library(package: &str, name: &str) -> Self {
        ClassName { package: package.to_string(), path: vec![name.to_string()] }
    }

    pub fn nested(&self, name: &str) -> ClassName {
        let mut path = self.path.clone();
        path.push(name.to_string());
        ClassName { package: self.package.clone(), path }
    }

    pub fn simple(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Dotted path within the package, `Outer.Inner`.
    pub fn relative(&self) -> String {
        self.path.join(".")
    }

    fn top(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.relative()
        } else {
            format!("{}.{}", self.package, self.relative())
        }
    }
}

/// The imports of one artifact.
///
/// A class in the artifact's own package is referenced by its relative
/// name; a class elsewhere gets an import, unless its simple name is already
/// taken in this artifact, in which case it is written fully qualified.
#[derive(Debug)]
pub struct ImportSet {
    package:  String,
    local:    BTreeSet<String>,
    /// Nested class names declared in the artifact, which hide any
    /// top-level class of the same simple name.
    nested:   BTreeSet<String>,
    imported: BTreeMap<String, String>,
}

impl ImportSet {
    pub fn new(package: &str) -> Self {
        ImportSet {
            package:  package.to_string(),
            local:    BTreeSet::new(),
            nested:   BTreeSet::new(),
            imported: BTreeMap::new(),
        }
    }

    /// Marks a simple name as declared in (or referenced from) this package.
    pub fn declare(&mut self, simple: &str) {
        self.local.insert(simple.to_string());
    }

    pub fn declare_nested(&mut self, simple: &str) {
        self.nested.insert(simple.to_string());
    }

    pub fn reference(&mut self, class: &ClassName) -> String {
        let top = class.top().to_string();
        let library = LIBRARY_PACKAGES.contains(&class.package.as_str());
        if self.nested.contains(&top) || (is_reserved(&top) && !library) {
            return class.qualified();
        }
        if class.package == self.package {
            let shadowed = self.imported.get(&top).is_some_and(|full| *full != format!("{}.{}", class.package, top));
            if shadowed {
                return class.qualified();
            }
            self.local.insert(top);
            return class.relative();
        }
        if class.package == "java.lang" && class.path.len() == 1 && !self.local.contains(&top) {
            return class.relative();
        }
        let full = format!("{}.{}", class.package, top);
        match self.imported.get(&top) {
            Some(existing) if *existing == full => class.relative(),
            Some(_) => class.qualified(),
            None if self.local.contains(&top) => class.qualified(),
            None => {
                self.imported.insert(top, full);
                class.relative()
            }
        }
    }

    /// `import` statements, sorted.
    pub fn lines(&self) -> Vec<String> {
        let sorted: BTreeSet<&String> = self.imported.values().collect();
        sorted.into_iter().map(|full| format!("import {};", full)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_indent_and_close() {
        let mut w = CodeWriter::new();
        w.block("public class A {", "}", |w| {
            w.blank();
            w.line("int a;");
            w.blank();
            w.block("void f() {", "}", |w| {
                w.line("return;");
                Ok(())
            })?;
            w.blank();
            Ok(())
        })
        .unwrap();
        let (text, _) = w.finish();
        assert_eq!(text, "public class A {\n    int a;\n\n    void f() {\n        return;\n    }\n}\n");
    }

    #[test]
    fn block_propagates_errors() {
        let mut w = CodeWriter::new();
        let result = w.block("{", "}", |_| Err(BeanError::NothingToGenerate));
        assert!(matches!(result, Err(BeanError::NothingToGenerate)));
        w.line("x");
        assert!(w.finish().0.ends_with("}\nx\n"));
    }

    #[test]
    fn comments_and_annotations() {
        let mut w = CodeWriter::new();
        w.comment(Some(" first\n second\n"));
        w.annotated(&[4, 0], "public class ", "Hello", " {");
        let (text, annotations) = w.finish();
        assert_eq!(text, "// first\n// second\npublic class Hello {\n");
        assert_eq!(&text[annotations[0].begin..annotations[0].end], "Hello");
        assert_eq!(annotations[0].path, vec![4, 0]);
    }

    #[test]
    fn comments_cannot_smuggle_line_breaks() {
        let mut w = CodeWriter::new();
        w.comment(Some(r" a \u000a class X {} \\u0041 \\\uu0041"));
        w.comment(Some(" carriage\rreturn\n"));
        let (text, _) = w.finish();
        assert_eq!(
            text,
            "// a \\\\u000a class X {} \\\\u0041 \\\\\\\\uu0041\n// carriage return\n"
        );
        assert_eq!(disarm_unicode_escapes("plain"), "plain");
    }

    #[test]
    fn assemble_shifts_annotations() {
        let mut w = CodeWriter::new();
        w.annotated(&[4, 0], "class ", "A", " {}");
        let artifact = Artifact::assemble("A.java".into(), "a.proto", "package p;\n\n".into(), w);
        let a = &artifact.annotations[0];
        assert_eq!(&artifact.content[a.begin..a.end], "A");
    }

    #[test]
    fn imports_and_qualifiers() {
        let mut imports = ImportSet::new("com.acme.vo.demo");
        imports.declare("Hello");
        let same = ClassName::new("com.acme.vo.demo", vec!["Other".into(), "Inner".into()]);
        assert_eq!(imports.reference(&same), "Other.Inner");
        let list = ClassName::library("java.util", "List");
        assert_eq!(imports.reference(&list), "List");
        assert_eq!(imports.reference(&list), "List");
        let string = ClassName::library("java.lang", "String");
        assert_eq!(imports.reference(&string), "String");
        let clash = ClassName::new("com.acme.vo.other", vec!["Hello".into()]);
        assert_eq!(imports.reference(&clash), "com.acme.vo.other.Hello");
        let clash = ClassName::new("com.acme.vo.other", vec!["List".into()]);
        assert_eq!(imports.reference(&clash), "com.acme.vo.other.List");
        let shadowing = ClassName::new("demo", vec!["String".into()]);
        assert_eq!(imports.reference(&shadowing), "demo.String");
        assert_eq!(imports.lines(), vec!["import java.util.List;"]);
    }

    #[test]
    fn nested_names_hide_top_level_classes() {
        let mut imports = ImportSet::new("a");
        imports.declare("Bar");
        imports.declare_nested("Foo");
        assert_eq!(imports.reference(&ClassName::library("a", "Foo")), "a.Foo");
        assert_eq!(imports.reference(&ClassName::new("a", vec!["Bar".into(), "Foo".into()])), "Bar.Foo");
        assert!(imports.lines().is_empty());
    }

    #[test]
    fn imports_shadow_same_package() {
        let mut imports = ImportSet::new("a");
        assert_eq!(imports.reference(&ClassName::library("b", "Foo")), "Foo");
        assert_eq!(imports.reference(&ClassName::library("a", "Foo")), "a.Foo");
    }
}
