use lazy_static::lazy_static;
use regex::Regex;

use crate::{emit::Artifact, error::BeanError, gen_java::GENERATED_BY};

lazy_static! {
    static ref PACKAGE_LINE: Regex = Regex::new(r"^package ([a-z_][a-z0-9_]*(?:\.[a-z_][a-z0-9_]*)*);$").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

fn malformed(artifact: &Artifact, line: usize, msg: impl Into<String>) -> BeanError {
    BeanError::MalformedOutput { path: artifact.path.clone(), line, msg: msg.into() }
}

#[derive(Clone, Copy, PartialEq)]
enum Scan {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

/// Returns `Ok(())` if the artifact is structurally sound Java:
/// a package line matching its path, the generated-code header, balanced
/// brackets outside literals and comments, and annotations that cover
/// identifiers.
pub fn verify_artifact(artifact: &Artifact) -> Result<(), BeanError> {
    // 1) Package line agrees with the output path
    let first = artifact.content.lines().next().unwrap_or_default();
    let Some(caps) = PACKAGE_LINE.captures(first) else {
        return Err(malformed(artifact, 1, format!("expected a package line, found {:?}", first)));
    };
    let dir = caps[1].replace('.', "/");
    let in_dir = artifact
        .path
        .strip_prefix(&dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|file| !file.contains('/') && file.ends_with(".java"));
    if !in_dir {
        return Err(malformed(artifact, 1, format!("package {} does not match the output path", &caps[1])));
    }
    if !artifact.content.lines().any(|l| l == GENERATED_BY) {
        return Err(malformed(artifact, 1, "missing generated-code header"));
    }

    // 2) Brackets balance outside of literals and comments
    check_brackets(artifact)?;

    // 3) Annotations land on identifiers
    for a in &artifact.annotations {
        let span = artifact.content.get(a.begin..a.end).unwrap_or_default();
        if !IDENTIFIER.is_match(span) {
            let line = artifact.content.get(..a.begin).map_or(0, |s| s.lines().count());
            return Err(malformed(artifact, line, format!("annotation covers {:?}, not an identifier", span)));
        }
    }
    Ok(())
}

fn check_brackets(artifact: &Artifact) -> Result<(), BeanError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut state = Scan::Code;
    let mut line = 1;
    let mut chars = artifact.content.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                '/' if chars.peek() == Some(&'/') => state = Scan::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                }
                '"' => state = Scan::Str,
                '\'' => state = Scan::Char,
                '(' | '[' | '{' => open.push((c, line)),
                ')' | ']' | '}' => {
                    let want = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match open.pop() {
                        Some((got, _)) if got == want => {}
                        Some((got, at)) => {
                            return Err(malformed(artifact, line, format!("{:?} closes {:?} opened on line {}", c, got, at)))
                        }
                        None => return Err(malformed(artifact, line, format!("unexpected {:?}", c))),
                    }
                }
                _ => {}
            },
            Scan::LineComment if c == '\n' => state = Scan::Code,
            Scan::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                state = Scan::Code;
            }
            Scan::Str | Scan::Char if c == '\\' => {
                if chars.next() == Some('\n') {
                    line += 1;
                }
            }
            Scan::Str if c == '"' => state = Scan::Code,
            Scan::Char if c == '\'' => state = Scan::Code,
            Scan::Str | Scan::Char if c == '\n' => {
                return Err(malformed(artifact, line, "unterminated literal"));
            }
            _ => {}
        }
        if c == '\n' {
            line += 1;
        }
    }

    if let Some((c, at)) = open.pop() {
        return Err(malformed(artifact, at, format!("unclosed {:?}", c)));
    }
    if state == Scan::BlockComment {
        return Err(malformed(artifact, line, "unterminated block comment"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Annotation;

    fn artifact(path: &str, body: &str) -> Artifact {
        Artifact {
            path:        path.to_string(),
            source:      "a.proto".to_string(),
            content:     format!("package com.acme;\n\n{}\n{}", GENERATED_BY, body),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn accepts_balanced_source() {
        let a = artifact("com/acme/A.java", "class A {\n    String s = \"}{\";\n    char c = '{';\n    // }\n    /* ) */\n}\n");
        assert!(verify_artifact(&a).is_ok());
    }

    #[test]
    fn rejects_unbalanced_source() {
        let a = artifact("com/acme/A.java", "class A {\n    void f() {\n}\n");
        assert!(matches!(verify_artifact(&a), Err(BeanError::MalformedOutput { line: 4, .. })));
        let a = artifact("com/acme/A.java", "class A {\n    int x = f(];\n}\n");
        assert!(matches!(verify_artifact(&a), Err(BeanError::MalformedOutput { line: 5, .. })));
        let a = artifact("com/acme/A.java", "class A {\n    String s = \"abc;\n}\n");
        assert!(verify_artifact(&a).is_err());
    }

    #[test]
    fn package_must_match_path() {
        assert!(verify_artifact(&artifact("com/other/A.java", "class A {}\n")).is_err());
        assert!(verify_artifact(&artifact("com/acme/sub/A.java", "class A {}\n")).is_err());
        let mut a = artifact("com/acme/A.java", "class A {}\n");
        a.content = a.content.replacen("package com.acme;", "package com.Acme;", 1);
        assert!(verify_artifact(&a).is_err());
    }

    #[test]
    fn annotations_must_cover_identifiers() {
        let mut a = artifact("com/acme/A.java", "class A {}\n");
        let begin = a.content.find("A {").unwrap();
        a.annotations.push(Annotation { path: vec![4, 0], begin, end: begin + 1 });
        assert!(verify_artifact(&a).is_ok());
        a.annotations.push(Annotation { path: vec![4, 0], begin, end: begin + 3 });
        assert!(verify_artifact(&a).is_err());
    }
}
