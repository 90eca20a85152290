use std::collections::HashSet;

pub const JAVA_KEYWORDS: [&str; 59] = [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null", "var", "record", "yield", "sealed", "permits",
    "_",
];

/// Library types the generated sources refer to by simple name.
pub const JAVA_BUILTIN_TYPES: [&str; 25] = [
    "Object", "String", "Integer", "Long", "Float", "Double", "Boolean", "Byte", "Character",
    "Short", "Math", "System", "Class", "Enum", "Override", "Deprecated", "Exception",
    "Iterable", "List", "ArrayList", "Map", "HashMap", "Arrays", "ByteString",
    "InvalidProtocolBufferException",
];

/// Members every generated class or enum already has.
pub const OBJECT_METHODS: [&str; 9] = [
    "toString", "hashCode", "equals", "getClass", "clone", "finalize", "notify", "notifyAll", "wait",
];

pub fn is_reserved(name: &str) -> bool {
    JAVA_KEYWORDS.contains(&name) || JAVA_BUILTIN_TYPES.contains(&name)
}

/// A scope of claimed identifiers.
///
/// Claiming a taken name appends the smallest free numeric suffix
/// (`name1`, `name2`, ...), so earlier claims always keep their name.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    claimed: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry in which Java keywords and the library type names used by
    /// generated code are already taken.
    pub fn with_reserved() -> Self {
        let mut registry = Self::new();
        registry.reserve(JAVA_KEYWORDS);
        registry.reserve(JAVA_BUILTIN_TYPES);
        registry
    }

    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claimed.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claimed.contains(name)
    }

    pub fn claim(&mut self, candidate: &str) -> String {
        if self.claimed.insert(candidate.to_string()) {
            return candidate.to_string();
        }
        let mut n = 1usize;
        loop {
            let name = format!("{}{}", candidate, n);
            if self.claimed.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

/// Turns a proto package (or file base name) into a Java package suffix:
/// lower case, one valid identifier per dot-separated segment, reserved
/// words suffixed.
pub fn java_package_suffix(proto_package: &str) -> String {
    proto_package
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut ident: String = segment
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                .collect();
            if ident.starts_with(|c: char| c.is_ascii_digit()) {
                ident.insert(0, '_');
            }
            if JAVA_KEYWORDS.contains(&ident.as_str()) {
                NameRegistry::with_reserved().claim(&ident)
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_first_come_first_served() {
        let mut names = NameRegistry::new();
        assert_eq!(names.claim("foo"), "foo");
        assert_eq!(names.claim("foo"), "foo1");
        assert_eq!(names.claim("foo"), "foo2");
        assert_eq!(names.claim("foo1"), "foo11");
        assert!(names.contains("foo2"));
    }

    #[test]
    fn reserved_words_are_taken() {
        let mut names = NameRegistry::with_reserved();
        assert_eq!(names.claim("class"), "class1");
        assert_eq!(names.claim("String"), "String1");
        assert_eq!(names.claim("Hello"), "Hello");
        assert!(is_reserved("int"));
        assert!(!is_reserved("Hello"));
    }

    #[test]
    fn package_suffixes() {
        assert_eq!(java_package_suffix("demo"), "demo");
        assert_eq!(java_package_suffix("Foo.Bar-baz"), "foo.bar_baz");
        assert_eq!(java_package_suffix("acme.int.v1"), "acme.int1.v1");
        assert_eq!(java_package_suffix("1st"), "_1st");
        assert_eq!(java_package_suffix(""), "");
    }
}
