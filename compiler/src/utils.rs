/// Renders `text` as a double-quoted Java string literal.
///
/// JSON string escaping is a subset of what Java accepts, and it never
/// produces `\u000a`-style escapes for line terminators.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text.escape_default()))
}

/// Java source path for a class in a dotted package.
pub fn java_path(package: &str, class: &str) -> String {
    if package.is_empty() {
        format!("{}.java", class)
    } else {
        format!("{}/{}.java", package.replace('.', "/"), class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_java_literals() {
        assert_eq!(quote("hi"), "\"hi\"");
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn paths() {
        assert_eq!(java_path("com.acme.vo", "Hello"), "com/acme/vo/Hello.java");
        assert_eq!(java_path("", "Hello"), "Hello.java");
    }
}
