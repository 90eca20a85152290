//! Identifier conversion between proto naming and Java naming.

/// Converts an underscore_separated identifier to PascalCase.
///
/// Words are delimited by `_` or an upper case letter; digits form words of
/// their own and are kept as-is. An underscore is dropped only when a lower
/// case letter follows it, and a leading underscore becomes `X` so the
/// result still starts with a capital. Already converted names come back
/// unchanged.
pub fn camel_case(s: &str) -> String {
    let bytes: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    if bytes.first() == Some(&'_') {
        out.push('X');
        i += 1;
    }
    while i < bytes.len() {
        let c = bytes[i];
        if c == '_' && bytes.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()) {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c);
            i += 1;
            continue;
        }
        out.push(c.to_ascii_uppercase());
        while bytes.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()) {
            i += 1;
            out.push(bytes[i]);
        }
        i += 1;
    }
    out
}

/// camelCase for fields and methods: [`camel_case`] with the first letter
/// lowered.
pub fn lower_camel_case(s: &str) -> String {
    let camel = camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => first.to_ascii_lowercase().to_string() + chars.as_str(),
        _ => camel,
    }
}

/// UPPER_SNAKE_CASE for constants. `myField`, `my_field` and `MY_FIELD`
/// all map to `MY_FIELD`.
pub fn upper_snake_case(s: &str) -> String {
    if !s.chars().any(|c| c.is_ascii_lowercase()) {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// The accessor stem protobuf-java derives from a field name, as in
/// `get{stem}()`: underscores are dropped and the letter after an
/// underscore or digit is capitalized.
pub fn proto_java_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut cap_next = true;
    for c in name.chars() {
        if c.is_ascii_lowercase() {
            out.push(if cap_next { c.to_ascii_uppercase() } else { c });
            cap_next = false;
        } else if c.is_ascii_uppercase() {
            out.push(c);
            cap_next = false;
        } else if c.is_ascii_digit() {
            out.push(c);
            cap_next = true;
        } else {
            cap_next = true;
        }
    }
    // protobuf-java renames accessors that would clash with Object.getClass().
    if out == "Class" {
        out.push('_');
    }
    out
}

fn escape_char(c: u8) -> Option<u8> {
    match c {
        b'a' => Some(0x07),
        b'b' => Some(0x08),
        b'f' => Some(0x0c),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'v' => Some(0x0b),
        b'\\' => Some(b'\\'),
        b'"' => Some(b'"'),
        b'\'' => Some(b'\''),
        b'?' => Some(b'?'),
        _ => None,
    }
}

/// Parses a run of `radix` digits, as many as fit in a byte escape.
fn parse_digits(digits: &[u8], radix: u32) -> Option<u8> {
    u8::from_str_radix(std::str::from_utf8(digits).ok()?, radix).ok()
}

/// Decodes the C-style escapes protoc uses for `bytes` default values.
///
/// Supports the named escapes, one or two digit `\xN` hex and one to
/// three digit octal escapes. Malformed sequences are copied through unmodified.
pub fn unescape(s: &str) -> Vec<u8> {
    let mut s = s.as_bytes();
    let mut out = Vec::with_capacity(s.len());
    while !s.is_empty() {
        if s[0] != b'\\' || s.len() < 2 {
            out.push(s[0]);
            s = &s[1..];
        } else if let Some(c) = escape_char(s[1]) {
            out.push(c);
            s = &s[2..];
        } else if s[1] == b'x' || s[1] == b'X' {
            let n = s[2..].iter().take(2).take_while(|c| c.is_ascii_hexdigit()).count();
            match parse_digits(&s[2..2 + n], 16) {
                Some(v) if n > 0 => out.push(v),
                _ => out.extend_from_slice(&s[..2 + n]),
            }
            s = &s[2 + n..];
        } else if (b'0'..=b'7').contains(&s[1]) {
            let n = s[1..].iter().take(3).take_while(|c| (b'0'..=b'7').contains(*c)).count();
            match parse_digits(&s[1..1 + n], 8) {
                Some(v) => out.push(v),
                None => out.extend_from_slice(&s[..1 + n]),
            }
            s = &s[1 + n..];
        } else {
            // Unknown escape: keep the backslash and carry on.
            out.push(s[0]);
            s = &s[1..];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_words_and_digits() {
        assert_eq!(camel_case("hello_world"), "HelloWorld");
        assert_eq!(camel_case("helloWorld"), "HelloWorld");
        assert_eq!(camel_case("_my_field_name_2"), "XMyFieldName_2");
        assert_eq!(camel_case("foo2bar"), "Foo2Bar");
        assert_eq!(camel_case("ALLCAPS"), "ALLCAPS");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn lower_camel() {
        assert_eq!(lower_camel_case("user_id"), "userId");
        assert_eq!(lower_camel_case("Msg"), "msg");
        assert_eq!(lower_camel_case("_x"), "xX");
        assert_eq!(lower_camel_case("2fa"), "2Fa");
    }

    #[test]
    fn upper_snake() {
        assert_eq!(upper_snake_case("msg"), "MSG");
        assert_eq!(upper_snake_case("userId"), "USER_ID");
        assert_eq!(upper_snake_case("user_id"), "USER_ID");
        assert_eq!(upper_snake_case("USER_ID"), "USER_ID");
        assert_eq!(upper_snake_case("v2Name"), "V2_NAME");
        assert_eq!(upper_snake_case("V2NAME"), "V2NAME");
    }

    #[test]
    fn protobuf_java_accessors() {
        assert_eq!(proto_java_camel("msg"), "Msg");
        assert_eq!(proto_java_camel("foo_bar1baz"), "FooBar1Baz");
        assert_eq!(proto_java_camel("foo__bar"), "FooBar");
        assert_eq!(proto_java_camel("class"), "Class_");
    }

    #[test]
    fn unescape_octal_hex_and_plain() {
        assert_eq!(unescape(r"\101\x42C"), b"ABC".to_vec());
    }

    #[test]
    fn unescape_named() {
        assert_eq!(unescape(r#"a\n\t\\\"\'\?"#), b"a\n\t\\\"'?".to_vec());
        assert_eq!(unescape(r"\a\b\f\v\r"), vec![7, 8, 12, 11, 13]);
    }

    #[test]
    fn unescape_short_octal() {
        assert_eq!(unescape(r"\0"), vec![0]);
        assert_eq!(unescape(r"\40x"), b" x".to_vec());
        assert_eq!(unescape(r"\1234"), b"S4".to_vec());
    }

    #[test]
    fn unescape_short_hex() {
        assert_eq!(unescape(r"\x4"), vec![4]);
        assert_eq!(unescape(r"\x4g"), b"\x04g".to_vec());
        assert_eq!(unescape(r"\x414"), b"A4".to_vec());
    }

    #[test]
    fn unescape_malformed_passes_through() {
        assert_eq!(unescape(r"\xZZ!"), b"\\xZZ!".to_vec());
        assert_eq!(unescape(r"\x"), b"\\x".to_vec());
        assert_eq!(unescape(r"\777"), b"\\777".to_vec());
        assert_eq!(unescape(r"\q"), b"\\q".to_vec());
        assert_eq!(unescape("\\"), b"\\".to_vec());
    }
}
