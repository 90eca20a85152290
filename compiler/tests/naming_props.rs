#![cfg(test)]

use proptest::prelude::*;
use protobean_compiler::mangle::{camel_case, lower_camel_case, upper_snake_case};

proptest! {
    #[test]
    fn camel_case_is_idempotent(name in "[a-zA-Z0-9_]{0,16}") {
        let once = camel_case(&name);
        prop_assert_eq!(camel_case(&once), once.clone());
        prop_assert!(!once.starts_with('_'));
    }

    #[test]
    fn lower_camel_case_is_idempotent(name in "[a-zA-Z0-9_]{0,16}") {
        let once = lower_camel_case(&name);
        prop_assert_eq!(lower_camel_case(&once), once.clone());
        prop_assert!(!once.starts_with(|c: char| c.is_ascii_uppercase()));
    }

    #[test]
    fn upper_snake_case_is_idempotent(name in "[a-zA-Z0-9_]{0,16}") {
        let once = upper_snake_case(&name);
        prop_assert_eq!(upper_snake_case(&once), once.clone());
        prop_assert!(!once.chars().any(|c| c.is_ascii_lowercase()));
    }
}
