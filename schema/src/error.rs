use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("internal error: nesting failure for {name} (declared {declared} nested types, attached {attached})")]
    NestingMismatch {
        name:     String,
        declared: usize,
        attached: usize,
    },

    #[error("internal error: enum nesting failure for {name} (declared {declared} nested enums, attached {attached})")]
    EnumNestingMismatch {
        name:     String,
        declared: usize,
        attached: usize,
    },

    #[error("internal error: {name} refers to missing parent #{parent}")]
    DanglingParent {
        name:   String,
        parent: usize,
    },

    #[error("can't find object with type {0}")]
    UnresolvedType(String),

    #[error("type {name} is not {expected}")]
    KindMismatch {
        name:     String,
        expected: &'static str,
    },

    #[error("file {file} publicly imports unknown file {dependency}")]
    UnknownDependency {
        file:       String,
        dependency: String,
    },
}
