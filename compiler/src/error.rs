use protobean_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Config(String),

    #[error("no files to generate")]
    NothingToGenerate,

    #[error("can't find file to generate: {0}")]
    UnknownFile(String),

    #[error("unknown enum value {value:?} as default of field {field}")]
    UnknownEnumDefault {
        field: String,
        value: String,
    },

    #[error("{0} has no package: its protobuf-java classes land in the unnamed package, which converters can't import from; set option java_package")]
    UnnamedJavaPackage(String),

    #[error("malformed map entry {0}")]
    MalformedMapEntry(String),

    #[error("Verifier error in {path}, line {line}: {msg}")]
    MalformedOutput {
        path: String,
        line: usize,
        msg:  String,
    },
}
