//! The resolved schema graph the protobean compiler generates code from.
//!
//! Raw `FileDescriptorProto` records cross-reference each other by name and
//! nest arbitrarily deep. This crate wraps them into per-file arenas linked by
//! index handles, computes fully qualified names, and resolves type
//! references across files.
//!
//! ```
//! use prost_types::{DescriptorProto, FileDescriptorProto};
//! use protobean_schema::*;
//!
//! let file = FileDescriptorProto {
//!     name: Some("demo.proto".to_owned()),
//!     package: Some("demo".to_owned()),
//!     message_type: vec![DescriptorProto { name: Some("Hello".to_owned()), ..Default::default() }],
//!     ..Default::default()
//! };
//!
//! let graph = SchemaGraph::build(&[file]).unwrap();
//! let index = TypeIndex::build(&graph);
//! let hello = index.resolve_message(".demo.Hello").unwrap();
//! assert_eq!(graph.message(hello).name, "Hello");
//! ```

pub mod error;
pub mod graph;
pub mod resolve;
pub mod wire;

pub use error::SchemaError;
pub use graph::*;
pub use resolve::TypeIndex;
pub use wire::*;

// Source-code-info path components, from the field numbers in descriptor.proto.
pub const FILE_MESSAGE_TYPE: i32 = 4;
pub const FILE_ENUM_TYPE: i32 = 5;
pub const FILE_EXTENSION: i32 = 7;
pub const MESSAGE_FIELD: i32 = 2;
pub const MESSAGE_NESTED_TYPE: i32 = 3;
pub const MESSAGE_ENUM_TYPE: i32 = 4;
pub const MESSAGE_EXTENSION: i32 = 6;
pub const MESSAGE_ONEOF: i32 = 8;
pub const ENUM_VALUE: i32 = 2;
