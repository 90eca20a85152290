//! protobean-compiler
//!
//! This crate implements:
//!  1) Plugin parameters (`Params`) and the naming pass (`Allocator`), which
//!     decides every Java package, class, member and method name up front,
//!  2) The field classifier (`FieldKind`, Java types, default literals),
//!  3) Value-object generation (`gen_java`) and converter generation
//!     (`gen_converter`) on top of a scoped `CodeWriter`,
//!  4) A structural verifier for the emitted sources,
//!  5) Error types (`BeanError`) and the `compile_request` pipeline.

pub mod error;
pub mod utils;
pub mod mangle;
pub mod naming;
pub mod params;
pub mod emit;
pub mod allocate;
pub mod classify;
pub mod gen_java;
pub mod gen_converter;
pub mod verifier;
pub mod compiler;

pub use compiler::{compile_request, Context};
pub use emit::{Annotation, Artifact};
pub use error::BeanError;
pub use params::{Layout, Params};
