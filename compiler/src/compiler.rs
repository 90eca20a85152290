use prost_types::compiler::CodeGeneratorRequest;
use protobean_schema::{FileId, SchemaGraph, Syntax, TypeIndex, TypeRef};
use tracing::{debug, info};

use crate::{
    allocate::{Allocation, Allocator},
    emit::Artifact,
    error::BeanError,
    gen_converter::generate_converter,
    gen_java::generate_beans,
    params::Params,
    verifier::verify_artifact,
};

/// Everything the emitters read. Built once per request, never mutated.
pub struct Context<'a> {
    pub graph:  &'a SchemaGraph,
    pub index:  &'a TypeIndex,
    pub params: &'a Params,
    pub alloc:  &'a Allocation,
}

/// Maps the request's `file_to_generate` names onto graph handles.
fn files_to_generate(graph: &SchemaGraph, request: &CodeGeneratorRequest) -> Result<Vec<FileId>, BeanError> {
    if request.file_to_generate.is_empty() {
        return Err(BeanError::NothingToGenerate);
    }
    request
        .file_to_generate
        .iter()
        .map(|name| graph.file_named(name).ok_or_else(|| BeanError::UnknownFile(name.clone())))
        .collect()
}

/// Every file whose protobuf-java classes a generated converter names: the
/// file itself, the files of its message fields and, for closed proto2
/// enums, the files of its enum fields. None of them may map to the unnamed
/// Java package.
fn check_java_packages(
    graph: &SchemaGraph,
    index: &TypeIndex,
    alloc: &Allocation,
    gen_files: &[FileId],
) -> Result<(), BeanError> {
    for &file in gen_files {
        let unit = graph.unit(file);
        if !unit.messages.iter().any(|m| !m.map_entry) {
            continue;
        }
        let mut referenced = vec![file];
        for field in unit.messages.iter().flat_map(|m| &m.fields) {
            if !field.ty.is_named() {
                continue;
            }
            match index.resolve(&field.type_name)? {
                TypeRef::Message(id) => referenced.push(id.file),
                TypeRef::Enum(id) if unit.syntax != Syntax::Proto3 => referenced.push(id.file),
                TypeRef::Enum(_) => {}
            }
        }
        if let Some(&bare) = referenced.iter().find(|&&f| alloc.file(f).proto_package.is_empty()) {
            return Err(BeanError::UnnamedJavaPackage(graph.unit(bare).name.clone()));
        }
    }
    Ok(())
}

/// Runs the whole pipeline: build → resolve → allocate names → emit →
/// verify. Either every artifact is returned or none is.
pub fn compile_request(request: &CodeGeneratorRequest) -> Result<Vec<Artifact>, BeanError> {
    let params = Params::parse(request.parameter())?;
    debug!(?params, "parsed parameters");

    let graph = SchemaGraph::build(&request.proto_file)?;
    let gen_files = files_to_generate(&graph, request)?;
    let index = TypeIndex::build(&graph);
    index.check_references(&graph)?;

    let alloc = Allocator::new(&graph, &params).allocate(&gen_files);
    check_java_packages(&graph, &index, &alloc, &gen_files)?;
    let ctx = Context { graph: &graph, index: &index, params: &params, alloc: &alloc };

    let mut artifacts = Vec::new();
    for &file in &gen_files {
        artifacts.extend(generate_beans(&ctx, file)?);
    }
    for &file in &gen_files {
        artifacts.extend(generate_converter(&ctx, file)?);
    }
    for artifact in &artifacts {
        verify_artifact(artifact)?;
        debug!(path = %artifact.path, bytes = artifact.content.len(), "verified artifact");
    }

    info!(files = gen_files.len(), artifacts = artifacts.len(), "generated java sources");
    Ok(artifacts)
}
