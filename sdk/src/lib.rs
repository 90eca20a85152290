//! protobean
//!
//! The protoc plugin envelope around `protobean-compiler`.
//!
//! - `generate`: `CodeGeneratorRequest` → `CodeGeneratorResponse`, fatal
//!   errors reported through the response's `error` field
//! - `decode_request` / `encode_response`: the prost wire envelope
//! - `describe_to_json`: the resolved schema graph of a request as JSON

use prost::Message;
use prost_types::{
    compiler::{
        code_generator_response::{Feature, File},
        CodeGeneratorRequest, CodeGeneratorResponse,
    },
    generated_code_info, GeneratedCodeInfo,
};
use tracing::error;

pub use protobean_compiler::{compile_request, Artifact, BeanError, Layout, Params};
pub use protobean_schema::{SchemaError, SchemaGraph};

fn to_file(artifact: Artifact, annotate: bool) -> File {
    let generated_code_info = annotate.then(|| GeneratedCodeInfo {
        annotation: artifact
            .annotations
            .iter()
            .map(|a| generated_code_info::Annotation {
                path: a.path.clone(),
                source_file: Some(artifact.source.clone()),
                begin: i32::try_from(a.begin).ok(),
                end: i32::try_from(a.end).ok(),
                ..Default::default()
            })
            .collect(),
    });
    File {
        name: Some(artifact.path),
        content: Some(artifact.content),
        generated_code_info,
        ..Default::default()
    }
}

/// A response carrying only a fatal error.
pub fn error_response(err: &BeanError) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        error: Some(err.to_string()),
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    }
}

/// Runs the generator. Never fails: a fatal error yields a response with
/// `error` set and no files.
pub fn generate(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    match compile_request(request) {
        Ok(artifacts) => {
            let annotate = Params::parse(request.parameter()).is_ok_and(|p| p.annotate_code);
            CodeGeneratorResponse {
                file: artifacts.into_iter().map(|a| to_file(a, annotate)).collect(),
                supported_features: Some(Feature::Proto3Optional as u64),
                ..Default::default()
            }
        }
        Err(err) => {
            error!(%err, "generation failed");
            error_response(&err)
        }
    }
}

pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, BeanError> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

pub fn encode_response(response: &CodeGeneratorResponse) -> Vec<u8> {
    response.encode_to_vec()
}

/// Prost-encoded request in, prost-encoded response out.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<Vec<u8>, BeanError> {
    let request = decode_request(bytes)?;
    Ok(encode_response(&generate(&request)))
}

/// Decode a request and pretty-print its resolved schema graph.
pub fn describe_to_json(bytes: &[u8]) -> Result<String, BeanError> {
    let request = decode_request(bytes)?;
    let graph = SchemaGraph::build(&request.proto_file)?;
    Ok(serde_json::to_string_pretty(&graph)?)
}

pub mod error {
    pub use protobean_compiler::error::BeanError;
    pub use protobean_schema::error::SchemaError;
}

pub mod schema {
    pub use protobean_schema::{EnumType, FieldSlot, MessageType, SchemaGraph, SchemaUnit, TypeIndex};
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        field_descriptor_proto::{Label, Type},
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    };

    fn hello_request(parameter: &str) -> CodeGeneratorRequest {
        let field = |name: &str, number: i32, ty: Type| FieldDescriptorProto {
            name: Some(name.into()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("demo.proto".into()),
            package: Some("demo".into()),
            syntax: Some("proto3".into()),
            message_type: vec![DescriptorProto {
                name: Some("Hello".into()),
                field: vec![field("msg", 1, Type::String), field("code", 2, Type::Int32)],
                ..Default::default()
            }],
            ..Default::default()
        };
        CodeGeneratorRequest {
            file_to_generate: vec!["demo.proto".into()],
            parameter: Some(parameter.into()),
            proto_file: vec![file],
            ..Default::default()
        }
    }

    #[test]
    fn envelope_round_trip() {
        let bytes = hello_request("vopkg=com.acme.vo").encode_to_vec();
        let response = CodeGeneratorResponse::decode(generate_from_bytes(&bytes).unwrap().as_slice()).unwrap();
        assert_eq!(response.error, None);
        assert_eq!(response.supported_features, Some(Feature::Proto3Optional as u64));
        let names: Vec<&str> = response.file.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["com/acme/vo/demo/Hello.java", "com/acme/vo/converter/DemoConverter.java"]);
        assert!(response.file.iter().all(|f| f.generated_code_info.is_none()));
    }

    #[test]
    fn fatal_errors_travel_in_the_response() {
        let response = generate(&hello_request("cvtpkg=x"));
        assert!(response.file.is_empty());
        assert!(response.error.unwrap().contains("vopkg"));
    }

    #[test]
    fn annotations_point_at_generated_names() {
        let response = generate(&hello_request("vopkg=com.acme.vo,annotate_code"));
        let bean = &response.file[0];
        let info = bean.generated_code_info.as_ref().unwrap();
        let first = &info.annotation[0];
        let (begin, end) = (first.begin() as usize, first.end() as usize);
        assert_eq!(&bean.content()[begin..end], "Hello");
        assert_eq!(first.path, vec![4, 0]);
        assert_eq!(first.source_file(), "demo.proto");
    }

    #[test]
    fn describes_the_graph() {
        let json = describe_to_json(&hello_request("").encode_to_vec()).unwrap();
        assert!(json.contains("\".demo.Hello\""));
        assert!(describe_to_json(&[0xff, 0xff]).is_err());
    }

    #[test]
    fn describe_lists_public_reexports() {
        let base = FileDescriptorProto {
            name: Some("base.proto".into()),
            package: Some("base".into()),
            message_type: vec![DescriptorProto { name: Some("Base".into()), ..Default::default() }],
            ..Default::default()
        };
        let facade = FileDescriptorProto {
            name: Some("facade.proto".into()),
            dependency: vec!["base.proto".into()],
            public_dependency: vec![0],
            ..Default::default()
        };
        let request = CodeGeneratorRequest { proto_file: vec![base, facade], ..Default::default() };
        let json = describe_to_json(&request.encode_to_vec()).unwrap();
        let graph: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(graph["units"][1]["reexports"][0]["Message"]["index"], 0);
        assert_eq!(graph["units"][0]["reexports"].as_array().map(Vec::len), Some(0));
    }
}
