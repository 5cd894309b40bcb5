//! Syntax lowering for the compatibility bundle.
//!
//! The already-bundled ES module is lowered to `compat.target`; the pipeline
//! then hands the result back to the bundler for the IIFE wrap.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};

use crate::{Error, Result};

/// Fail early on a target the transformer does not understand.
pub fn validate_target(target: &str) -> Result<()> {
    TransformOptions::from_target(target)
        .map(|_| ())
        .map_err(|e| Error::InvalidConfig(format!("compat.target '{target}': {e}")))
}

/// Lower `code`, an ES module, to `target`.
///
/// Helpers the lowered code needs are imported from `@oxc-project/runtime`.
pub fn lower(code: &str, file_name: &str, target: &str) -> Result<String> {
    let options = TransformOptions::from_target(target)
        .map_err(|e| Error::InvalidConfig(format!("compat.target '{target}': {e}")))?;

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if let Some(err) = parsed.errors.first() {
        return Err(Error::Transform {
            file: file_name.to_string(),
            message: err.to_string(),
        });
    }
    let mut program = parsed.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let transformed = Transformer::new(&allocator, Path::new(file_name), &options)
        .build_with_scoping(scoping, &mut program);
    if let Some(err) = transformed.errors.first() {
        return Err(Error::Transform {
            file: file_name.to_string(),
            message: err.to_string(),
        });
    }

    Ok(Codegen::new().build(&program).code)
}

/// Global identifier for a component's IIFE: `byu-card` becomes `ByuCard`.
pub fn global_name(stem: &str) -> String {
    let mut name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
