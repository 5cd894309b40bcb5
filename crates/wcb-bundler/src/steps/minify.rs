//! Minification with oxc.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use oxc_transformer::EngineTargets;

use crate::{Error, Result};

/// Minify an ES module (the primary bundle).
pub fn minify_module(code: &str, file_name: &str) -> Result<String> {
    minify(code, file_name, SourceType::mjs(), CompressOptions::default())
}

/// Minify a classic script (the compatibility bundle).
///
/// Parsed as a script so the top-level global keeps its name, and compressed
/// without introducing syntax newer than `target`.
pub fn minify_script(code: &str, file_name: &str, target: &str) -> Result<String> {
    let target = EngineTargets::from_target(target)
        .map_err(|e| Error::InvalidConfig(format!("compat.target '{target}': {e}")))?;
    let compress = CompressOptions {
        target,
        ..CompressOptions::default()
    };
    minify(code, file_name, SourceType::cjs(), compress)
}

fn minify(
    code: &str,
    file_name: &str,
    source_type: SourceType,
    compress: CompressOptions,
) -> Result<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, source_type).parse();
    if let Some(err) = parsed.errors.first() {
        return Err(Error::Minify {
            file: file_name.to_string(),
            message: err.to_string(),
        });
    }
    let mut program = parsed.program;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(compress),
    };
    let minified = Minifier::new(options).minify(&allocator, &mut program);

    Ok(Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(minified.scoping)
        .build(&program)
        .code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_output_is_smaller() {
        let code = "export function greet(name) {\n  const message = 'hello ' + name;\n  return message;\n}\n";
        let out = minify_module(code, "a-bundle.js").unwrap();
        assert!(out.len() < code.len());
        assert!(out.contains("greet"));
    }

    #[test]
    fn script_keeps_its_global() {
        let code = "var Widget = (function () {\n  var counter = 0;\n  return { next: function () { return ++counter; } };\n})();\n";
        let out = minify_script(code, "a-bundle-compat.js", "es2015").unwrap();
        assert!(out.contains("Widget"), "global renamed:\n{out}");
    }

    #[test]
    fn script_rejects_unknown_target() {
        let err = minify_script("var a = 1;", "a-bundle-compat.js", "es1999").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = minify_module("let = ;", "bad.js").unwrap_err();
        assert!(matches!(err, Error::Minify { .. }));
    }
}
