//! The stylesheet step.

use std::fs;
use std::path::Path;

use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};

use crate::{Error, Result};

/// Printed stylesheet, plus its minified form when requested.
#[derive(Debug, Clone)]
pub struct CssOutput {
    pub css: String,
    pub minified: Option<String>,
}

/// Read, parse and print the stylesheet at `path`.
pub fn process_css(path: &Path, minify: bool) -> Result<CssOutput> {
    let source = fs::read_to_string(path).map_err(|e| Error::Css {
        file: path.display().to_string(),
        message: format!("cannot read: {e}"),
    })?;
    transform_css(&source, path, minify)
}

fn transform_css(source: &str, path: &Path, minify: bool) -> Result<CssOutput> {
    let css_error = |stage: &str, e: &dyn std::fmt::Debug| Error::Css {
        file: path.display().to_string(),
        message: format!("failed to {stage}: {e:?}"),
    };

    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string_lossy().to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| css_error("parse", &e))?;

    let css = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| css_error("print", &e))?
        .code;

    let minified = if minify {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| css_error("minify", &e))?;
        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| css_error("print", &e))?;
        Some(printed.code)
    } else {
        None
    };

    Ok(CssOutput { css, minified })
}
