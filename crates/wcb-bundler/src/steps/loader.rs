//! Loader script generation.
//!
//! The loader is the file a page includes. At runtime it loads the polyfills
//! when the browser lacks custom elements, shadow DOM or `<template>`, then
//! loads the module bundle, or the compatibility bundle on browsers without
//! module support.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::{Error, Result};

const LOADER_TEMPLATE: &str = include_str!("../../templates/loader.js.j2");

/// Values baked into a generated loader.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderContext {
    /// Component name, used only in the banner comment.
    pub component: String,
    /// File name of the ES module bundle to load.
    pub bundle: String,
    /// File name of the compatibility bundle, if one is built.
    pub compat: Option<String>,
    /// Polyfill script URL, if polyfills are enabled.
    pub polyfills: Option<String>,
    /// Fixed base URL; `None` resolves bundles next to the loader itself.
    pub base_url: Option<String>,
}

/// Render the loader script.
pub fn render_loader(ctx: &LoaderContext) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("loader", LOADER_TEMPLATE)
        .map_err(|e| Error::Loader(e.to_string()))?;
    let template = env
        .get_template("loader")
        .map_err(|e| Error::Loader(e.to_string()))?;

    let base_url = ctx
        .base_url
        .as_deref()
        .map(|url| js_string(&with_trailing_slash(url)))
        .transpose()?;

    template
        .render(context! {
            component => sanitize_comment(&ctx.component),
            bundle => js_string(&ctx.bundle)?,
            compat => ctx.compat.as_deref().map(js_string).transpose()?,
            polyfills => ctx.polyfills.as_deref().map(js_string).transpose()?,
            base_url => base_url,
        })
        .map_err(|e| Error::Loader(e.to_string()))
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Loader(e.to_string()))
}

fn with_trailing_slash(url: &str) -> String {
    if url.is_empty() || url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn sanitize_comment(text: &str) -> String {
    text.replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LoaderContext {
        LoaderContext {
            component: "widget".into(),
            bundle: "widget-bundle.min.js".into(),
            compat: Some("widget-bundle-compat.min.js".into()),
            polyfills: Some("https://cdn.example.com/polyfills.js".into()),
            base_url: None,
        }
    }

    #[test]
    fn references_both_bundles_and_polyfills() {
        let js = render_loader(&ctx()).unwrap();
        assert!(js.contains(r#"var MODULE_BUNDLE = "widget-bundle.min.js";"#));
        assert!(js.contains(r#"var COMPAT_BUNDLE = "widget-bundle-compat.min.js";"#));
        assert!(js.contains(r#"var POLYFILLS = "https://cdn.example.com/polyfills.js";"#));
        assert!(js.contains("noModule"));
        assert!(js.contains("document.currentScript"));
    }

    #[test]
    fn without_compat_always_loads_the_module() {
        let js = render_loader(&LoaderContext {
            compat: None,
            ..ctx()
        })
        .unwrap();
        assert!(!js.contains("COMPAT_BUNDLE"));
        assert!(!js.contains("noModule"));
    }

    #[test]
    fn without_polyfills_skips_detection() {
        let js = render_loader(&LoaderContext {
            polyfills: None,
            ..ctx()
        })
        .unwrap();
        assert!(!js.contains("needsPolyfills"));
        assert!(js.contains("loadBundle();"));
    }

    #[test]
    fn fixed_base_url_gets_a_trailing_slash() {
        let js = render_loader(&LoaderContext {
            base_url: Some("https://cdn.example.com/widget/1.0".into()),
            ..ctx()
        })
        .unwrap();
        assert!(js.contains(r#"return "https://cdn.example.com/widget/1.0/";"#));
        assert!(!js.contains("currentScript"));
    }

    #[test]
    fn values_are_escaped_as_string_literals() {
        let js = render_loader(&LoaderContext {
            bundle: "we\"ird.js".into(),
            ..ctx()
        })
        .unwrap();
        assert!(js.contains(r#""we\"ird.js""#));
    }
}
