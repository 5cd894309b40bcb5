//! The `BuildConfig` data model.
//!
//! A `BuildConfig` is assembled once at startup from defaults, an optional
//! configuration file and `WCB_*` environment variables (see
//! [`crate::discovery`]), and is passed by value (usually inside an `Arc`)
//! to everything that needs it afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder expanded to the source file stem in output name templates.
pub const NAME_PLACEHOLDER: &str = "[name]";

/// Polyfill bundle loaded by generated loaders unless overridden.
pub const DEFAULT_POLYFILLS: &str =
    "https://cdn.byu.edu/web-component-polyfills/latest/polyfills.min.js";

/// Top-level field names of [`BuildConfig`].
pub const CONFIG_KEYS: &[&str] = &[
    "source_dir",
    "dest_dir",
    "extensions",
    "component_location",
    "polyfills",
    "minify",
    "sourcemap",
    "concurrency",
    "output",
    "compat",
    "bundler",
    "css",
    "watch",
];

/// Complete build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Flat directory holding the component sources.
    #[serde(alias = "sourceDir")]
    pub source_dir: PathBuf,

    /// Directory receiving every generated artifact.
    #[serde(alias = "destDir")]
    pub dest_dir: PathBuf,

    /// Eligible source extensions, without the leading dot.
    pub extensions: Vec<String>,

    /// Base URL the loader uses to locate bundles.
    ///
    /// When absent the loader resolves bundles relative to its own URL.
    #[serde(alias = "componentLocation", skip_serializing_if = "Option::is_none")]
    pub component_location: Option<String>,

    /// Polyfill script URL. An empty string disables polyfill loading.
    pub polyfills: String,

    /// Emit `.min` variants of the bundles.
    pub minify: bool,

    /// Emit a `.map` file next to the primary bundle.
    ///
    /// The compatibility and minified bundles are derived from bundled code
    /// and never carry a map.
    pub sourcemap: bool,

    /// Upper bound on simultaneous per-file builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Output filename templates.
    pub output: OutputNames,

    /// Compatibility bundle settings.
    pub compat: CompatOptions,

    /// Options forwarded to the module bundler.
    pub bundler: BundlerConfig,

    /// Optional stylesheet pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<CssConfig>,

    /// Watch mode tuning.
    pub watch: WatchOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("components"),
            dest_dir: PathBuf::from("dist"),
            extensions: vec!["js".to_string()],
            component_location: None,
            polyfills: DEFAULT_POLYFILLS.to_string(),
            minify: true,
            sourcemap: true,
            concurrency: None,
            output: OutputNames::default(),
            compat: CompatOptions::default(),
            bundler: BundlerConfig::default(),
            css: None,
            watch: WatchOptions::default(),
        }
    }
}

impl BuildConfig {
    /// Rebase relative directories onto `root`.
    ///
    /// Absolute paths are left untouched.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.source_dir = rebase(root, &self.source_dir);
        self.dest_dir = rebase(root, &self.dest_dir);
        if let Some(css) = self.css.as_mut() {
            css.input = rebase(root, &css.input);
        }
        self.bundler.alias = self
            .bundler
            .alias
            .iter()
            .map(|(alias, target)| {
                let target = rebase(root, Path::new(target));
                (alias.clone(), target.to_string_lossy().into_owned())
            })
            .collect();
        self
    }

    /// Returns true when `path` carries one of the eligible extensions.
    pub fn is_eligible_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }

    /// Polyfill URL, or `None` when polyfill loading is disabled.
    pub fn polyfills_url(&self) -> Option<&str> {
        let url = self.polyfills.trim();
        (!url.is_empty()).then_some(url)
    }
}

fn rebase(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Output filename templates.
///
/// `[name]` expands to the source file stem. Minified names are derived by
/// inserting `.min` before the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputNames {
    /// Primary bundle.
    pub bundle: String,

    /// Compatibility bundle. Defaults to `<bundle stem>-compat.js`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compat_bundle: Option<String>,

    /// Loader script.
    pub loader: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            bundle: format!("{NAME_PLACEHOLDER}-bundle.js"),
            compat_bundle: None,
            loader: format!("{NAME_PLACEHOLDER}.js"),
        }
    }
}

/// Compatibility bundle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompatOptions {
    pub enabled: bool,

    /// Syntax lowering target (`es2015`, `es2017`, ...).
    pub target: String,
}

impl Default for CompatOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "es2015".to_string(),
        }
    }
}

/// Module resolution and interop options handed to the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerConfig {
    /// Module specifiers left out of the bundle.
    pub external: Vec<String>,

    /// Export conditions used while resolving packages.
    pub platform: Platform,

    /// Path aliases (`"@lib" = "src/lib"`), kept sorted by key.
    pub alias: BTreeMap<String, String>,

    /// Imports of files with these extensions become their contents as a string.
    pub text_extensions: Vec<String>,

    /// Imports of files with these extensions become `data:` URLs.
    pub dataurl_extensions: Vec<String>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            external: Vec::new(),
            platform: Platform::default(),
            alias: BTreeMap::new(),
            text_extensions: vec!["html".to_string()],
            dataurl_extensions: ["png", "gif", "jpg", "jpeg", "svg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Target platform environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

/// Stylesheet pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CssConfig {
    /// Stylesheet entry point.
    pub input: PathBuf,

    /// Output filename inside `dest_dir`.
    #[serde(default = "default_css_output")]
    pub output: String,
}

fn default_css_output() -> String {
    "components.css".to_string()
}

/// Watch mode tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchOptions {
    /// Events for the same path inside this window are dropped.
    pub debounce_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { debounce_ms: 50 }
    }
}
