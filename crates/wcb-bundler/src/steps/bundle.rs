//! Module bundling with rolldown.

use std::path::{Path, PathBuf};

use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, IsExternal,
    OutputFormat, Platform, ResolveOptions, SourceMapType,
};
use rolldown_common::{ModuleType, Output};
use rustc_hash::FxHashMap;
use wcb_config::{BuildConfig, Platform as ConfigPlatform};

use crate::diagnostics;
use crate::{Error, Result};

/// The entry chunk of one bundler run.
#[derive(Debug, Clone)]
pub struct BundledCode {
    pub code: String,
    /// Source map JSON, present when requested.
    pub map: Option<String>,
}

/// Bundle `entry` and everything it imports into a single ES module.
pub async fn bundle_esm(config: &BuildConfig, root: &Path, entry: &Path) -> Result<BundledCode> {
    let mut options = bundler_options(config, root, entry);
    options.format = Some(OutputFormat::Esm);
    if config.sourcemap {
        options.sourcemap = Some(SourceMapType::Hidden);
    }
    generate(options).await
}

/// Bundle `entry` into a classic script wrapped in an IIFE.
///
/// Exports, if any, are exposed on the global `name`.
pub async fn bundle_iife(
    config: &BuildConfig,
    root: &Path,
    entry: &Path,
    name: &str,
) -> Result<BundledCode> {
    let mut options = bundler_options(config, root, entry);
    options.format = Some(OutputFormat::Iife);
    options.name = Some(name.to_string());
    generate(options).await
}

fn bundler_options(config: &BuildConfig, root: &Path, entry: &Path) -> BundlerOptions {
    let platform = match config.bundler.platform {
        ConfigPlatform::Browser => Platform::Browser,
        ConfigPlatform::Node => Platform::Node,
    };

    let bundler = &config.bundler;
    let module_types: FxHashMap<String, ModuleType> = bundler
        .text_extensions
        .iter()
        .map(|ext| (format!(".{ext}"), ModuleType::Text))
        .chain(
            bundler
                .dataurl_extensions
                .iter()
                .map(|ext| (format!(".{ext}"), ModuleType::Dataurl)),
        )
        .collect();

    BundlerOptions {
        input: Some(vec![InputItem {
            name: entry
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            import: entry.to_string_lossy().into_owned(),
        }]),
        cwd: Some(root.to_path_buf()),
        platform: Some(platform),
        external: Some(IsExternal::from(config.bundler.external.clone())),
        resolve: Some(resolve_options(config, root)),
        module_types: (!module_types.is_empty()).then_some(module_types),
        inline_dynamic_imports: Some(true),
        ..Default::default()
    }
}

/// Module resolution: node_modules lookup from the project root upwards,
/// configured aliases, and the export conditions of the target platform.
fn resolve_options(config: &BuildConfig, root: &Path) -> ResolveOptions {
    let mut modules: Vec<String> = root
        .ancestors()
        .map(|dir| dir.join("node_modules").to_string_lossy().into_owned())
        .collect();
    modules.push("node_modules".to_string());

    let alias = (!config.bundler.alias.is_empty()).then(|| {
        config
            .bundler
            .alias
            .iter()
            .map(|(alias, target)| {
                let target = PathBuf::from(target);
                let target = if target.is_absolute() {
                    target
                } else {
                    root.join(target)
                };
                (
                    alias.clone(),
                    vec![Some(target.to_string_lossy().into_owned())],
                )
            })
            .collect()
    });

    let (conditions, main_fields): (&[&str], &[&str]) = match config.bundler.platform {
        ConfigPlatform::Browser => (
            &["browser", "import", "module", "default"],
            &["browser", "module", "main"],
        ),
        ConfigPlatform::Node => (&["node", "import", "module", "default"], &["module", "main"]),
    };

    ResolveOptions {
        alias,
        main_fields: Some(main_fields.iter().map(|s| s.to_string()).collect()),
        condition_names: Some(conditions.iter().map(|s| s.to_string()).collect()),
        extensions: Some(vec![
            ".js".to_string(),
            ".mjs".to_string(),
            ".json".to_string(),
        ]),
        modules: Some(modules),
        symlinks: Some(true),
        ..Default::default()
    }
}

async fn generate(options: BundlerOptions) -> Result<BundledCode> {
    let mut bundler = RolldownBundlerBuilder::default()
        .with_options(options)
        .build()
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    let output = bundler
        .generate()
        .await
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    for warning in &output.warnings {
        let diag = diagnostics::extract_warning(warning);
        tracing::warn!(kind = %diag.kind, "{}", diag.message);
    }

    output
        .assets
        .iter()
        .find_map(|asset| match asset {
            Output::Chunk(chunk) if chunk.is_entry => Some(BundledCode {
                code: chunk.code.clone(),
                map: chunk.map.as_ref().map(|map| map.to_json_string()),
            }),
            _ => None,
        })
        .ok_or_else(|| {
            Error::Bundler(vec![diagnostics::ExtractedDiagnostic {
                kind: diagnostics::DiagnosticKind::Other,
                severity: diagnostics::DiagnosticSeverity::Error,
                message: "bundler produced no entry chunk".to_string(),
                file: None,
                line: None,
                help: None,
            }])
        })
}
