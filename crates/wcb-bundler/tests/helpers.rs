//! Shared test utilities for wcb-bundler tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use wcb_bundler::Pipeline;
use wcb_config::BuildConfig;

/// A scratch project: `components/` for sources, `dist/` for output.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir(dir.path().join("components")).expect("create components dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("components")
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    /// Write a file relative to the project root.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    /// Write a component source.
    pub fn component(&self, file_name: &str, contents: &str) -> PathBuf {
        self.write(&format!("components/{file_name}"), contents)
    }

    /// Default configuration rooted at this project.
    pub fn config(&self) -> BuildConfig {
        BuildConfig::default().rooted_at(self.root())
    }

    pub fn pipeline(&self, config: BuildConfig) -> Pipeline {
        Pipeline::new(Arc::new(config), self.root()).expect("valid config")
    }

    pub fn read_dist(&self, name: &str) -> String {
        fs::read_to_string(self.dist().join(name))
            .unwrap_or_else(|e| panic!("missing dist/{name}: {e}"))
    }

    /// Sorted file names in `dist/`, empty when it does not exist.
    pub fn dist_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.dist()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// A component using syntax newer than ES2015 that lowers without helpers.
pub fn modern_source(tag: &str) -> String {
    format!(
        r#"export function label(options) {{
  return options?.label ?? 'untitled';
}}

class Modern extends HTMLElement {{
  connectedCallback() {{
    this.textContent = label(this.dataset) + 2 ** 3;
  }}
}}

customElements.define('{tag}', Modern);
"#
    )
}

/// A component using only syntax every target supports, so lowering needs
/// no runtime helpers.
pub fn plain_source(tag: &str) -> String {
    format!(
        r#"const greeting = (name) => `hello ${{name}}`;

class Plain extends HTMLElement {{
  connectedCallback() {{
    this.textContent = greeting('{tag}');
  }}
}}

customElements.define('{tag}', Plain);
"#
    )
}

/// The six artifacts of a default build.
pub fn default_artifacts(stem: &str) -> Vec<String> {
    let mut names = vec![
        format!("{stem}-bundle.js"),
        format!("{stem}-bundle.js.map"),
        format!("{stem}-bundle.min.js"),
        format!("{stem}-bundle-compat.js"),
        format!("{stem}-bundle-compat.min.js"),
        format!("{stem}.js"),
    ];
    names.sort();
    names
}
