//! The pipeline runner.
//!
//! [`Pipeline::run`] scans the source directory and builds every component
//! concurrently; [`Pipeline::build_file`] rebuilds a single one (watch mode).
//! A failing component is logged and recorded in its [`FileReport`]; it never
//! stops its siblings. Only problems that make the whole run meaningless
//! (configuration, an unreadable source directory, colliding output names)
//! are returned as `Err`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use wcb_config::BuildConfig;

use crate::names::{check_collisions, min_file, ArtifactNames};
use crate::scan::{scan_sources, SourceFile};
use crate::steps::{self, LoaderContext};
use crate::tasks::{Task, TaskPlan};
use crate::writer::{self, Artifact};
use crate::{Error, Result};

/// Upper bound on the default concurrency.
const MAX_DEFAULT_CONCURRENCY: usize = 8;

/// One file written by a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of building one source file.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub result: Result<Vec<WrittenArtifact>>,
    pub duration: Duration,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn artifacts(&self) -> &[WrittenArtifact] {
        self.result.as_deref().unwrap_or(&[])
    }
}

/// Outcome of a whole-project task that is not per file (`css`).
#[derive(Debug)]
pub struct TaskReport {
    pub task: Task,
    pub result: Result<Vec<WrittenArtifact>>,
    pub duration: Duration,
}

/// Everything a run did.
#[derive(Debug)]
pub struct RunReport {
    pub tasks: Vec<Task>,
    pub files: Vec<FileReport>,
    pub css: Option<TaskReport>,
    pub duration: Duration,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
            + usize::from(self.css.as_ref().is_some_and(|css| css.result.is_err()))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Every artifact written, in source order, CSS last.
    pub fn artifacts(&self) -> impl Iterator<Item = &WrittenArtifact> {
        self.files
            .iter()
            .flat_map(FileReport::artifacts)
            .chain(
                self.css
                    .iter()
                    .flat_map(|css| css.result.as_deref().unwrap_or(&[])),
            )
    }

    pub fn total_bytes(&self) -> u64 {
        self.artifacts().map(|a| a.size).sum()
    }
}

/// Builds components according to a [`BuildConfig`].
///
/// Cheap to clone; clones share the configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<BuildConfig>,
    root: PathBuf,
    concurrency: usize,
}

impl Pipeline {
    /// Create a pipeline. `root` is where the bundler resolves `node_modules`.
    ///
    /// Fails when the configuration is invalid, including an unknown
    /// compatibility target.
    pub fn new(config: Arc<BuildConfig>, root: impl Into<PathBuf>) -> Result<Self> {
        wcb_config::validate(&config)?;
        if config.compat.enabled {
            steps::validate_target(&config.compat.target)?;
        }

        let concurrency = config
            .concurrency
            .unwrap_or_else(|| num_cpus::get().min(MAX_DEFAULT_CONCURRENCY))
            .max(1);

        Ok(Self {
            config,
            root: root.into(),
            concurrency,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `tasks` (and their dependencies) over the whole project.
    pub async fn run(&self, tasks: &[Task]) -> Result<RunReport> {
        let started = Instant::now();
        let plan = TaskPlan::resolve(tasks);

        let files = if plan.builds_files() {
            let sources = scan_sources(&self.config)?;
            check_collisions(&self.config, &sources, self.minify_enabled(&plan))?;
            if sources.is_empty() {
                tracing::info!(
                    "No components found in {}",
                    self.config.source_dir.display()
                );
            }
            self.build_all(sources, &plan).await
        } else {
            Vec::new()
        };

        let css = if plan.contains(Task::Css) {
            self.run_css().await
        } else {
            None
        };

        Ok(RunReport {
            tasks: plan.tasks().to_vec(),
            files,
            css,
            duration: started.elapsed(),
        })
    }

    /// Build one source file. Errors are logged and returned in the report.
    pub async fn build_file(&self, path: &Path, plan: &TaskPlan) -> FileReport {
        let started = Instant::now();
        let source = SourceFile::new(path);

        let result = self.build_source(&source, plan).await;
        match &result {
            Ok(artifacts) => tracing::debug!(
                file = %source.file_name(),
                artifacts = artifacts.len(),
                "built"
            ),
            Err(e) => tracing::error!(file = %source.file_name(), "{e}"),
        }

        FileReport {
            source: path.to_path_buf(),
            result,
            duration: started.elapsed(),
        }
    }

    /// Delete the artifacts a source file produced.
    pub fn remove_file(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let source = SourceFile::new(path);
        let names = ArtifactNames::for_stem(&self.config, &source.stem);
        let removed = writer::remove_artifacts(&self.config.dest_dir, &names.all())?;
        tracing::debug!(file = %source.file_name(), removed = removed.len(), "removed artifacts");
        Ok(removed)
    }

    /// Run the stylesheet task. `None` when no stylesheet is configured.
    pub async fn run_css(&self) -> Option<TaskReport> {
        let css = self.config.css.clone()?;
        let started = Instant::now();
        let minify = self.config.minify;
        let dest_dir = self.config.dest_dir.clone();

        tracing::info!("Building stylesheet {}", css.input.display());
        let result = async {
            let input = css.input.clone();
            let output = run_blocking(move || steps::process_css(&input, minify)).await?;

            let mut artifacts = vec![Artifact::new(css.output.clone(), output.css)];
            if let Some(minified) = output.minified {
                artifacts.push(Artifact::new(min_file(&css.output), minified));
            }
            write(&dest_dir, artifacts)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(file = %css.input.display(), "{e}");
        }

        Some(TaskReport {
            task: Task::Css,
            result,
            duration: started.elapsed(),
        })
    }

    fn minify_enabled(&self, plan: &TaskPlan) -> bool {
        self.config.minify && plan.contains(Task::Minify)
    }

    async fn build_all(&self, sources: Vec<SourceFile>, plan: &TaskPlan) -> Vec<FileReport> {
        let total = sources.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (index, source) in sources.iter().enumerate() {
            let pipeline = self.clone();
            let plan = plan.clone();
            let semaphore = Arc::clone(&semaphore);
            let source = source.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire().await.ok();
                tracing::info!(
                    "Building ({} of {}) {}",
                    index + 1,
                    total,
                    source.file_name()
                );
                (index, pipeline.build_file(&source.path, &plan).await)
            });
        }

        let mut slots: Vec<Option<FileReport>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => tracing::error!("build task failed: {e}"),
            }
        }

        slots
            .into_iter()
            .zip(sources)
            .map(|(slot, source)| {
                slot.unwrap_or_else(|| FileReport {
                    source: source.path,
                    result: Err(Error::Task("build task did not complete".to_string())),
                    duration: Duration::ZERO,
                })
            })
            .collect()
    }

    async fn build_source(
        &self,
        source: &SourceFile,
        plan: &TaskPlan,
    ) -> Result<Vec<WrittenArtifact>> {
        let config = &self.config;
        let names = ArtifactNames::for_stem(config, &source.stem);
        let minify = self.minify_enabled(plan);
        let mut artifacts = Vec::with_capacity(6);

        tracing::debug!(file = %source.file_name(), "bundling");
        let primary = steps::bundle_esm(config, &self.root, &source.path).await?;

        match &primary.map {
            Some(map) => {
                let map_name = names.bundle_map();
                let code = format!("{}\n//# sourceMappingURL={}\n", primary.code, map_name);
                artifacts.push(Artifact::new(names.bundle.clone(), code));
                artifacts.push(Artifact::new(map_name, map.clone()));
            }
            None => artifacts.push(Artifact::new(names.bundle.clone(), primary.code.clone())),
        }

        let compat = if config.compat.enabled {
            tracing::debug!(
                file = %source.file_name(),
                target = %config.compat.target,
                "lowering"
            );
            let code = self.compat_bundle(source, &primary.code, &names).await?;
            artifacts.push(Artifact::new(names.compat.clone(), code.clone()));
            Some(code)
        } else {
            None
        };

        if minify {
            tracing::debug!(file = %source.file_name(), "minifying");
            let code = primary.code.clone();
            let file = names.bundle_min.clone();
            artifacts.push(Artifact::new(
                names.bundle_min.clone(),
                run_blocking(move || steps::minify_module(&code, &file)).await?,
            ));

            if let Some(code) = compat {
                let file = names.compat_min.clone();
                let target = config.compat.target.clone();
                artifacts.push(Artifact::new(
                    names.compat_min.clone(),
                    run_blocking(move || steps::minify_script(&code, &file, &target)).await?,
                ));
            }
        }

        let loader = steps::render_loader(&LoaderContext {
            component: source.stem.clone(),
            bundle: if minify {
                names.bundle_min.clone()
            } else {
                names.bundle.clone()
            },
            compat: config.compat.enabled.then(|| {
                if minify {
                    names.compat_min.clone()
                } else {
                    names.compat.clone()
                }
            }),
            polyfills: config.polyfills_url().map(str::to_string),
            base_url: config.component_location.clone(),
        })?;
        artifacts.push(Artifact::new(names.loader.clone(), loader));

        // Nothing reaches the destination unless every step succeeded.
        write(&config.dest_dir, artifacts)
    }

    /// Lower the primary bundle, then wrap it (and any helpers the lowering
    /// imported) into an IIFE.
    async fn compat_bundle(
        &self,
        source: &SourceFile,
        primary: &str,
        names: &ArtifactNames,
    ) -> Result<String> {
        let code = primary.to_string();
        let file = names.compat.clone();
        let target = self.config.compat.target.clone();
        let lowered = run_blocking(move || steps::lower(&code, &file, &target)).await?;

        // The staging module lives in the destination directory, which is
        // never scanned as a source. Its name ends up in the bundle's region
        // comments, so it depends on the stem alone.
        let staged = StagedModule::create(&self.config.dest_dir, &source.stem, &lowered)?;

        let wrapped = steps::bundle_iife(
            &self.config,
            &self.root,
            &staged.path,
            &steps::global_name(&source.stem),
        )
        .await?;
        Ok(wrapped.code)
    }
}

/// Lowered compat input, removed again when dropped.
struct StagedModule {
    path: PathBuf,
}

impl StagedModule {
    fn create(dest_dir: &Path, stem: &str, code: &str) -> Result<Self> {
        fs::create_dir_all(dest_dir)?;
        let path = dest_dir.join(staged_module_name(stem));
        fs::write(&path, code)?;
        Ok(Self { path })
    }
}

impl Drop for StagedModule {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("failed to remove {}: {e}", self.path.display());
        }
    }
}

fn staged_module_name(stem: &str) -> String {
    format!(".wcb-{stem}.mjs")
}

fn write(dest_dir: &Path, artifacts: Vec<Artifact>) -> Result<Vec<WrittenArtifact>> {
    let paths = writer::write_artifacts(dest_dir, &artifacts)?;
    Ok(paths
        .into_iter()
        .zip(&artifacts)
        .map(|(path, artifact)| WrittenArtifact {
            path,
            size: artifact.contents.len() as u64,
        })
        .collect())
}

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}
