//! Watch mode.
//!
//! After the initial run the CLI watches the source directory (and the
//! stylesheet's directory when the `css` task is planned). Each event for an
//! eligible source rebuilds that one component; removing a source deletes its
//! artifacts. Ctrl+C stops the loop.

mod watcher;

use std::path::PathBuf;

use wcb_bundler::scan::is_source_path;
use wcb_bundler::{Pipeline, Task, TaskPlan};
use wcb_config::BuildConfig;

pub use watcher::{Debouncer, FileChange, FileWatcher};

use crate::error::{Result, ResultExt};
use crate::ui;

/// What a filesystem event asks the pipeline to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    Rebuild(PathBuf),
    Remove(PathBuf),
    Stylesheet,
}

/// Map a change to an action, or `None` when the path is not ours.
pub fn action_for(config: &BuildConfig, plan: &TaskPlan, change: &FileChange) -> Option<WatchAction> {
    let path = change.path();

    if plan.contains(Task::Css) && config.css.as_ref().is_some_and(|css| css.input == path) {
        return Some(WatchAction::Stylesheet);
    }
    if !plan.builds_files() || !is_source_path(config, path) {
        return None;
    }

    match change {
        FileChange::Removed(p) => Some(WatchAction::Remove(p.clone())),
        // renamed away
        _ if !path.exists() => Some(WatchAction::Remove(path.to_path_buf())),
        _ => Some(WatchAction::Rebuild(path.to_path_buf())),
    }
}

/// Directories to watch for `plan`.
pub fn watch_dirs(config: &BuildConfig, plan: &TaskPlan) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if plan.builds_files() {
        dirs.push(config.source_dir.clone());
    }
    if plan.contains(Task::Css) {
        if let Some(dir) = config.css.as_ref().and_then(|css| css.input.parent()) {
            if !dirs.iter().any(|d| d == dir) {
                dirs.push(dir.to_path_buf());
            }
        }
    }
    dirs
}

/// Carry out one action and report it.
pub async fn apply(pipeline: &Pipeline, plan: &TaskPlan, action: WatchAction) {
    match action {
        WatchAction::Rebuild(path) => {
            let name = display_name(&path);
            let report = pipeline.build_file(&path, plan).await;
            match &report.result {
                Ok(artifacts) => ui::success(&format!(
                    "Rebuilt {name} ({} files) in {}",
                    artifacts.len(),
                    ui::format_duration(report.duration)
                )),
                Err(_) => ui::warning(&format!("Rebuild of {name} failed")),
            }
        }
        WatchAction::Remove(path) => {
            let name = display_name(&path);
            match pipeline.remove_file(&path) {
                Ok(removed) => ui::info(&format!(
                    "{name} removed, deleted {} artifact(s)",
                    removed.len()
                )),
                Err(e) => ui::error(&format!("Failed to clean up after {name}: {e}")),
            }
        }
        WatchAction::Stylesheet => {
            if let Some(report) = pipeline.run_css().await {
                match &report.result {
                    Ok(_) => ui::success(&format!(
                        "Rebuilt stylesheet in {}",
                        ui::format_duration(report.duration)
                    )),
                    Err(_) => ui::warning("Stylesheet rebuild failed"),
                }
            }
        }
    }
}

/// Watch until Ctrl+C, applying each change as it arrives.
pub async fn run(pipeline: Pipeline, plan: TaskPlan) -> Result<()> {
    let dirs = watch_dirs(pipeline.config(), &plan);
    if dirs.is_empty() {
        ui::warning("Nothing to watch for the requested tasks");
        return Ok(());
    }

    let (watcher, mut changes) = FileWatcher::new(dirs, pipeline.config().watch.debounce_ms)
        .with_hint("Create the directory, or run without --watch")?;
    let watched: Vec<String> = watcher
        .dirs()
        .iter()
        .map(|d| d.display().to_string())
        .collect();
    ui::info(&format!(
        "Watching {} for changes (Ctrl+C to stop)",
        watched.join(", ")
    ));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                if let Err(e) = res {
                    tracing::warn!("failed to listen for Ctrl+C: {e}");
                }
                break;
            }
            change = changes.recv() => {
                let Some(change) = change else { break };
                tracing::debug!(?change, "file event");
                if let Some(action) = action_for(pipeline.config(), &plan, &change) {
                    apply(&pipeline, &plan, action).await;
                }
            }
        }
    }

    ui::info("Stopped watching");
    Ok(())
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use wcb_config::CssConfig;

    fn project() -> (TempDir, BuildConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("components")).unwrap();
        let mut config = BuildConfig::default();
        config.css = Some(CssConfig {
            input: PathBuf::from("styles/main.css"),
            output: "components.css".to_string(),
        });
        let config = config.rooted_at(dir.path());
        (dir, config)
    }

    #[test]
    fn test_change_to_source_rebuilds() {
        let (dir, config) = project();
        let path = dir.path().join("components/card.js");
        fs::write(&path, "export {};").unwrap();

        let plan = TaskPlan::resolve(&[Task::Build]);
        let action = action_for(&config, &plan, &FileChange::Modified(path.clone()));
        assert_eq!(action, Some(WatchAction::Rebuild(path)));
    }

    #[test]
    fn test_removed_source_cleans_up() {
        let (dir, config) = project();
        let path = dir.path().join("components/card.js");
        let plan = TaskPlan::resolve(&[]);

        let action = action_for(&config, &plan, &FileChange::Removed(path.clone()));
        assert_eq!(action, Some(WatchAction::Remove(path.clone())));

        // a modify event for a file that no longer exists is a rename away
        let action = action_for(&config, &plan, &FileChange::Modified(path.clone()));
        assert_eq!(action, Some(WatchAction::Remove(path)));
    }

    #[test]
    fn test_unrelated_paths_are_ignored() {
        let (dir, config) = project();
        let plan = TaskPlan::resolve(&[Task::Build]);

        let nested = dir.path().join("components/lib/util.js");
        assert_eq!(action_for(&config, &plan, &FileChange::Created(nested)), None);

        let other_ext = dir.path().join("components/readme.md");
        assert_eq!(action_for(&config, &plan, &FileChange::Created(other_ext)), None);
    }

    #[test]
    fn test_stylesheet_change_only_when_css_planned() {
        let (dir, config) = project();
        let css = dir.path().join("styles/main.css");

        let plan = TaskPlan::resolve(&[Task::Css]);
        assert_eq!(
            action_for(&config, &plan, &FileChange::Modified(css.clone())),
            Some(WatchAction::Stylesheet)
        );

        let plan = TaskPlan::resolve(&[Task::Assemble]);
        assert_eq!(action_for(&config, &plan, &FileChange::Modified(css)), None);
    }

    #[test]
    fn test_sources_ignored_when_only_css_planned() {
        let (dir, config) = project();
        let path = dir.path().join("components/card.js");
        fs::write(&path, "export {};").unwrap();

        let plan = TaskPlan::resolve(&[Task::Css]);
        assert_eq!(action_for(&config, &plan, &FileChange::Modified(path)), None);
    }

    #[test]
    fn test_watch_dirs_follow_plan() {
        let (dir, config) = project();

        let dirs = watch_dirs(&config, &TaskPlan::resolve(&[Task::Build]));
        assert_eq!(
            dirs,
            vec![dir.path().join("components"), dir.path().join("styles")]
        );

        let dirs = watch_dirs(&config, &TaskPlan::resolve(&[Task::Assemble]));
        assert_eq!(dirs, vec![dir.path().join("components")]);
    }

    #[tokio::test]
    async fn test_apply_rebuild_then_remove() {
        let (dir, mut config) = project();
        config.css = None;
        config.compat.enabled = false;
        config.minify = false;
        let source = dir.path().join("components/card.js");
        fs::write(
            &source,
            "export class Card extends HTMLElement {}\ncustomElements.define('x-card', Card);\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(Arc::new(config), dir.path()).unwrap();
        let plan = TaskPlan::resolve(&[Task::Build]);

        apply(&pipeline, &plan, WatchAction::Rebuild(source.clone())).await;
        let bundle = dir.path().join("dist/card-bundle.js");
        let loader = dir.path().join("dist/card.js");
        assert!(bundle.is_file());
        assert!(loader.is_file());

        fs::remove_file(&source).unwrap();
        apply(&pipeline, &plan, WatchAction::Remove(source)).await;
        assert!(!bundle.exists());
        assert!(!loader.exists());
    }

    #[tokio::test]
    async fn test_live_change_is_rebuilt() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let components = root.join("components");
        fs::create_dir(&components).unwrap();
        let mut config = BuildConfig::default().rooted_at(&root);
        config.compat.enabled = false;
        config.minify = false;

        let source = components.join("card.js");
        let card = |tag: &str| {
            format!(
                "class Card extends HTMLElement {{}}\ncustomElements.define('{tag}', Card);\n"
            )
        };
        fs::write(&source, card("x-card")).unwrap();

        let pipeline = Pipeline::new(Arc::new(config), &root).unwrap();
        let plan = TaskPlan::resolve(&[Task::Build]);
        apply(&pipeline, &plan, WatchAction::Rebuild(source.clone())).await;
        let bundle = root.join("dist/card-bundle.js");
        let before = fs::metadata(&bundle).unwrap().modified().unwrap();

        let (_watcher, mut changes) = FileWatcher::new(vec![components], 0).unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        fs::write(&source, card("x-card-2")).unwrap();

        let rebuilt = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(change) = changes.recv().await {
                if let Some(action) = action_for(pipeline.config(), &plan, &change) {
                    apply(&pipeline, &plan, action).await;
                    if fs::read_to_string(&bundle).is_ok_and(|code| code.contains("x-card-2")) {
                        return true;
                    }
                }
            }
            false
        })
        .await;

        assert!(matches!(rebuilt, Ok(true)), "no rebuild observed: {rebuilt:?}");
        let after = fs::metadata(&bundle).unwrap().modified().unwrap();
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_missing_watch_dir_gives_a_hint() {
        let (dir, config) = project();
        fs::remove_dir(dir.path().join("components")).unwrap();
        let pipeline = Pipeline::new(Arc::new(config), dir.path()).unwrap();

        let err = run(pipeline, TaskPlan::resolve(&[Task::Assemble]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Hint: Create the directory"), "{err}");
    }
}
