//! Named build tasks and their dependencies.
//!
//! | Task       | Depends on                   |
//! |------------|------------------------------|
//! | `assemble` | none                         |
//! | `minify`   | `assemble`                   |
//! | `css`      | none                         |
//! | `build`    | `assemble`, `minify`, `css`  |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Bundle, compatibility bundle and loader for every source.
    Assemble,
    /// `.min` variants of the bundles.
    Minify,
    /// The stylesheet pipeline.
    Css,
    /// Everything.
    Build,
}

impl Task {
    pub const ALL: [Task; 4] = [Task::Assemble, Task::Minify, Task::Css, Task::Build];

    pub fn name(self) -> &'static str {
        match self {
            Task::Assemble => "assemble",
            Task::Minify => "minify",
            Task::Css => "css",
            Task::Build => "build",
        }
    }

    pub fn dependencies(self) -> &'static [Task] {
        match self {
            Task::Assemble | Task::Css => &[],
            Task::Minify => &[Task::Assemble],
            Task::Build => &[Task::Assemble, Task::Minify, Task::Css],
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Task::ALL
            .into_iter()
            .find(|task| task.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "unknown task '{s}'. Expected one of: assemble, minify, css, build"
                ))
            })
    }
}

/// Requested tasks with their dependencies expanded, dependencies first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    order: Vec<Task>,
}

impl TaskPlan {
    /// Expand `requested` depth-first. An empty request means `build`.
    pub fn resolve(requested: &[Task]) -> Self {
        let roots: &[Task] = if requested.is_empty() {
            &[Task::Build]
        } else {
            requested
        };

        let mut order = Vec::new();
        for task in roots {
            visit(*task, &mut order);
        }
        Self { order }
    }

    pub fn contains(&self, task: Task) -> bool {
        self.order.contains(&task)
    }

    /// Whether any per-file work is planned.
    pub fn builds_files(&self) -> bool {
        self.contains(Task::Assemble)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.order
    }
}

fn visit(task: Task, order: &mut Vec<Task>) {
    if order.contains(&task) {
        return;
    }
    for dep in task.dependencies() {
        visit(*dep, order);
    }
    order.push(task);
}
