use serde::{Deserialize, Serialize};

use super::map::OrderedMap;
use super::task::TaskMap;

/// Every project, keyed by its unique name, in creation order.
///
/// This is the whole persisted document.
pub type Projects = OrderedMap<Project>;

/// A named bucket of root tasks. The name lives in the enclosing map key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub tasks: TaskMap,
}

impl Project {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tasks in the project, at any depth.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks
            .values()
            .map(|task| 1 + task.descendant_count())
            .sum()
    }
}
