pub mod map;
pub mod project;
pub mod task;
pub mod task_id;

pub use map::OrderedMap;
pub use project::{Project, Projects};
pub use task::{Task, TaskMap};
pub use task_id::{ParseTaskIdError, TaskId};
