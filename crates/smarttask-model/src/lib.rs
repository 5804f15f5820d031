#![forbid(unsafe_code)]

pub mod entities;
pub mod error;
pub mod ids;
pub mod timestamp;

pub use entities::{normalize_title, Patch, Subtask, Task};
pub use error::{Error, Result};
pub use ids::{OwnerId, SubtaskId, TaskId};
pub use timestamp::Timestamp;

pub const CRATE_NAME: &str = "smarttask-model";
