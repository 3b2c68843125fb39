pub mod data;
pub mod metrics;
pub mod task;
pub mod tasks;

pub use arrow;
pub use relbench_common::error;
