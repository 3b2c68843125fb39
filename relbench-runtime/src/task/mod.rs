pub mod entity;

pub use entity::{MakeTable, TIMESTAMP_COL};
