pub mod database;
pub mod dataset;
pub mod table;

pub use database::Database;
pub use dataset::Dataset;
pub use table::Table;
