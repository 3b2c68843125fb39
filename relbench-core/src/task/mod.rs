use crate::metrics::Metric;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// The kind of prediction problem a task poses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    BinaryClassification,
    Regression,
    MulticlassClassification,
    MultilabelClassification,
    LinkPrediction,
}

/// Declarative description of an entity task: predict the value of one
/// column of one table for an identified entity as of a cutoff timestamp.
///
/// The description is engine-free; evaluation against a database lives in
/// the runtime crate.
pub trait EntityTaskSpec {
    /// Task name as registered, e.g. "plant-salt"
    fn name(&self) -> &str;

    fn task_type(&self) -> TaskType;

    /// Table holding the entities to predict for
    fn entity_table(&self) -> &str;

    /// Column identifying the entity within the entity table
    fn entity_col(&self) -> &str;

    /// Column whose value is the prediction target
    fn target_col(&self) -> &str;

    /// Timestamp column separating known history from the label window
    fn time_col(&self) -> &str;

    /// Width of the label window that follows each cutoff timestamp
    fn timedelta(&self) -> Duration;

    fn metrics(&self) -> Vec<Metric>;
}
