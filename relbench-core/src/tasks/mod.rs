pub mod salt;

use crate::data::dataset::Dataset;
use crate::tasks::salt::{SaltTarget, SaltTask};
use itertools::Itertools;
use lazy_static::lazy_static;
use relbench_common::error::{RelBenchError, Result};

pub const SAP_DATASET: &str = "rel-sap";

lazy_static! {
    static ref TASK_REGISTRY: Vec<(&'static str, &'static str, SaltTarget)> = SaltTarget::all()
        .into_iter()
        .map(|target| (SAP_DATASET, target.task_name(), target))
        .collect();
}

/// Names of the tasks registered for the given dataset, sorted
pub fn get_task_names(dataset_name: &str) -> Vec<&'static str> {
    TASK_REGISTRY
        .iter()
        .filter(|(registered, _, _)| *registered == dataset_name)
        .map(|(_, task_name, _)| *task_name)
        .sorted()
        .collect()
}

/// Instantiate a registered task over the given dataset
pub fn get_task(dataset_name: &str, task_name: &str, dataset: Dataset) -> Result<SaltTask> {
    let target = TASK_REGISTRY
        .iter()
        .find(|(registered_dataset, registered_task, _)| {
            *registered_dataset == dataset_name && *registered_task == task_name
        })
        .map(|(_, _, target)| *target)
        .ok_or_else(|| {
            RelBenchError::task(format!(
                "No task named {task_name} registered for dataset {dataset_name}"
            ))
        })?;
    SaltTask::new(dataset, target)
}
