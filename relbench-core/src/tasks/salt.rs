use crate::data::dataset::Dataset;
use crate::data::table::Table;
use crate::metrics::Metric;
use crate::task::{EntityTaskSpec, TaskType};
use ahash::AHashSet;
use arrow::array::{Array, StringArray};
use chrono::Duration;
use log::debug;
use relbench_common::datatypes::is_string_datatype;
use relbench_common::error::{RelBenchError, Result, ResultWithContext};
use serde::{Deserialize, Serialize};

pub const SALES_DOCUMENT_TABLE: &str = "salesdocument";
pub const SALES_DOCUMENT_ITEM_TABLE: &str = "salesdocumentitem";
pub const CREATION_TIMESTAMP_COL: &str = "CREATIONTIMESTAMP";

pub const HEADER_TARGET_COLS: [&str; 5] = [
    "SALESOFFICE",
    "SALESGROUP",
    "CUSTOMERPAYMENTTERMS",
    "SHIPPINGCONDITION",
    "HEADERINCOTERMSCLASSIFICATION",
];

pub const ITEM_TARGET_COLS: [&str; 3] = ["PLANT", "SHIPPINGPOINT", "ITEMINCOTERMSCLASSIFICATION"];

/// The sales-document fields a task may be asked to fill in. Header-level
/// targets live on the sales document, item-level targets on its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltTarget {
    Plant,
    ShippingPoint,
    ItemIncotermsClassification,
    SalesOffice,
    SalesGroup,
    CustomerPaymentTerms,
    ShippingCondition,
    HeaderIncotermsClassification,
}

impl SaltTarget {
    pub fn all() -> [SaltTarget; 8] {
        [
            SaltTarget::Plant,
            SaltTarget::ShippingPoint,
            SaltTarget::ItemIncotermsClassification,
            SaltTarget::SalesOffice,
            SaltTarget::SalesGroup,
            SaltTarget::CustomerPaymentTerms,
            SaltTarget::ShippingCondition,
            SaltTarget::HeaderIncotermsClassification,
        ]
    }

    pub fn target_col(&self) -> &'static str {
        match self {
            SaltTarget::Plant => "PLANT",
            SaltTarget::ShippingPoint => "SHIPPINGPOINT",
            SaltTarget::ItemIncotermsClassification => "ITEMINCOTERMSCLASSIFICATION",
            SaltTarget::SalesOffice => "SALESOFFICE",
            SaltTarget::SalesGroup => "SALESGROUP",
            SaltTarget::CustomerPaymentTerms => "CUSTOMERPAYMENTTERMS",
            SaltTarget::ShippingCondition => "SHIPPINGCONDITION",
            SaltTarget::HeaderIncotermsClassification => "HEADERINCOTERMSCLASSIFICATION",
        }
    }

    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            SaltTarget::Plant | SaltTarget::ShippingPoint | SaltTarget::ItemIncotermsClassification
        )
    }

    pub fn entity_table(&self) -> &'static str {
        if self.is_item_level() {
            SALES_DOCUMENT_ITEM_TABLE
        } else {
            SALES_DOCUMENT_TABLE
        }
    }

    pub fn entity_col(&self) -> &'static str {
        if self.is_item_level() {
            "ID"
        } else {
            "SALESDOCUMENT"
        }
    }

    pub fn task_name(&self) -> &'static str {
        match self {
            SaltTarget::Plant => "plant-salt",
            SaltTarget::ShippingPoint => "shippingpoint-salt",
            SaltTarget::ItemIncotermsClassification => "itemincotermsclassification-salt",
            SaltTarget::SalesOffice => "salesoffice-salt",
            SaltTarget::SalesGroup => "salesgroup-salt",
            SaltTarget::CustomerPaymentTerms => "customerpaymentterms-salt",
            SaltTarget::ShippingCondition => "shippingcondition-salt",
            SaltTarget::HeaderIncotermsClassification => "headerincotermsclassification-salt",
        }
    }
}

/// Fill in a missing sales-document field: predict the target column of a
/// sales document or sales document item as of a cutoff timestamp.
#[derive(Clone, Debug)]
pub struct SaltTask {
    dataset: Dataset,
    target: SaltTarget,
    num_labels: usize,
}

impl SaltTask {
    /// Build the task over the given dataset. Every sibling target column is
    /// removed from both sales-document tables so a model cannot read a
    /// correlated answer off the source data, and the label cardinality is
    /// computed from the remaining target column.
    pub fn new(mut dataset: Dataset, target: SaltTarget) -> Result<Self> {
        let target_col = target.target_col();

        let leakage_cols: Vec<&str> = HEADER_TARGET_COLS
            .iter()
            .chain(ITEM_TARGET_COLS.iter())
            .copied()
            .filter(|col| *col != target_col)
            .collect();

        let db = dataset.get_db_mut();
        for table_name in [SALES_DOCUMENT_TABLE, SALES_DOCUMENT_ITEM_TABLE] {
            let table = db.table_mut(table_name)?;
            table.data = table
                .data
                .clone()
                .drop_columns(leakage_cols.as_slice())
                .with_context(|| format!("Failed to strip leakage columns from {table_name}"))?;
        }
        debug!(
            "stripped {} leakage columns for target {target_col}",
            leakage_cols.len()
        );

        let entity_table = dataset.get_db().table(target.entity_table())?;
        let num_labels = distinct_label_count(entity_table, target_col)?;

        Ok(Self {
            dataset,
            target,
            num_labels,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn target(&self) -> SaltTarget {
        self.target
    }

    /// Number of distinct label values the task can predict
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }
}

impl EntityTaskSpec for SaltTask {
    fn name(&self) -> &str {
        self.target.task_name()
    }

    fn task_type(&self) -> TaskType {
        TaskType::MultilabelClassification
    }

    fn entity_table(&self) -> &str {
        self.target.entity_table()
    }

    fn entity_col(&self) -> &str {
        self.target.entity_col()
    }

    fn target_col(&self) -> &str {
        self.target.target_col()
    }

    fn time_col(&self) -> &str {
        CREATION_TIMESTAMP_COL
    }

    fn timedelta(&self) -> Duration {
        Duration::days(1)
    }

    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::Accuracy,
            Metric::MultilabelF1Micro,
            Metric::MultilabelF1Macro,
        ]
    }
}

/// Distinct non-null values of a string label column
fn distinct_label_count(table: &Table, target_col: &str) -> Result<usize> {
    let (index, field) = table
        .data
        .schema
        .column_with_name(target_col)
        .with_context(|| format!("No target column named {target_col}"))?;
    if !is_string_datatype(field.data_type()) {
        return Err(RelBenchError::task(format!(
            "Target column {target_col} must be string typed, not {:?}",
            field.data_type()
        )));
    }

    let mut labels: AHashSet<&str> = AHashSet::new();
    for batch in table.data.batches() {
        let array = batch
            .column(index)
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| format!("Failed to downcast target column {target_col}"))?;
        for i in 0..array.len() {
            if !array.is_null(i) {
                labels.insert(array.value(i));
            }
        }
    }
    Ok(labels.len())
}
