use ahash::AHashMap;
use arrow::array::{Array, StringArray};
use relbench_common::datatypes::is_string_datatype;
use relbench_common::error::{RelBenchError, Result, ResultWithContext};
use serde::{Deserialize, Serialize};

/// Evaluation metrics over categorical label columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    MultilabelF1Micro,
    MultilabelF1Macro,
}

#[derive(Default)]
struct ClassCounts {
    true_pos: usize,
    false_pos: usize,
    false_neg: usize,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::MultilabelF1Micro => "multilabel_f1_micro",
            Metric::MultilabelF1Macro => "multilabel_f1_macro",
        }
    }

    /// Score predicted labels against true labels. Both arrays must be
    /// string typed and of equal length. Rows with a null true label are
    /// ignored; a null prediction never matches.
    pub fn evaluate(&self, y_true: &dyn Array, y_pred: &dyn Array) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(RelBenchError::task(format!(
                "Length mismatch between true ({}) and predicted ({}) labels",
                y_true.len(),
                y_pred.len()
            )));
        }
        if !is_string_datatype(y_true.data_type()) || !is_string_datatype(y_pred.data_type()) {
            return Err(RelBenchError::task(format!(
                "Labels must be string typed, not {:?} and {:?}",
                y_true.data_type(),
                y_pred.data_type()
            )));
        }
        let y_true = y_true
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| "Failed to downcast true labels")?;
        let y_pred = y_pred
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| "Failed to downcast predicted labels")?;

        match self {
            Metric::Accuracy => Ok(accuracy(y_true, y_pred)),
            Metric::MultilabelF1Micro => Ok(f1_micro(y_true, y_pred)),
            Metric::MultilabelF1Macro => Ok(f1_macro(y_true, y_pred)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn label_pairs<'a>(
    y_true: &'a StringArray,
    y_pred: &'a StringArray,
) -> impl Iterator<Item = (&'a str, Option<&'a str>)> {
    (0..y_true.len()).filter_map(move |i| {
        if y_true.is_null(i) {
            None
        } else {
            let pred = (!y_pred.is_null(i)).then(|| y_pred.value(i));
            Some((y_true.value(i), pred))
        }
    })
}

fn accuracy(y_true: &StringArray, y_pred: &StringArray) -> f64 {
    let mut total = 0usize;
    let mut correct = 0usize;
    for (true_label, pred_label) in label_pairs(y_true, y_pred) {
        total += 1;
        if pred_label == Some(true_label) {
            correct += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64
}

fn class_counts<'a>(
    y_true: &'a StringArray,
    y_pred: &'a StringArray,
) -> AHashMap<&'a str, ClassCounts> {
    let mut counts: AHashMap<&str, ClassCounts> = AHashMap::new();
    for (true_label, pred_label) in label_pairs(y_true, y_pred) {
        if pred_label == Some(true_label) {
            counts.entry(true_label).or_default().true_pos += 1;
        } else {
            counts.entry(true_label).or_default().false_neg += 1;
            if let Some(pred_label) = pred_label {
                counts.entry(pred_label).or_default().false_pos += 1;
            }
        }
    }
    counts
}

fn f1_score(true_pos: usize, false_pos: usize, false_neg: usize) -> f64 {
    let denominator = 2 * true_pos + false_pos + false_neg;
    if denominator == 0 {
        return 0.0;
    }
    (2 * true_pos) as f64 / denominator as f64
}

/// F1 over the global true-positive, false-positive, and false-negative
/// counts pooled across classes
fn f1_micro(y_true: &StringArray, y_pred: &StringArray) -> f64 {
    let counts = class_counts(y_true, y_pred);
    let true_pos: usize = counts.values().map(|c| c.true_pos).sum();
    let false_pos: usize = counts.values().map(|c| c.false_pos).sum();
    let false_neg: usize = counts.values().map(|c| c.false_neg).sum();
    f1_score(true_pos, false_pos, false_neg)
}

/// Unweighted mean of per-class F1 over every class observed in either the
/// true or the predicted labels
fn f1_macro(y_true: &StringArray, y_pred: &StringArray) -> f64 {
    let counts = class_counts(y_true, y_pred);
    if counts.is_empty() {
        return 0.0;
    }
    let total: f64 = counts
        .values()
        .map(|c| f1_score(c.true_pos, c.false_pos, c.false_neg))
        .sum();
    total / counts.len() as f64
}
