use arrow::array::{Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDateTime};
use relbench_common::data::table::DataTable;
use relbench_common::error::{RelBenchError, Result, ResultWithContext};
use std::collections::HashMap;

/// A relational table: columnar data plus the metadata that ties it into
/// the rest of the database (foreign keys, primary key, time column).
#[derive(Clone, Debug)]
pub struct Table {
    pub data: DataTable,
    pub fkey_col_to_pkey_table: HashMap<String, String>,
    pub pkey_col: Option<String>,
    pub time_col: Option<String>,
}

impl Table {
    pub fn new(
        data: DataTable,
        fkey_col_to_pkey_table: HashMap<String, String>,
        pkey_col: Option<String>,
        time_col: Option<String>,
    ) -> Self {
        Self {
            data,
            fkey_col_to_pkey_table,
            pkey_col,
            time_col,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }

    /// Earliest and latest values of the time column, or None when the table
    /// has no time column or no timestamped rows.
    pub fn time_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
        let Some(time_col) = self.time_col.as_deref() else {
            return Ok(None);
        };

        let (index, field) = self
            .data
            .schema
            .column_with_name(time_col)
            .with_context(|| format!("No time column named {time_col}"))?;
        if !matches!(
            field.data_type(),
            DataType::Timestamp(TimeUnit::Millisecond, _)
        ) {
            return Err(RelBenchError::task(format!(
                "Time column {time_col} must have millisecond timestamp type, not {:?}",
                field.data_type()
            )));
        }

        let mut min_ms: Option<i64> = None;
        let mut max_ms: Option<i64> = None;
        for batch in self.data.batches() {
            let array = batch
                .column(index)
                .as_any()
                .downcast_ref::<TimestampMillisecondArray>()
                .with_context(|| format!("Failed to downcast time column {time_col}"))?;
            for i in 0..array.len() {
                if array.is_null(i) {
                    continue;
                }
                let value = array.value(i);
                min_ms = Some(min_ms.map_or(value, |m| m.min(value)));
                max_ms = Some(max_ms.map_or(value, |m| m.max(value)));
            }
        }

        match (min_ms, max_ms) {
            (Some(min_ms), Some(max_ms)) => Ok(Some((
                timestamp_from_millis(min_ms)?,
                timestamp_from_millis(max_ms)?,
            ))),
            _ => Ok(None),
        }
    }
}

pub(crate) fn timestamp_from_millis(millis: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .with_context(|| format!("Timestamp out of range: {millis}"))
}
