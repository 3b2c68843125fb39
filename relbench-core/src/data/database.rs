use crate::data::table::Table;
use chrono::NaiveDateTime;
use relbench_common::error::{RelBenchError, Result};
use std::collections::HashMap;

/// A collection of named relational tables.
#[derive(Clone, Debug, Default)]
pub struct Database {
    pub table_dict: HashMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_tables(table_dict: HashMap<String, Table>) -> Self {
        Self { table_dict }
    }

    pub fn insert_table<S: Into<String>>(&mut self, name: S, table: Table) {
        self.table_dict.insert(name.into(), table);
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.table_dict
            .get(name)
            .ok_or_else(|| RelBenchError::task(format!("No table named {name} in database")))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.table_dict
            .get_mut(name)
            .ok_or_else(|| RelBenchError::task(format!("No table named {name} in database")))
    }

    /// Earliest timestamp across the time columns of all tables
    pub fn min_timestamp(&self) -> Result<NaiveDateTime> {
        self.timestamp_bounds()?
            .map(|(min, _)| min)
            .ok_or_else(|| RelBenchError::task("Database has no timestamped rows"))
    }

    /// Latest timestamp across the time columns of all tables
    pub fn max_timestamp(&self) -> Result<NaiveDateTime> {
        self.timestamp_bounds()?
            .map(|(_, max)| max)
            .ok_or_else(|| RelBenchError::task("Database has no timestamped rows"))
    }

    fn timestamp_bounds(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
        let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for table in self.table_dict.values() {
            if let Some((table_min, table_max)) = table.time_range()? {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(table_min), max.max(table_max)),
                    None => (table_min, table_max),
                });
            }
        }
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Table;
    use arrow::array::{ArrayRef, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use relbench_common::data::table::DataTable;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn timestamped_table(name_values: Vec<&str>, ts_values: Vec<Option<i64>>) -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("ID", DataType::Utf8, true),
            Field::new(
                "CREATED",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                true,
            ),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(name_values)) as ArrayRef,
                Arc::new(TimestampMillisecondArray::from(ts_values)),
            ],
        )
        .unwrap();
        Table::new(
            DataTable::try_new(schema, vec![batch]).unwrap(),
            HashMap::new(),
            Some("ID".to_string()),
            Some("CREATED".to_string()),
        )
    }

    fn millis(year: i32, month: u32, day: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_timestamp_bounds_across_tables() {
        let mut db = Database::new();
        db.insert_table(
            "first",
            timestamped_table(
                vec!["a", "b"],
                vec![Some(millis(2020, 1, 5)), Some(millis(2020, 2, 1))],
            ),
        );
        db.insert_table(
            "second",
            timestamped_table(vec!["c", "d"], vec![Some(millis(2020, 1, 2)), None]),
        );

        let min = db.min_timestamp().unwrap();
        let max = db.max_timestamp().unwrap();
        assert_eq!(
            min,
            NaiveDate::from_ymd_opt(2020, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(
            max,
            NaiveDate::from_ymd_opt(2020, 2, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_empty_database_has_no_timestamps() {
        let db = Database::new();
        assert!(db.min_timestamp().is_err());
    }

    #[test]
    fn test_unknown_table_is_an_error() {
        let db = Database::new();
        let err = db.table("missing").unwrap_err();
        assert!(err.to_string().contains("No table named missing"));
    }
}
