#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use relbench_common::arrow::array::{
    Array, ArrayRef, StringArray, TimestampMillisecondArray,
};
use relbench_common::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use relbench_common::arrow::record_batch::RecordBatch;
use relbench_common::data::table::DataTable;
use relbench_core::data::{Database, Dataset, Table};
use relbench_core::tasks::salt::{
    CREATION_TIMESTAMP_COL, SALES_DOCUMENT_ITEM_TABLE, SALES_DOCUMENT_TABLE,
};
use std::collections::HashMap;
use std::sync::Arc;

pub fn ts(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn ts_with_seconds(day: u32, hour: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, second)
        .unwrap()
}

pub fn millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

fn string_field(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

fn timestamp_field(name: &str) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Millisecond, None), true)
}

/// Sales-document database with records placed on the exact window
/// boundaries the label extraction must honor.
///
/// Item rows (`salesdocumentitem`):
///   i1 at 2020-01-01 00:00:00, i2 at 2020-01-01 12:00, i3 at 2020-01-02
///   00:00, i4 at 2020-01-02 00:00:01, i5 at 2020-01-01 18:00 with a null
///   PLANT.
/// Header rows (`salesdocument`):
///   D1 at 2020-01-01 06:00, D2 at 2020-01-02 00:00, D3 at 2020-01-03 00:00.
pub fn salt_database() -> Database {
    let item_schema = Arc::new(Schema::new(vec![
        string_field("ID"),
        string_field("SALESDOCUMENT"),
        timestamp_field(CREATION_TIMESTAMP_COL),
        string_field("PLANT"),
        string_field("SHIPPINGPOINT"),
        string_field("ITEMINCOTERMSCLASSIFICATION"),
    ]));
    let item_batch = RecordBatch::try_new(
        item_schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["i1", "i2", "i3", "i4", "i5"])) as ArrayRef,
            Arc::new(StringArray::from(vec!["D1", "D1", "D2", "D2", "D3"])),
            Arc::new(TimestampMillisecondArray::from(vec![
                millis(ts(1, 0)),
                millis(ts(1, 12)),
                millis(ts(2, 0)),
                millis(ts_with_seconds(2, 0, 1)),
                millis(ts(1, 18)),
            ])),
            Arc::new(StringArray::from(vec![
                Some("P1"),
                Some("P2"),
                Some("P1"),
                Some("P3"),
                None,
            ])),
            Arc::new(StringArray::from(vec!["S1", "S2", "S3", "S4", "S5"])),
            Arc::new(StringArray::from(vec!["I1", "I2", "I1", "I2", "I1"])),
        ],
    )
    .unwrap();

    let header_schema = Arc::new(Schema::new(vec![
        string_field("SALESDOCUMENT"),
        timestamp_field(CREATION_TIMESTAMP_COL),
        string_field("SALESOFFICE"),
        string_field("SALESGROUP"),
        string_field("CUSTOMERPAYMENTTERMS"),
        string_field("SHIPPINGCONDITION"),
        string_field("HEADERINCOTERMSCLASSIFICATION"),
    ]));
    let header_batch = RecordBatch::try_new(
        header_schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["D1", "D2", "D3"])) as ArrayRef,
            Arc::new(TimestampMillisecondArray::from(vec![
                millis(ts(1, 6)),
                millis(ts(2, 0)),
                millis(ts(3, 0)),
            ])),
            Arc::new(StringArray::from(vec!["O1", "O2", "O3"])),
            Arc::new(StringArray::from(vec!["G1", "G1", "G2"])),
            Arc::new(StringArray::from(vec!["T1", "T2", "T3"])),
            Arc::new(StringArray::from(vec!["C1", "C2", "C1"])),
            Arc::new(StringArray::from(vec!["H1", "H1", "H2"])),
        ],
    )
    .unwrap();

    let mut db = Database::new();
    db.insert_table(
        SALES_DOCUMENT_TABLE,
        Table::new(
            DataTable::try_new(header_schema, vec![header_batch]).unwrap(),
            HashMap::new(),
            Some("SALESDOCUMENT".to_string()),
            Some(CREATION_TIMESTAMP_COL.to_string()),
        ),
    );
    db.insert_table(
        SALES_DOCUMENT_ITEM_TABLE,
        Table::new(
            DataTable::try_new(item_schema, vec![item_batch]).unwrap(),
            HashMap::from([(
                "SALESDOCUMENT".to_string(),
                SALES_DOCUMENT_TABLE.to_string(),
            )]),
            Some("ID".to_string()),
            Some(CREATION_TIMESTAMP_COL.to_string()),
        ),
    );
    db
}

pub fn salt_dataset() -> Dataset {
    Dataset::new(salt_database(), ts(2, 0), ts(3, 0))
}

pub fn string_column(table: &Table, name: &str) -> Vec<String> {
    let batch = table.data.to_record_batch().unwrap();
    let schema = batch.schema();
    let (index, _) = schema.column_with_name(name).unwrap();
    let array = batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    (0..array.len())
        .map(|i| array.value(i).to_string())
        .collect()
}

pub fn timestamp_column(table: &Table, name: &str) -> Vec<i64> {
    let batch = table.data.to_record_batch().unwrap();
    let schema = batch.schema();
    let (index, _) = schema.column_with_name(name).unwrap();
    let array = batch
        .column(index)
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    (0..array.len()).map(|i| array.value(i)).collect()
}
