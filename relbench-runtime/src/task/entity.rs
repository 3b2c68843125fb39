use crate::data::util::{DataFrameUtils, SessionContextUtils};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use datafusion::prelude::SessionContext;
use datafusion_common::{JoinType, ScalarValue};
use datafusion_expr::{lit, Expr, SortExpr};
use log::debug;
use relbench_common::arrow::array::{ArrayRef, TimestampMillisecondArray};
use relbench_common::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use relbench_common::arrow::record_batch::RecordBatch;
use relbench_common::column::flat_col;
use relbench_common::data::table::DataTable;
use relbench_common::error::{RelBenchError, Result};
use relbench_core::data::{Database, Table};
use relbench_core::task::EntityTaskSpec;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the cutoff timestamp column in generated task tables
pub const TIMESTAMP_COL: &str = "timestamp";

/// Evaluate an entity-task specification against a database, producing the
/// labeled (timestamp, entity, target) table the task asks a model to
/// predict.
#[async_trait]
pub trait MakeTable {
    /// One label row per (cutoff, entity) pair whose time column falls in
    /// the window following the cutoff: `t < time_col <= t + timedelta`.
    async fn make_table(&self, db: &Database, cutoffs: &[NaiveDateTime]) -> Result<Table>;

    /// Label rows for an explicit half-open window: `start <= time_col < end`.
    async fn make_table_between(
        &self,
        db: &Database,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Table>;
}

#[async_trait]
impl<T> MakeTable for T
where
    T: EntityTaskSpec + Sync,
{
    async fn make_table(&self, db: &Database, cutoffs: &[NaiveDateTime]) -> Result<Table> {
        let entity_table = db.table(self.entity_table())?;
        validate_task_columns(self, entity_table)?;
        if entity_table.data.has_column(TIMESTAMP_COL) {
            return Err(RelBenchError::task(format!(
                "Entity table {} may not contain a column named {TIMESTAMP_COL}",
                self.entity_table()
            )));
        }

        let ctx = SessionContext::new();
        let cutoff_df = ctx.data_table("cutoffs", cutoff_table(cutoffs)?).await?;
        let entity_df = ctx
            .data_table("entities", entity_table.data.clone())
            .await?;

        // Window join: every cutoff against every in-window record
        let window_end = flat_col(TIMESTAMP_COL) + lit(interval_literal(self.timedelta())?);
        let joined = cutoff_df.join_on(
            entity_df,
            JoinType::Inner,
            vec![
                flat_col(self.time_col()).gt(flat_col(TIMESTAMP_COL)),
                flat_col(self.time_col()).lt_eq(window_end),
            ],
        )?;

        let labels = joined
            .filter(flat_col(self.target_col()).is_not_null())?
            .select(vec![
                flat_col(TIMESTAMP_COL),
                flat_col(self.entity_col()),
                flat_col(self.target_col()),
            ])?
            .sort(vec![
                SortExpr::new(flat_col(TIMESTAMP_COL), true, false),
                SortExpr::new(flat_col(self.entity_col()), true, false),
            ])?;

        let data = labels.collect_to_table().await?;
        debug!(
            "{}: {} label rows from {} cutoffs",
            self.name(),
            data.num_rows(),
            cutoffs.len()
        );
        Ok(task_table(self, data))
    }

    async fn make_table_between(
        &self,
        db: &Database,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Table> {
        let entity_table = db.table(self.entity_table())?;
        validate_task_columns(self, entity_table)?;

        let ctx = SessionContext::new();
        let entity_df = ctx
            .data_table("entities", entity_table.data.clone())
            .await?;

        let in_window = flat_col(self.time_col())
            .gt_eq(timestamp_literal(start))
            .and(flat_col(self.time_col()).lt(timestamp_literal(end)));
        let labels = entity_df
            .filter(in_window)?
            .filter(flat_col(self.target_col()).is_not_null())?
            .select(vec![
                flat_col(self.time_col()).alias(TIMESTAMP_COL),
                flat_col(self.entity_col()),
                flat_col(self.target_col()),
            ])?
            .sort(vec![
                SortExpr::new(flat_col(TIMESTAMP_COL), true, false),
                SortExpr::new(flat_col(self.entity_col()), true, false),
            ])?;

        let data = labels.collect_to_table().await?;
        debug!(
            "{}: {} label rows between {start} and {end}",
            self.name(),
            data.num_rows()
        );
        Ok(task_table(self, data))
    }
}

fn validate_task_columns<T: EntityTaskSpec + ?Sized>(task: &T, table: &Table) -> Result<()> {
    for col in [task.entity_col(), task.target_col(), task.time_col()] {
        if !table.data.has_column(col) {
            return Err(RelBenchError::task(format!(
                "Entity table {} has no column named {col}",
                task.entity_table()
            )));
        }
    }
    Ok(())
}

fn task_table<T: EntityTaskSpec + ?Sized>(task: &T, data: DataTable) -> Table {
    Table::new(
        data,
        HashMap::from([(task.entity_col().to_string(), task.entity_table().to_string())]),
        None,
        Some(TIMESTAMP_COL.to_string()),
    )
}

/// Single-column table of cutoff timestamps
fn cutoff_table(cutoffs: &[NaiveDateTime]) -> Result<DataTable> {
    let values: Vec<i64> = cutoffs
        .iter()
        .map(|ts| ts.and_utc().timestamp_millis())
        .collect();
    let schema = Arc::new(Schema::new(vec![Field::new(
        TIMESTAMP_COL,
        DataType::Timestamp(TimeUnit::Millisecond, None),
        true,
    )]));
    let array = Arc::new(TimestampMillisecondArray::from(values)) as ArrayRef;
    let batch = RecordBatch::try_new(schema.clone(), vec![array])?;
    DataTable::try_new(schema, vec![batch])
}

fn interval_literal(timedelta: chrono::Duration) -> Result<ScalarValue> {
    let whole_days = timedelta.num_days();
    let leftover_millis = (timedelta - chrono::Duration::days(whole_days)).num_milliseconds();
    let days = i32::try_from(whole_days)
        .map_err(|_| RelBenchError::task(format!("Task timedelta out of range: {timedelta}")))?;
    let millis = i32::try_from(leftover_millis)
        .map_err(|_| RelBenchError::task(format!("Task timedelta out of range: {timedelta}")))?;
    Ok(ScalarValue::new_interval_dt(days, millis))
}

fn timestamp_literal(ts: NaiveDateTime) -> Expr {
    lit(ScalarValue::TimestampMillisecond(
        Some(ts.and_utc().timestamp_millis()),
        None,
    ))
}
