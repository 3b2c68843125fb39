use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::{DataFrame, SessionContext};
use relbench_common::data::table::DataTable;
use relbench_common::error::Result;
use std::sync::Arc;

#[async_trait]
pub trait SessionContextUtils {
    /// Register an in-memory table under the given name and return a
    /// DataFrame over it
    async fn data_table(&self, name: &str, tbl: DataTable) -> Result<DataFrame>;
}

#[async_trait]
impl SessionContextUtils for SessionContext {
    async fn data_table(&self, name: &str, tbl: DataTable) -> Result<DataFrame> {
        let mem_table = MemTable::try_new(tbl.schema.clone(), vec![tbl.batches])?;
        self.register_table(name, Arc::new(mem_table))?;
        Ok(self.table(name).await?)
    }
}

#[async_trait]
pub trait DataFrameUtils {
    async fn collect_to_table(self) -> Result<DataTable>;
}

#[async_trait]
impl DataFrameUtils for DataFrame {
    async fn collect_to_table(self) -> Result<DataTable> {
        let schema = self.schema().inner().clone();
        let batches = self.collect().await?;
        DataTable::try_new(schema, batches)
    }
}
