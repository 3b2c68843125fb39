use arrow::{
    compute::concat_batches,
    datatypes::{Schema, SchemaRef},
    ipc::{reader::StreamReader, writer::StreamWriter},
    record_batch::RecordBatch,
};

use crate::error::{RelBenchError, Result, ResultWithContext};

#[cfg(feature = "prettyprint")]
use arrow::util::pretty::pretty_format_batches;
use std::{io::Cursor, sync::Arc};

#[cfg(feature = "json")]
use arrow::json;

/// In-memory columnar table backed by one or more Arrow record batches
/// that all share a common schema.
#[derive(Clone, Debug)]
pub struct DataTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl DataTable {
    pub fn try_new(schema: SchemaRef, partitions: Vec<RecordBatch>) -> Result<Self> {
        // Make all columns nullable
        let schema_fields: Vec<_> = schema
            .fields
            .iter()
            .map(|f| f.as_ref().clone().with_nullable(true))
            .collect();
        let schema = Arc::new(Schema::new(schema_fields));
        if partitions.iter().all(|batch| {
            let batch_schema_fields: Vec<_> = batch
                .schema()
                .fields
                .iter()
                .map(|f| f.as_ref().clone().with_nullable(true))
                .collect();
            let batch_schema = Arc::new(Schema::new(batch_schema_fields));
            schema.fields.contains(&batch_schema.fields)
        }) {
            Ok(Self {
                schema,
                batches: partitions,
            })
        } else {
            Err(RelBenchError::internal(
                "Mismatch between schema and batches",
            ))
        }
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|batch| batch.num_rows()).sum()
    }

    /// Keep, at most, the first n rows
    pub fn head(&self, n: usize) -> Self {
        let mut so_far = 0;
        let mut head_batches: Vec<RecordBatch> = Vec::new();

        for batch in &self.batches {
            if so_far == n {
                break;
            } else if so_far + batch.num_rows() <= n {
                // Keep full batch
                so_far += batch.num_rows();
                head_batches.push(batch.clone());
            } else {
                // Keep partial batch
                let keep = n - so_far;
                head_batches.push(batch.slice(0, keep));
                break;
            }
        }

        Self {
            schema: self.schema.clone(),
            batches: head_batches,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.column_with_name(name).is_some()
    }

    /// Remove the named columns from the schema and from every batch.
    /// Names that are not present are ignored.
    pub fn drop_columns(self, columns: &[&str]) -> Result<Self> {
        let retained: Vec<usize> = self
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_i, field)| !columns.contains(&field.name().as_str()))
            .map(|(i, _)| i)
            .collect();

        if retained.len() == self.schema.fields.len() {
            // Nothing to drop
            return Ok(self);
        }

        let new_schema = Arc::new(self.schema.project(&retained)?) as SchemaRef;
        let new_batches = self
            .batches
            .iter()
            .map(|batch| Ok(batch.project(&retained)?))
            .collect::<Result<Vec<_>>>()?;

        Self::try_new(new_schema, new_batches)
    }

    /// Project the table down to the named columns, in the given order.
    /// Unknown names are an error.
    pub fn select_columns(&self, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|name| {
                self.schema
                    .column_with_name(name)
                    .map(|(i, _)| i)
                    .with_context(|| format!("No column named {name}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let new_schema = Arc::new(self.schema.project(&indices)?) as SchemaRef;
        let new_batches = self
            .batches
            .iter()
            .map(|batch| Ok(batch.project(&indices)?))
            .collect::<Result<Vec<_>>>()?;

        Self::try_new(new_schema, new_batches)
    }

    pub fn batches(&self) -> &Vec<RecordBatch> {
        &self.batches
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut schema = self.schema.clone();
        if let Some(batch) = self.batches.first() {
            schema = batch.schema()
        }
        concat_batches(&schema, &self.batches)
            .with_context(|| String::from("Failed to concatenate RecordBatches"))
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut writer = json::ArrayWriter::new(Vec::new());
        for batch in &self.batches {
            writer.write(batch)?;
        }
        writer.finish()?;
        let buffer = writer.into_inner();
        if buffer.is_empty() {
            return Ok(serde_json::Value::Array(Vec::new()));
        }
        Ok(serde_json::from_slice(buffer.as_slice())?)
    }

    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if let serde_json::Value::Array(values) = value {
            let schema = json::reader::infer_json_schema_from_iterator(
                values.iter().take(1024).map(|v| Ok(v.clone())),
            )
            .with_context(|| "Failed to infer schema from JSON rows")?;
            let schema_ref = Arc::new(schema);

            // read record batches
            let reader = json::ReaderBuilder::new(schema_ref.clone()).with_coerce_primitive(true);
            let mut decoder = reader.build_decoder()?;

            let mut batches: Vec<RecordBatch> = Vec::new();
            decoder.serialize(values.as_slice())?;

            while let Some(batch) = decoder
                .flush()
                .with_context(|| "Failed to read json to arrow")?
            {
                batches.push(batch);
            }

            Self::try_new(schema_ref, batches)
        } else {
            Err(RelBenchError::internal(format!(
                "Expected JSON array, not: {value}"
            )))
        }
    }

    // Serialize to bytes using Arrow IPC format
    pub fn to_ipc_bytes(&self) -> Result<Vec<u8>> {
        let buffer: Vec<u8> = Vec::new();
        let mut stream_writer = StreamWriter::try_new(buffer, self.schema.as_ref())?;

        for batch in &self.batches {
            stream_writer.write(batch)?;
        }

        stream_writer.finish()?;
        Ok(stream_writer.into_inner()?)
    }

    pub fn from_ipc_bytes(data: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(data);
        let reader = StreamReader::try_new(cursor, None)?;
        let schema = reader.schema();
        let mut batches: Vec<RecordBatch> = Vec::new();

        for batch in reader {
            batches.push(batch?);
        }

        Ok(Self { schema, batches })
    }

    #[cfg(feature = "prettyprint")]
    pub fn pretty_format(&self, max_rows: Option<usize>) -> Result<String> {
        if let Some(max_rows) = max_rows {
            pretty_format_batches(&self.head(max_rows).batches)
                .with_context(|| String::from("Failed to pretty print"))
                .map(|s| s.to_string())
        } else {
            pretty_format_batches(&self.batches)
                .with_context(|| String::from("Failed to pretty print"))
                .map(|s| s.to_string())
        }
    }
}

impl From<RecordBatch> for DataTable {
    fn from(value: RecordBatch) -> Self {
        Self {
            schema: value.schema(),
            batches: vec![value],
        }
    }
}

#[cfg(feature = "json")]
#[cfg(test)]
mod tests {
    use crate::data::table::DataTable;
    use serde_json::json;

    fn order_table() -> DataTable {
        DataTable::from_json(&json!([
            {"ID": "a", "PLANT": "P1", "SHIPPINGPOINT": "S1"},
            {"ID": "b", "PLANT": "P2", "SHIPPINGPOINT": "S2"},
            {"ID": "c", "PLANT": "P1", "SHIPPINGPOINT": "S3"},
        ]))
        .unwrap()
    }

    #[test]
    fn test_drop_columns() {
        let table = order_table();
        assert_eq!(table.column_names(), vec!["ID", "PLANT", "SHIPPINGPOINT"]);

        let dropped = table.drop_columns(&["SHIPPINGPOINT", "BOGUS"]).unwrap();
        assert_eq!(dropped.column_names(), vec!["ID", "PLANT"]);
        assert_eq!(dropped.num_rows(), 3);

        let expected = json!([
            {"ID": "a", "PLANT": "P1"},
            {"ID": "b", "PLANT": "P2"},
            {"ID": "c", "PLANT": "P1"},
        ]);
        assert_eq!(dropped.to_json().unwrap(), expected);
    }

    #[test]
    fn test_select_columns() {
        let table = order_table();
        let selected = table.select_columns(&["PLANT", "ID"]).unwrap();
        assert_eq!(selected.column_names(), vec!["PLANT", "ID"]);

        let err = table.select_columns(&["MISSING"]).unwrap_err();
        assert!(err.to_string().contains("No column named MISSING"));
    }

    #[test]
    fn test_head() {
        let table = order_table();
        assert_eq!(table.head(2).num_rows(), 2);
        assert_eq!(table.head(10).num_rows(), 3);
    }

    #[test]
    fn test_ipc_round_trip() {
        let table = order_table();
        let bytes = table.to_ipc_bytes().unwrap();
        let restored = DataTable::from_ipc_bytes(bytes.as_slice()).unwrap();
        assert_eq!(restored.to_json().unwrap(), table.to_json().unwrap());
    }
}
