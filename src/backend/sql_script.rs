use crate::backend::BulkInsert;
use crate::domain::record::{Batch, FieldValue, Record};
use crate::domain::table::Table;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Renders every batch as one multi-row `INSERT` statement and appends it to a script file,
/// ready to be piped into a MariaDB/MySQL client.
#[derive(Clone)]
pub struct SqlScriptBackend {
    table: Table,
    out: Arc<Mutex<File>>,
}

impl SqlScriptBackend {
    pub async fn create(path: impl AsRef<Path>, table: Table) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .await
            .with_context(|| format!("could not create sql script {}", path.display()))?;
        Ok(SqlScriptBackend {
            table,
            out: Arc::new(Mutex::new(file)),
        })
    }

    pub async fn flush(&self) -> anyhow::Result<()> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}

impl BulkInsert for SqlScriptBackend {
    async fn insert_batch(&self, batch: Batch) -> anyhow::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let statement = render_insert(self.table, &batch);
        let mut out = self.out.lock().await;
        out.write_all(statement.as_bytes()).await?;
        debug!("appended insert of {} rows into {}", batch.len(), self.table);
        Ok(())
    }
}

/// `INSERT INTO <table> (<columns>) VALUES (..),(..);` followed by a newline.
pub fn render_insert(table: Table, batch: &[Record]) -> String {
    let rows: Vec<String> = batch.iter().map(render_row).collect();
    format!("{}\n{};\n", table.insert_prefix(), rows.join(",\n"))
}

fn render_row(record: &Record) -> String {
    let values: Vec<String> = record.fields().iter().map(render_value).collect();
    format!("({})", values.join(", "))
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(n) => n.to_string(),
        FieldValue::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''")),
    }
}
