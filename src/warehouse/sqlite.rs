use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;

use super::functions::register_functions;
use super::Warehouse;
use crate::download::ObjectCache;
use crate::error::{EtlError, Result};
use crate::loader::{parse_record, record_mapper, ParsedRow, SourceResolver};
use crate::schema::TableSchema;
use crate::sql::{BulkLoad, Dialect};
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

/// Local single-file warehouse
pub struct SqliteWarehouse {
    conn: Connection,
    cache: ObjectCache,
    force_download: bool,
}

impl SqliteWarehouse {
    pub fn open(db_path: &Path, cache: ObjectCache) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            EtlError::connectivity(format!("Failed to open {}: {}", db_path.display(), e))
        })?;

        // Optimize for bulk insert
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Self::with_connection(conn, cache)
    }

    pub fn open_in_memory(cache: ObjectCache) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, cache)
    }

    fn with_connection(conn: Connection, cache: ObjectCache) -> Result<Self> {
        register_functions(&conn)?;
        Ok(Self {
            conn,
            cache,
            force_download: false,
        })
    }

    /// Re-download `http(s)://` sources even when cached
    pub fn force_download(mut self, force: bool) -> Self {
        self.force_download = force;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Warehouse for SqliteWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let rows = self.conn.execute(sql, [])?;
        Ok(rows as u64)
    }

    /// Copy every JSON record under the load's source into its table in
    /// one transaction. Any unreadable or malformed record aborts the copy.
    fn bulk_load(&mut self, load: &BulkLoad, ui: &mut impl Ui) -> Result<u64> {
        let schema = load.table;
        let resolver = SourceResolver::new(&self.cache, self.force_download);
        let mapper = record_mapper(load, &resolver, ui)?;
        let objects = resolver.resolve(&load.source, ui)?;

        ui.log(format!(
            "{}: copying {} objects from {}",
            schema.name,
            objects.len(),
            load.source
        ));

        let insert_sql = insert_statement(schema);
        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;
        let mut batch: Vec<ParsedRow> = Vec::with_capacity(BATCH_SIZE);

        for (done, object) in objects.iter().enumerate() {
            let bytes = object.read()?;
            let records = serde_json::Deserializer::from_slice(&bytes).into_iter::<Value>();

            for (index, record) in records.enumerate() {
                let row = record
                    .map_err(|e| e.to_string())
                    .and_then(|value| parse_record(&value, schema, &mapper))
                    .map_err(|e| {
                        EtlError::load(
                            schema.name,
                            format!("{} record {}: {}", object.name(), index + 1, e),
                        )
                    })?;

                batch.push(row);

                if batch.len() >= BATCH_SIZE {
                    insert_batch(&tx, &insert_sql, &batch)?;
                    count += batch.len() as u64;
                    batch.clear();
                }
            }

            ui.set_progress(done as u64 + 1, objects.len() as u64, schema.name);
        }

        if !batch.is_empty() {
            insert_batch(&tx, &insert_sql, &batch)?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        ui.clear_progress();

        Ok(count)
    }
}

fn insert_statement(schema: &TableSchema) -> String {
    let columns: Vec<&str> = schema.insertable_columns().iter().map(|c| c.name).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn insert_batch(tx: &rusqlite::Transaction, sql: &str, batch: &[ParsedRow]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, value) in row.values.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}
