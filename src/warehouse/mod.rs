//! Drivers: the two operations the pipeline needs from a warehouse

pub mod functions;
pub mod redshift;
pub mod sqlite;

pub use redshift::RedshiftWarehouse;
pub use sqlite::SqliteWarehouse;

use crate::error::Result;
use crate::sql::{BulkLoad, Dialect};
use crate::ui::Ui;

pub trait Warehouse {
    /// SQL flavor this warehouse accepts
    fn dialect(&self) -> Dialect;

    /// Execute one statement and wait for it, returning rows affected
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Bulk-copy a source location into a staging table, returning rows loaded
    fn bulk_load(&mut self, load: &BulkLoad, ui: &mut impl Ui) -> Result<u64>;
}
