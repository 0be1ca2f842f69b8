pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod schema;
pub mod sql;
pub mod ui;
pub mod warehouse;

pub use cli::{Cli, Commands};
pub use config::{DwhConfig, SourceConfig};
pub use error::{EtlError, Result};
pub use pipeline::{Phase, Pipeline, RunSummary};
pub use ui::{LogUi, SilentUi, Ui, UiApp};
pub use warehouse::{RedshiftWarehouse, SqliteWarehouse, Warehouse};
