use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tokio::runtime::Runtime;

use super::Warehouse;
use crate::config::ClusterConfig;
use crate::error::{EtlError, Result};
use crate::sql::{BulkLoad, Dialect};
use crate::ui::Ui;

/// Redshift cluster reached over the Postgres wire protocol.
///
/// Statements go through the simple-query protocol, one at a time, on a
/// single connection driven by a private current-thread runtime.
pub struct RedshiftWarehouse {
    runtime: Runtime,
    conn: PgConnection,
}

impl RedshiftWarehouse {
    pub fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = PgConnectOptions::new()
            .host(&cluster.host)
            .port(cluster.db_port)
            .username(&cluster.db_user)
            .password(&cluster.db_password)
            .database(&cluster.db_name);

        let conn = runtime
            .block_on(PgConnection::connect_with(&options))
            .map_err(|e| {
                EtlError::connectivity(format!(
                    "{}:{}/{}: {}",
                    cluster.host, cluster.db_port, cluster.db_name, e
                ))
            })?;

        tracing::info!(host = %cluster.host, db = %cluster.db_name, "connected to cluster");

        Ok(Self { runtime, conn })
    }

    pub fn close(self) -> Result<()> {
        let Self { runtime, conn } = self;
        runtime.block_on(conn.close()).map_err(classify)
    }
}

/// Keep transport failures in the connectivity class
fn classify(e: sqlx::Error) -> EtlError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
            EtlError::connectivity(e.to_string())
        }
        other => EtlError::Postgres(other),
    }
}

impl Warehouse for RedshiftWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Redshift
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let result = self
            .runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut self.conn))
            .map_err(classify)?;
        Ok(result.rows_affected())
    }

    /// The copy runs server-side; Redshift reads the objects itself
    fn bulk_load(&mut self, load: &BulkLoad, ui: &mut impl Ui) -> Result<u64> {
        ui.log(format!("{}: COPY from {}", load.table.name, load.source));
        self.execute(&load.to_sql())
    }
}
