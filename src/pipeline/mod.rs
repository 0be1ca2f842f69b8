//! Full-refresh run: drop → create → load → transform, one statement at a time

mod phase;

pub use phase::Phase;

use std::time::{Duration, Instant};

use crate::config::SourceConfig;
use crate::error::{EtlError, Result};
use crate::schema::{DependencyResolver, ALL_TABLES, STAGING_TABLES};
use crate::sql::{bulk_loads, generate_create_table, generate_drop_table, transform_steps};
use crate::ui::Ui;
use crate::warehouse::Warehouse;

/// Outcome of one executed statement
#[derive(Debug, Clone)]
pub struct StatementReport {
    pub phase: Phase,
    pub table: &'static str,
    pub rows: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub statements: Vec<StatementReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Rows written to `table` by the load or transform phase
    pub fn rows_for(&self, table: &str) -> Option<u64> {
        self.statements
            .iter()
            .find(|s| s.table == table && matches!(s.phase, Phase::Load | Phase::Transform))
            .map(|s| s.rows)
    }
}

/// Drives the phase state machine against one warehouse
pub struct Pipeline<'a, W: Warehouse> {
    warehouse: &'a mut W,
    sources: SourceConfig,
    current: Option<Phase>,
}

impl<'a, W: Warehouse> Pipeline<'a, W> {
    pub fn new(warehouse: &'a mut W, sources: SourceConfig) -> Self {
        Self {
            warehouse,
            sources,
            current: None,
        }
    }

    /// Run every phase from `start` through `last`, stopping at the first error.
    /// Statements already executed are not rolled back.
    pub fn run(&mut self, start: Phase, last: Phase, ui: &mut impl Ui) -> Result<RunSummary> {
        if !start.is_entry() {
            return Err(EtlError::PhaseOrder {
                from: "start".to_string(),
                to: format!("{:?}", start),
            });
        }
        if !reaches(start, last) {
            return Err(EtlError::PhaseOrder {
                from: format!("{:?}", start),
                to: format!("{:?}", last),
            });
        }
        check_transform_order()?;
        self.current = None;

        let started = Instant::now();
        let mut summary = RunSummary::default();
        let mut phase = start;

        loop {
            self.enter(phase)?;
            ui.set_phase(phase);
            self.run_phase(phase, &mut summary, ui)?;

            if phase == last {
                break;
            }
            match phase.next() {
                Some(next) => phase = next,
                None => break,
            }
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            statements = summary.statements.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );

        Ok(summary)
    }

    fn enter(&mut self, phase: Phase) -> Result<()> {
        if let Some(current) = self.current {
            if !phase.can_follow(current) {
                return Err(EtlError::PhaseOrder {
                    from: format!("{:?}", current),
                    to: format!("{:?}", phase),
                });
            }
        }
        self.current = Some(phase);
        Ok(())
    }

    fn run_phase(&mut self, phase: Phase, summary: &mut RunSummary, ui: &mut impl Ui) -> Result<()> {
        match phase {
            Phase::Drop => {
                for table in ALL_TABLES {
                    let sql = generate_drop_table(table);
                    let report = self.execute(phase, table.name, &sql, ui)?;
                    summary.statements.push(report);
                }
            }
            Phase::Create => {
                let dialect = self.warehouse.dialect();
                for table in ALL_TABLES {
                    let sql = generate_create_table(table, dialect);
                    let report = self.execute(phase, table.name, &sql, ui)?;
                    summary.statements.push(report);
                }
            }
            Phase::Load => {
                for load in bulk_loads(&self.sources) {
                    ui.set_info(format!("COPY {}", load.table.name));
                    tracing::debug!(sql = %load.to_sql(), "bulk load");

                    let started = Instant::now();
                    let rows = self
                        .warehouse
                        .bulk_load(&load, ui)
                        .map_err(|e| classify(phase, load.table.name, e))?;

                    summary
                        .statements
                        .push(self.report(phase, load.table.name, rows, started, ui));
                }
            }
            Phase::Transform => {
                for step in transform_steps(self.warehouse.dialect()) {
                    let report = self.execute(phase, step.table.name, &step.sql, ui)?;
                    summary.statements.push(report);
                }
            }
            Phase::Complete => {}
        }

        Ok(())
    }

    fn execute(
        &mut self,
        phase: Phase,
        table: &'static str,
        sql: &str,
        ui: &mut impl Ui,
    ) -> Result<StatementReport> {
        ui.set_info(format!("{:?} {}", phase, table));
        tracing::debug!(%sql, "executing");

        let started = Instant::now();
        let rows = self
            .warehouse
            .execute(sql)
            .map_err(|e| classify(phase, table, e))?;

        Ok(self.report(phase, table, rows, started, ui))
    }

    fn report(
        &self,
        phase: Phase,
        table: &'static str,
        rows: u64,
        started: Instant,
        ui: &mut impl Ui,
    ) -> StatementReport {
        let elapsed = started.elapsed();
        tracing::info!(?phase, table, rows, elapsed_ms = elapsed.as_millis() as u64, "statement done");

        match phase {
            Phase::Load | Phase::Transform => ui.log(format!("{}: {} rows", table, rows)),
            _ => ui.log(format!("{:?} {}", phase, table)),
        }

        StatementReport {
            phase,
            table,
            rows,
            elapsed,
        }
    }
}

fn reaches(start: Phase, last: Phase) -> bool {
    let mut phase = Some(start);
    while let Some(p) = phase {
        if p == last {
            return true;
        }
        phase = p.next();
    }
    false
}

/// The transform sequence must populate each table after its sources
fn check_transform_order() -> Result<()> {
    let order: Vec<&str> = transform_steps(Default::default())
        .iter()
        .map(|s| s.table.name)
        .collect();
    let staged: Vec<&str> = STAGING_TABLES.iter().map(|t| t.name).collect();

    DependencyResolver::new()
        .check_order(&order, &staged)
        .map_err(EtlError::config)
}

/// Attach the failing phase and table, keeping the driver error as the source.
/// Transport and config errors keep their class.
fn classify(phase: Phase, table: &str, e: EtlError) -> EtlError {
    if e.is_connectivity() || e.is_config() || matches!(e, EtlError::Load { .. }) {
        return e;
    }

    let message = e.to_string();
    let table = table.to_string();
    let source = Some(Box::new(e));
    match phase {
        Phase::Load => EtlError::Load {
            table,
            message,
            source,
        },
        Phase::Transform => EtlError::Transform {
            table,
            message,
            source,
        },
        _ => EtlError::Schema {
            table,
            message,
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{BulkLoad, Dialect};
    use crate::ui::SilentUi;

    /// Records statements instead of running them
    #[derive(Default)]
    struct RecordingWarehouse {
        executed: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl Warehouse for RecordingWarehouse {
        fn dialect(&self) -> Dialect {
            Dialect::Redshift
        }

        fn execute(&mut self, sql: &str) -> Result<u64> {
            if let Some(marker) = self.fail_on {
                if sql.contains(marker) {
                    return Err(EtlError::Io(std::io::Error::other("relation locked")));
                }
            }
            self.executed.push(sql.to_string());
            Ok(1)
        }

        fn bulk_load(&mut self, load: &BulkLoad, _ui: &mut impl Ui) -> Result<u64> {
            self.execute(&load.to_sql())
        }
    }

    fn sources() -> SourceConfig {
        SourceConfig {
            log_data: "s3://b/log_data".to_string(),
            log_jsonpath: "s3://b/log_json_path.json".to_string(),
            song_data: "s3://b/song_data".to_string(),
            iam_role_arn: "arn:aws:iam::1:role/r".to_string(),
            region: "us-west-2".to_string(),
        }
    }

    #[test]
    fn test_full_run_order() {
        let mut wh = RecordingWarehouse::default();
        let summary = Pipeline::new(&mut wh, sources())
            .run(Phase::Drop, Phase::Transform, &mut SilentUi)
            .unwrap();

        assert_eq!(wh.executed.len(), 7 + 7 + 2 + 5);
        assert!(wh.executed[0].starts_with("DROP TABLE"));
        assert!(wh.executed[7].starts_with("CREATE TABLE"));
        assert!(wh.executed[14].starts_with("COPY staging_events"));
        assert!(wh.executed[15].starts_with("COPY staging_songs"));
        assert!(wh.executed[16].starts_with("INSERT INTO fact_songplays"));
        assert!(wh.executed[20].starts_with("INSERT INTO dim_time"));
        assert_eq!(summary.statements.len(), 21);
        assert_eq!(summary.rows_for("dim_time"), Some(1));
    }

    #[test]
    fn test_create_tables_only() {
        let mut wh = RecordingWarehouse::default();
        Pipeline::new(&mut wh, sources())
            .run(Phase::Drop, Phase::Create, &mut SilentUi)
            .unwrap();
        assert_eq!(wh.executed.len(), 14);
    }

    #[test]
    fn test_etl_only() {
        let mut wh = RecordingWarehouse::default();
        let summary = Pipeline::new(&mut wh, sources())
            .run(Phase::Load, Phase::Transform, &mut SilentUi)
            .unwrap();
        assert_eq!(wh.executed.len(), 7);
        assert_eq!(summary.rows_for("staging_songs"), Some(1));
    }

    #[test]
    fn test_invalid_ranges() {
        let mut wh = RecordingWarehouse::default();
        let mut pipeline = Pipeline::new(&mut wh, sources());
        assert!(pipeline.run(Phase::Create, Phase::Transform, &mut SilentUi).is_err());
        assert!(pipeline.run(Phase::Load, Phase::Create, &mut SilentUi).is_err());
        drop(pipeline);
        assert!(wh.executed.is_empty());
    }

    #[test]
    fn test_pipeline_can_run_again() {
        let mut wh = RecordingWarehouse::default();
        let mut pipeline = Pipeline::new(&mut wh, sources());
        pipeline.run(Phase::Drop, Phase::Create, &mut SilentUi).unwrap();
        pipeline.run(Phase::Drop, Phase::Create, &mut SilentUi).unwrap();
        drop(pipeline);
        assert_eq!(wh.executed.len(), 28);
    }

    #[test]
    fn test_failure_stops_run_and_names_table() {
        let mut wh = RecordingWarehouse {
            fail_on: Some("INSERT INTO dim_song"),
            ..Default::default()
        };
        let err = Pipeline::new(&mut wh, sources())
            .run(Phase::Drop, Phase::Transform, &mut SilentUi)
            .unwrap_err();

        assert!(matches!(err, EtlError::Transform { ref table, .. } if table == "dim_song"));
        let cause = std::error::Error::source(&err).expect("driver error kept as source");
        assert!(cause.to_string().contains("relation locked"));
        // fact and user inserts ran and stay applied
        assert_eq!(wh.executed.len(), 7 + 7 + 2 + 2);
    }

    #[test]
    fn test_transform_order_is_valid() {
        check_transform_order().unwrap();
    }
}
