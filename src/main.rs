use anyhow::{Context, Result};
use songplay_warehouse::{
    cli::{Cli, Commands},
    config::DwhConfig,
    download::ObjectCache,
    pipeline::{Phase, Pipeline, RunSummary},
    schema::ALL_TABLES,
    sql::{bulk_load_statements, create_statements, drop_statements, transform_statements, Dialect},
    ui::{LogUi, UiApp},
    warehouse::{RedshiftWarehouse, SqliteWarehouse, Warehouse},
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.target.tui);

    match &cli.command {
        Commands::ListTables => {
            println!("Available tables:\n");
            for table in ALL_TABLES {
                println!("  {:<16} {}", table.name, table.role);
            }
        }

        Commands::PrintSql { dialect } => {
            let config = DwhConfig::load(&cli.target.config)
                .with_context(|| format!("loading {}", cli.target.config.display()))?;

            let sections = [
                ("drop", drop_statements()),
                ("create", create_statements(*dialect)),
                ("bulk load", bulk_load_statements(&config.sources())),
                ("transform", transform_statements(*dialect)),
            ];
            for (name, statements) in sections {
                println!("-- {} ({})\n", name, statements.len());
                for sql in statements {
                    println!("{};\n", sql);
                }
            }
        }

        command => {
            let Some((start, last)) = command.phases() else {
                return Ok(());
            };
            let dialect = if cli.target.local.is_some() {
                Dialect::Sqlite
            } else {
                Dialect::Redshift
            };

            let config = DwhConfig::load(&cli.target.config)
                .with_context(|| format!("loading {}", cli.target.config.display()))?;
            config.validate(dialect)?;

            let started = Instant::now();
            let summary = match &cli.target.local {
                Some(db_path) => {
                    let cache = ObjectCache::new(cli.target.cache_dir.clone())?;
                    let mut warehouse = SqliteWarehouse::open(db_path, cache)?
                        .force_download(cli.target.force_download);
                    run(&mut warehouse, &config, start, last, cli.target.tui)?
                }
                None => {
                    let cluster = config
                        .cluster
                        .as_ref()
                        .context("[cluster] section is required for redshift")?;
                    let mut warehouse = RedshiftWarehouse::connect(cluster)?;
                    let summary = run(&mut warehouse, &config, start, last, cli.target.tui)?;
                    warehouse.close()?;
                    summary
                }
            };

            let fact_rows = summary.rows_for("fact_songplays");
            match fact_rows {
                Some(rows) => println!(
                    "\nCompleted {} statements ({} songplays) in {:.1}s",
                    summary.statements.len(),
                    rows,
                    started.elapsed().as_secs_f64()
                ),
                None => println!(
                    "\nCompleted {} statements in {:.1}s",
                    summary.statements.len(),
                    started.elapsed().as_secs_f64()
                ),
            }
        }
    }

    Ok(())
}

/// The TUI owns the terminal, so log output is limited to warnings
fn init_tracing(tui: bool) {
    let default = if tui { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run<W: Warehouse>(
    warehouse: &mut W,
    config: &DwhConfig,
    start: Phase,
    last: Phase,
    tui: bool,
) -> Result<RunSummary> {
    let mut pipeline = Pipeline::new(warehouse, config.sources());

    if !tui {
        return Ok(pipeline.run(start, last, &mut LogUi::new())?);
    }

    let mut ui = UiApp::new()?;
    match pipeline.run(start, last, &mut ui) {
        Ok(summary) => {
            ui.finish(&format!(
                "{} statements in {:.1}s",
                summary.statements.len(),
                summary.elapsed.as_secs_f64()
            ))?;
            Ok(summary)
        }
        Err(e) => {
            ui.restore()?;
            Err(e.into())
        }
    }
}
