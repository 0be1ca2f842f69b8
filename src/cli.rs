use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::Phase;
use crate::sql::Dialect;

#[derive(Parser, Debug)]
#[command(name = "songplay-warehouse")]
#[command(version, about = "Build a star-schema songplay warehouse on Redshift or SQLite")]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Warehouse config file
    #[arg(short, long, global = true, default_value = "dwh.toml")]
    pub config: PathBuf,

    /// Run against a local SQLite database instead of the Redshift cluster
    #[arg(short, long, global = true, value_name = "DB")]
    pub local: Option<PathBuf>,

    /// Cache directory for http(s) sources
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Re-download http(s) sources even if cached
    #[arg(short, long, global = true)]
    pub force_download: bool,

    /// Show the terminal UI instead of log output
    #[arg(long, global = true)]
    pub tui: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop, create, load and transform in one go
    Run,

    /// Drop and recreate all seven tables
    CreateTables,

    /// Load the staging tables and build the star schema
    Etl,

    /// Print every statement for a dialect without connecting
    PrintSql {
        #[arg(short, long, default_value = "redshift")]
        dialect: Dialect,
    },

    /// List all table names
    ListTables,
}

impl Commands {
    /// First and last phase for the commands that execute statements
    pub fn phases(&self) -> Option<(Phase, Phase)> {
        match self {
            Commands::Run => Some((Phase::Drop, Phase::Transform)),
            Commands::CreateTables => Some((Phase::Drop, Phase::Create)),
            Commands::Etl => Some((Phase::Load, Phase::Transform)),
            Commands::PrintSql { .. } | Commands::ListTables => None,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
