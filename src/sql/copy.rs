use super::dialect::quote_literal;
use crate::config::SourceConfig;
use crate::schema::{TableSchema, STAGING_EVENTS, STAGING_SONGS};

/// How raw JSON records map onto staging columns
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFormat {
    /// Positional JSONPaths descriptor at the given location
    JsonPaths(String),
    /// Match object keys to column names
    Auto { ignore_case: bool },
}

impl RecordFormat {
    fn to_sql(&self) -> String {
        match self {
            RecordFormat::JsonPaths(location) => quote_literal(location),
            RecordFormat::Auto { ignore_case: true } => "'auto ignorecase'".to_string(),
            RecordFormat::Auto { ignore_case: false } => "'auto'".to_string(),
        }
    }
}

/// One server-side bulk copy from object storage into a staging table
#[derive(Debug, Clone)]
pub struct BulkLoad {
    pub table: &'static TableSchema,
    pub source: String,
    pub credential: String,
    pub format: RecordFormat,
    pub region: String,
}

impl BulkLoad {
    /// Render as a Redshift COPY statement
    pub fn to_sql(&self) -> String {
        format!(
            "COPY {}\nFROM {}\nIAM_ROLE {}\nCOMPUPDATE OFF\nREGION {}\nFORMAT AS JSON {}",
            self.table.name,
            quote_literal(&self.source),
            quote_literal(&self.credential),
            quote_literal(&self.region),
            self.format.to_sql()
        )
    }
}

/// The two staging loads: events first, then songs
pub fn bulk_loads(sources: &SourceConfig) -> Vec<BulkLoad> {
    vec![
        BulkLoad {
            table: &STAGING_EVENTS,
            source: sources.log_data.clone(),
            credential: sources.iam_role_arn.clone(),
            format: RecordFormat::JsonPaths(sources.log_jsonpath.clone()),
            region: sources.region.clone(),
        },
        BulkLoad {
            table: &STAGING_SONGS,
            source: sources.song_data.clone(),
            credential: sources.iam_role_arn.clone(),
            format: RecordFormat::Auto { ignore_case: true },
            region: sources.region.clone(),
        },
    ]
}
