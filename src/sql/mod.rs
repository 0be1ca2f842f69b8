//! Statement surface of the warehouse
//!
//! Four ordered sequences, always consumed in this order:
//! drop (7) → create (7) → bulk load (2) → transform (5).

pub mod copy;
pub mod dialect;
pub mod schema_gen;
pub mod transform;

pub use copy::*;
pub use dialect::*;
pub use schema_gen::*;
pub use transform::*;

use crate::config::SourceConfig;
use crate::schema::ALL_TABLES;

pub fn drop_statements() -> Vec<String> {
    ALL_TABLES.iter().map(|t| generate_drop_table(t)).collect()
}

pub fn create_statements(dialect: Dialect) -> Vec<String> {
    ALL_TABLES
        .iter()
        .map(|t| generate_create_table(t, dialect))
        .collect()
}

/// Redshift COPY statements for both staging tables
pub fn bulk_load_statements(sources: &SourceConfig) -> Vec<String> {
    bulk_loads(sources).iter().map(BulkLoad::to_sql).collect()
}

pub fn transform_statements(dialect: Dialect) -> Vec<String> {
    transform_steps(dialect).into_iter().map(|s| s.sql).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_sizes() {
        let sources = SourceConfig {
            log_data: "s3://b/log_data".to_string(),
            log_jsonpath: "s3://b/log_json_path.json".to_string(),
            song_data: "s3://b/song_data".to_string(),
            iam_role_arn: "arn:aws:iam::1:role/r".to_string(),
            region: "us-west-2".to_string(),
        };

        assert_eq!(drop_statements().len(), 7);
        assert_eq!(create_statements(Dialect::Redshift).len(), 7);
        assert_eq!(bulk_load_statements(&sources).len(), 2);
        assert_eq!(transform_statements(Dialect::Redshift).len(), 5);
    }

    #[test]
    fn test_every_statement_is_guarded() {
        assert!(drop_statements().iter().all(|s| s.contains("IF EXISTS")));
        for dialect in [Dialect::Redshift, Dialect::Sqlite] {
            assert!(create_statements(dialect)
                .iter()
                .all(|s| s.contains("IF NOT EXISTS")));
        }
    }
}
