use super::Dialect;
use crate::schema::{ColumnType, TableSchema};

/// Generate DROP TABLE SQL for a table schema
pub fn generate_drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", schema.name)
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema, dialect: Dialect) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();
    let mut inline_key = false;

    for col in schema.columns {
        let sql_type = dialect.column_type(col.col_type);

        // SQLite only auto-increments an inline INTEGER PRIMARY KEY
        if col.col_type == ColumnType::Identity && dialect == Dialect::Sqlite {
            columns.push(format!("    {} {} PRIMARY KEY AUTOINCREMENT", col.name, sql_type));
            inline_key = true;
            continue;
        }

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        columns.push(format!("    {} {}{}", col.name, sql_type, null_constraint));
    }

    if let Some(key) = schema.primary_key {
        if !inline_key {
            columns.push(format!("    PRIMARY KEY ({})", key));
        }
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{DIM_ARTIST, FACT_SONGPLAYS, STAGING_EVENTS, STAGING_SONGS};

    #[test]
    fn test_generate_create_fact_redshift() {
        let sql = generate_create_table(&FACT_SONGPLAYS, Dialect::Redshift);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS fact_songplays"));
        assert!(sql.contains("songplay_id INT IDENTITY(1, 1) NOT NULL"));
        assert!(sql.contains("start_time timestamp NOT NULL"));
        assert!(sql.contains("user_id int NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (songplay_id)"));
    }

    #[test]
    fn test_generate_create_fact_sqlite() {
        let sql = generate_create_table(&FACT_SONGPLAYS, Dialect::Sqlite);
        assert!(sql.contains("songplay_id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(!sql.contains("PRIMARY KEY (songplay_id)"));
    }

    #[test]
    fn test_staging_has_no_constraints() {
        for schema in [&STAGING_EVENTS, &STAGING_SONGS] {
            let sql = generate_create_table(schema, Dialect::Redshift);
            assert!(!sql.contains("PRIMARY KEY"));
            assert!(!sql.contains("NOT NULL"));
        }
        let songs = generate_create_table(&STAGING_SONGS, Dialect::Redshift);
        assert!(songs.contains("artist_name varchar(max)"));
    }

    #[test]
    fn test_dimension_key() {
        let sql = generate_create_table(&DIM_ARTIST, Dialect::Sqlite);
        assert!(sql.contains("artist_id TEXT NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (artist_id)"));
    }

    #[test]
    fn test_generate_drop_table() {
        assert_eq!(
            generate_drop_table(&STAGING_EVENTS),
            "DROP TABLE IF EXISTS staging_events"
        );
    }
}
