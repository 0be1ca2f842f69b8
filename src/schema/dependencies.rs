use super::tables::ALL_TABLES;
use std::collections::{HashMap, HashSet};

/// Resolves which relations must be populated before others
pub struct DependencyResolver {
    /// Map of table name -> tables it is populated from
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// Check that `order` populates every table after all of its sources.
    /// Tables in `populated` are treated as already filled.
    pub fn check_order(&self, order: &[&str], populated: &[&str]) -> Result<(), String> {
        let mut filled: HashSet<&str> = populated.iter().copied().collect();

        for &table_name in order {
            let deps = self
                .deps
                .get(table_name)
                .ok_or_else(|| format!("Unknown table: {}", table_name))?;

            if let Some(missing) = deps.iter().find(|dep| !filled.contains(**dep)) {
                return Err(format!(
                    "{} is populated from {} which has not been populated yet",
                    table_name, missing
                ));
            }

            filled.insert(table_name);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_order_after_staging() {
        let resolver = DependencyResolver::new();
        let staged = ["staging_events", "staging_songs"];
        let star = ["fact_songplays", "dim_user", "dim_song", "dim_artist", "dim_time"];

        assert!(resolver.check_order(&star, &staged).is_ok());
        assert!(resolver.check_order(&staged, &[]).is_ok());
    }

    #[test]
    fn test_check_order_rejects_time_before_fact() {
        let resolver = DependencyResolver::new();
        let staged = ["staging_events", "staging_songs"];

        assert!(resolver
            .check_order(&["fact_songplays", "dim_time"], &staged)
            .is_ok());
        let err = resolver
            .check_order(&["dim_time", "fact_songplays"], &staged)
            .unwrap_err();
        assert!(err.contains("dim_time"));
    }

    #[test]
    fn test_check_order_requires_staging() {
        let resolver = DependencyResolver::new();
        assert!(resolver.check_order(&["dim_song"], &[]).is_err());
    }

    #[test]
    fn test_unknown_table_error() {
        let resolver = DependencyResolver::new();
        assert!(resolver.check_order(&["nonexistent"], &[]).is_err());
    }
}
