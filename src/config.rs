//! Warehouse configuration file (`dwh.toml`)
//!
//! ```toml
//! [cluster]
//! host = "dwhcluster.xxxx.us-west-2.redshift.amazonaws.com"
//! db_name = "dwh"
//! db_user = "dwhuser"
//! db_password = "..."
//! db_port = 5439
//!
//! [iam_role]
//! arn = "arn:aws:iam::123456789012:role/dwhRole"
//!
//! [s3]
//! log_data = "s3://udacity-dend/log_data"
//! log_jsonpath = "s3://udacity-dend/log_json_path.json"
//! song_data = "s3://udacity-dend/song_data"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::{EtlError, Result};
use crate::sql::Dialect;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PORT: u16 = 5439;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DwhConfig {
    /// Only needed when the target is Redshift
    pub cluster: Option<ClusterConfig>,
    #[serde(default)]
    pub iam_role: IamRoleConfig,
    #[serde(default)]
    pub s3: S3Config,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    #[serde(default = "default_port")]
    pub db_port: u16,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IamRoleConfig {
    #[serde(default)]
    pub arn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub log_data: String,
    #[serde(default)]
    pub log_jsonpath: String,
    #[serde(default)]
    pub song_data: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            log_data: String::new(),
            log_jsonpath: String::new(),
            song_data: String::new(),
            region: default_region(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Everything the bulk loader needs, passed through as-is
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    pub iam_role_arn: String,
    pub region: String,
}

impl DwhConfig {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EtlError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Check every setting the target needs before anything runs
    pub fn validate(&self, dialect: Dialect) -> Result<()> {
        let locations = [
            ("s3.log_data", &self.s3.log_data),
            ("s3.log_jsonpath", &self.s3.log_jsonpath),
            ("s3.song_data", &self.s3.song_data),
        ];

        for (field, value) in locations {
            if value.trim().is_empty() {
                return Err(EtlError::missing_field(field));
            }
        }

        if self.s3.region.trim().is_empty() {
            return Err(EtlError::missing_field("s3.region"));
        }

        match dialect {
            Dialect::Redshift => {
                for (field, value) in locations {
                    if !value.starts_with("s3://") {
                        return Err(EtlError::invalid_value(field, "expected an s3:// URI"));
                    }
                }

                if self.iam_role.arn.trim().is_empty() {
                    return Err(EtlError::missing_field("iam_role.arn"));
                }
                if !self.iam_role.arn.starts_with("arn:") {
                    return Err(EtlError::invalid_value(
                        "iam_role.arn",
                        "expected an IAM role ARN",
                    ));
                }

                let cluster = self
                    .cluster
                    .as_ref()
                    .ok_or_else(|| EtlError::missing_field("cluster"))?;
                for (field, value) in [
                    ("cluster.host", &cluster.host),
                    ("cluster.db_name", &cluster.db_name),
                    ("cluster.db_user", &cluster.db_user),
                ] {
                    if value.trim().is_empty() {
                        return Err(EtlError::missing_field(field));
                    }
                }
            }
            Dialect::Sqlite => {
                for (field, value) in locations {
                    if value.starts_with("s3://") {
                        return Err(EtlError::invalid_value(
                            field,
                            "s3:// locations can only be copied by the redshift target",
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn sources(&self) -> SourceConfig {
        SourceConfig {
            log_data: self.s3.log_data.clone(),
            log_jsonpath: self.s3.log_jsonpath.clone(),
            song_data: self.s3.song_data.clone(),
            iam_role_arn: self.iam_role.arn.clone(),
            region: self.s3.region.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDSHIFT_CONFIG: &str = r#"
[cluster]
host = "dwhcluster.example.us-west-2.redshift.amazonaws.com"
db_name = "dwh"
db_user = "dwhuser"
db_password = "secret"

[iam_role]
arn = "arn:aws:iam::123456789012:role/dwhRole"

[s3]
log_data = "s3://udacity-dend/log_data"
log_jsonpath = "s3://udacity-dend/log_json_path.json"
song_data = "s3://udacity-dend/song_data"
"#;

    #[test]
    fn test_parse_defaults() {
        let config = DwhConfig::parse(REDSHIFT_CONFIG).unwrap();
        assert_eq!(config.s3.region, "us-west-2");
        assert_eq!(config.cluster.as_ref().unwrap().db_port, 5439);
        config.validate(Dialect::Redshift).unwrap();
    }

    #[test]
    fn test_missing_location() {
        let text = REDSHIFT_CONFIG.replace("song_data = \"s3://udacity-dend/song_data\"", "");
        let config = DwhConfig::parse(&text).unwrap();
        let err = config.validate(Dialect::Redshift).unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigField { ref field } if field == "s3.song_data"));
    }

    #[test]
    fn test_malformed_arn() {
        let text = REDSHIFT_CONFIG.replace("arn:aws:iam::123456789012:role/dwhRole", "dwhRole");
        let config = DwhConfig::parse(&text).unwrap();
        assert!(config.validate(Dialect::Redshift).unwrap_err().is_config());
    }

    #[test]
    fn test_local_target_rejects_s3() {
        let config = DwhConfig::parse(REDSHIFT_CONFIG).unwrap();
        assert!(config.validate(Dialect::Sqlite).is_err());
    }

    #[test]
    fn test_local_target_without_cluster() {
        let config = DwhConfig::parse(
            r#"
[s3]
log_data = "data/log_data"
log_jsonpath = "data/log_json_path.json"
song_data = "data/song_data.zip"
"#,
        )
        .unwrap();
        config.validate(Dialect::Sqlite).unwrap();
        assert!(config.validate(Dialect::Redshift).is_err());
    }

    #[test]
    fn test_sources_pass_through() {
        let sources = DwhConfig::parse(REDSHIFT_CONFIG).unwrap().sources();
        assert_eq!(sources.log_data, "s3://udacity-dend/log_data");
        assert_eq!(sources.iam_role_arn, "arn:aws:iam::123456789012:role/dwhRole");
    }
}
