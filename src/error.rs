//! Error types for the warehouse pipeline
//!
//! Every failure is classified by the stage that raised it so callers can
//! tell a bad config apart from a failed copy or a failed transform.

use thiserror::Error;

/// The main error type for the warehouse pipeline
#[derive(Error, Debug)]
pub enum EtlError {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ============================================================================
    // Connectivity Errors
    // ============================================================================
    #[error("Cannot reach warehouse: {message}")]
    Connectivity { message: String },

    #[error("Cannot reach source '{location}': {message}")]
    SourceUnreachable { location: String, message: String },

    // ============================================================================
    // Statement Errors
    // ============================================================================
    #[error("Schema statement failed for {table}: {message}")]
    Schema {
        table: String,
        message: String,
        #[source]
        source: Option<Box<EtlError>>,
    },

    #[error("Bulk load into {table} failed: {message}")]
    Load {
        table: String,
        message: String,
        #[source]
        source: Option<Box<EtlError>>,
    },

    #[error("Transform into {table} failed: {message}")]
    Transform {
        table: String,
        message: String,
        #[source]
        source: Option<Box<EtlError>>,
    },

    #[error("Phase {from} cannot be followed by {to}")]
    PhaseOrder { from: String, to: String },

    // ============================================================================
    // Driver Errors
    // ============================================================================
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Postgres protocol error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    pub fn source_unreachable(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnreachable {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            table: table.into(),
            message: message.into(),
            source: None,
        }
    }

    /// True for errors raised before any statement could run
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::MissingConfigField { .. }
                | Self::InvalidConfigValue { .. }
                | Self::TomlParse(_)
        )
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Connectivity { .. } | Self::SourceUnreachable { .. }
        )
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EtlError>;
