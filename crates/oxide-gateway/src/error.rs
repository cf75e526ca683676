//! Error types for the record gateway.

use oxide_gateway_core::StatementError;
use thiserror::Error;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The table does not exist or its columns could not be read.
    #[error("unable to show columns for table `{table}`; does the table exist?")]
    SchemaFetch {
        /// The table being introspected.
        table: String,
        /// The driver error, if the introspection query itself failed.
        #[source]
        source: Option<sqlx::Error>,
    },

    /// An update was requested on a table with no primary key.
    #[error("attempt to update table `{0}` with no primary key")]
    MissingPrimaryKey(String),

    /// The driver rejected a statement.
    #[error("execution error: {0}")]
    Execution(#[from] sqlx::Error),

    /// Placeholders and bound parameters disagree; raised at execution.
    #[error("execution error: {0}")]
    Binding(#[from] StatementError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Returns whether the error was raised while executing a statement,
    /// either by the driver or by parameter binding.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_) | Self::Binding(_))
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
