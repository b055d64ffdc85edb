/// Raised at startup when a required environment value is absent or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Raised when a fetched row cannot be narrowed into a typed record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Row {index} of {table} is not a JSON object")]
    NotAnObject { table: String, index: usize },

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Malformed payout record: {0}")]
    Payout(#[from] serde_json::Error),
}
