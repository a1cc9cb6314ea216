use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input. The message is shown to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    /// The request was valid but the data needed to answer it is missing.
    #[error("{0}")]
    DataUnavailable(String),

    #[error("Empty CSV.")]
    EmptyInput,

    #[error("Cannot open CSV: {0}")]
    Unreadable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Errors caused by the caller rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::DataUnavailable(_) | Error::EmptyInput | Error::Unreadable(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
