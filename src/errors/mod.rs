use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures coming out of the data layer.
///
/// `DbError` never reaches the view: the controller turns it into an alert.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Data(String),

    #[error("Row mapping error: {0}")]
    Mapping(String),
}

/// Failures that end the process.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// True when the cached connection can no longer be trusted.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DbError::Connection(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DbError::Constraint(db_err.message().to_string()),
                _ => DbError::Data(db_err.message().to_string()),
            },
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => DbError::Mapping(err.to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => DbError::Connection(err.to_string()),
            _ => DbError::Data(err.to_string()),
        }
    }
}
