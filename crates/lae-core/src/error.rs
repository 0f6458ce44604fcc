use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Circular parent detected: '{0}' cannot be placed under '{1}'.")]
    CircularParent(String, String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Name)

    #[error("An unknown error has occurred.")]
    Unknown,
}

/// Coarse classification a transport layer maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    ServerFault,
}

impl ErrorKind {
    /// HTTP-style status code for this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::ServerFault => 500,
        }
    }
}

/// Structured error as shown to callers: a type tag and a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Validation(_)
            | CoreError::CircularParent(_, _)
            | CoreError::AmbiguousId(_) => ErrorKind::BadRequest,
            CoreError::Database(_) | CoreError::Migration(_) | CoreError::Io(_) | CoreError::Unknown => {
                ErrorKind::ServerFault
            }
        }
    }

    /// Server faults keep their opaque display text, so nothing from the
    /// driver leaks into the body.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    pub(crate) fn slot_occupied() -> Self {
        CoreError::Validation("Time slot already occupied".to_string())
    }

    /// Maps a primary-lane unique index violation to the friendly placement
    /// error and passes every other driver error through.
    pub(crate) fn from_placement_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::slot_occupied(),
            _ => CoreError::Database(err),
        }
    }
}
