use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the store operations. Everything the driver reports
/// propagates unchanged; the only translation is duplicate-key write errors,
/// which become [`StoreError::Conflict`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} \"{key}\" already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("no mailing list named \"{0}\"")]
    NotFound(String),

    #[error("\"{email}\" is already subscribed to \"{list}\"")]
    AlreadySubscribed { list: String, email: String },

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl StoreError {
    /// Classifies an insert failure: a unique-index violation on the entity's
    /// natural key is a conflict, anything else is an infrastructure error.
    pub(crate) fn from_insert(
        entity: &'static str,
        key: &str,
        err: mongodb::error::Error,
    ) -> Self {
        if is_duplicate_key(&err) {
            StoreError::Conflict {
                entity,
                key: key.to_string(),
            }
        } else {
            StoreError::Database(err)
        }
    }
}

// Server error code 11000 = duplicate key.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == 11000,
        ErrorKind::Command(command) => command.code == 11000,
        ErrorKind::BulkWrite(bulk) => bulk
            .write_errors
            .as_ref()
            .map_or(false, |errors| errors.iter().any(|write| write.code == 11000)),
        _ => false,
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Conflict { .. } | StoreError::AlreadySubscribed { .. } => {
                StatusCode::CONFLICT
            }
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
