use axum::{http::StatusCode, response::IntoResponse, Json};
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocstashError {
    #[error("{0}")]
    Database(sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),
}

impl From<sqlx::Error> for DocstashError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".to_string()),
            sqlx::Error::Database(ref db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    Self::Conflict("Name duplication not allowed".to_string())
                }
                ErrorKind::ForeignKeyViolation => {
                    Self::NotFound("referenced record does not exist".to_string())
                }
                ErrorKind::CheckViolation => {
                    Self::Validation("field constraint violated".to_string())
                }
                _ => Self::Database(e),
            },
            e => Self::Database(e),
        }
    }
}

impl IntoResponse for DocstashError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            DocstashError::Database(e) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            DocstashError::NotFound(e) => (StatusCode::NOT_FOUND, e),
            DocstashError::Conflict(e) => (StatusCode::BAD_REQUEST, e),
            DocstashError::Validation(e) => (StatusCode::BAD_REQUEST, e),
        };

        (status, Json(serde_json::json!([{ "message": message }]))).into_response()
    }
}
