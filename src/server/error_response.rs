use crate::services::DirectoryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            DirectoryError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message: self.to_string(),
                    field: None,
                },
            ),
            DirectoryError::Validation(validation) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: "validation",
                    message: validation.to_string(),
                    field: Some(validation.field()),
                },
            ),
            DirectoryError::Storage(err) => {
                error!("Storage failure while serving request: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "storage",
                        message: "An error occurred, the change was not saved.".to_string(),
                        field: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
