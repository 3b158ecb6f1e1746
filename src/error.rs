use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::importer::ImportError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("user with id {0} not found")]
    UserNotFound(i64),

    #[error("product with id {0} not found")]
    ProductNotFound(i64),

    #[error("order with id {0} not found")]
    OrderNotFound(i64),

    #[error("multipart form is missing a csv_file field")]
    MissingFile,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::UserNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingFile | AppError::Import(_) | AppError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
