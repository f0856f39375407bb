use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

pub const CONNECTION_FAILED: &str = "Error al conectarse a MongoDB";
pub const MALFORMED_JSON: &str = "Error en el formato JSON enviado";
pub const ROUTE_NOT_FOUND: &str = "Error 404: URI no existente";

/// Failures surfaced to HTTP clients. Bodies are plain text; store details
/// are logged and never sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Error en el formato JSON enviado")]
    MalformedJson(#[from] JsonRejection),

    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wraps a store failure with the message for the failing route.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, *message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, *message),
            ApiError::MalformedJson(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection);
                (StatusCode::BAD_REQUEST, MALFORMED_JSON)
            }
            ApiError::Store { message, source } => {
                tracing::error!("{}: {}", message, source);
                match source {
                    StoreError::Connection(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, CONNECTION_FAILED)
                    }
                    StoreError::DuplicateCode(_) | StoreError::Operation(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, *message)
                    }
                }
            }
        };
        (status, message).into_response()
    }
}
