use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::BackendError;

/// Errors that terminate a single proxied request
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((header::CONTENT_TYPE, "text/plain; charset=utf-8"));

        match self {
            ProxyError::BadRequest(message) => builder.body(message.clone()),
            ProxyError::MethodNotAllowed(_) => builder
                .insert_header((header::ALLOW, "GET, HEAD, OPTIONS"))
                .body("Method Not Allowed"),
            // Backend details stay in the logs
            ProxyError::Backend(_) => builder.body("Internal Server Error"),
        }
    }
}
