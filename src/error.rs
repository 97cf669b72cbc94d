use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mealmate_shared::Error;
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

pub type Result<T> = std::result::Result<T, AppError>;

/// HTTP face of `mealmate_shared::Error`.
#[derive(Debug)]
pub struct AppError(pub Error);

impl<E: Into<Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self(Error::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self(Error::Forbidden)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(Error::User(message.into()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .errors()
        .iter()
        .map(|(field, kind)| {
            let messages = match kind {
                ValidationErrorsKind::Field(errors) => errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("invalid {}", e.code),
                    })
                    .collect(),
                ValidationErrorsKind::Struct(_) | ValidationErrorsKind::List(_) => {
                    vec!["contains invalid values".to_owned()]
                }
            };

            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self.0 {
            Error::Validate(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Validation failed".to_owned(),
                Some(field_messages(&errors)),
            ),
            Error::User(message) => (StatusCode::BAD_REQUEST, "bad_request", message, None),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{what} not found"),
                None,
            ),
            Error::Conflict(message) => (StatusCode::CONFLICT, "conflict", message, None),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_owned(),
                None,
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "You do not have access to this resource".to_owned(),
                None,
            ),
            Error::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                message,
                None,
            ),
            Error::Server(message) => {
                tracing::error!(err = %message, "server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_owned(),
                    None,
                )
            }
            Error::Unknown(err) => {
                tracing::error!(err = ?err, "unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_owned(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}
