use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Not allowed for this account type")]
    AuthorizationDenied,

    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Checkout failed")]
    CheckoutFailed(#[source] Box<AppError>),

    #[error("Upstream unavailable")]
    UpstreamUnavailable(String),

    #[error("Database unavailable")]
    Orm(#[from] sea_orm::DbErr),

    #[error("Unexpected error")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn checkout_failed(cause: impl Into<AppError>) -> Self {
        AppError::CheckoutFailed(Box::new(cause.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::CheckoutFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Orm(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The collaborator's own message text, if there is one worth showing.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::CheckoutFailed(cause) => cause.detail().or_else(|| Some(cause.to_string())),
            AppError::UpstreamUnavailable(msg) => Some(msg.clone()),
            AppError::Orm(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                detail: self.detail(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::AuthenticationRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AuthorizationDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UpstreamUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn checkout_failure_surfaces_cause_detail() {
        let err = AppError::checkout_failed(sea_orm::DbErr::Custom("disk full".into()));
        assert_eq!(err.to_string(), "Checkout failed");
        assert!(err.detail().unwrap().contains("disk full"));
    }
}
