//! Response envelope and error mapping.
//!
//! Every response body is `{"success": true, "data": …}` or
//! `{"success": false, "error": {"code", "message", "limit"?, "retryable"?}}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use haulbook_core::access::AccessDenied;
use haulbook_core::alerts::AlertError;
use haulbook_core::ledger::LedgerError;
use haulbook_core::notification::NotificationError;
use haulbook_core::petty_cash::PettyCashError;
use haulbook_shared::AppError;

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

/// Result of a handler that answers `200 OK`.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Result of a handler that answers `201 Created`.
pub type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

/// Wraps `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Wraps `data` in the success envelope with `201 Created`.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match &err {
            AppError::Internal(detail) => tracing::error!(error = %detail, "Request failed"),
            AppError::Transient(detail) => tracing::warn!(error = %detail, "Request failed transiently"),
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: err.error_code(),
                message: err.public_message(),
                limit: err.limit(),
                retryable: err.is_retryable().then_some(true),
            },
        };
        (status, Json(body)).into_response()
    }
}

macro_rules! into_api_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

into_api_error!(AppError, LedgerError, PettyCashError, NotificationError, AlertError);

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        Self(AppError::Forbidden(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self(AppError::NotFound("unparseable path parameter".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_core::petty_cash::LimitKind;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use serde_json::Value;

    async fn body_of(err: impl Into<ApiError>) -> (StatusCode, Value) {
        let response = err.into().into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_limit_exceeded_names_the_limit() {
        let (status, body) = body_of(PettyCashError::LimitExceeded {
            kind: LimitKind::DailyLimit,
            limit: Decimal::new(30_000, 2),
            amount: Decimal::new(5_000, 2),
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "LIMIT_EXCEEDED");
        assert_eq!(body["error"]["limit"], "daily_limit");
        assert!(body["error"].get("retryable").is_none());
    }

    #[tokio::test]
    async fn test_transient_is_retryable() {
        let (status, body) = body_of(LedgerError::Transient("pool timed out".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["retryable"], true);
        assert!(!body["error"]["message"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn test_not_found_hides_detail() {
        let (status, body) = body_of(LedgerError::InvoiceNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Resource not found");
    }
}
