//! HTTP error responses.
//!
//! Every failure leaves the API as `{"detail": message}` with a status that
//! reflects the layer it came from.

use async_trait::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

use crate::knot::KnotError;
use crate::query::QueryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), detail = %self.detail, "request failed");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(msg) => Self::bad_request(msg),
            QueryError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            QueryError::Storage(e) => Self::internal(format!("Error querying orders: {e}")),
        }
    }
}

impl From<KnotError> for ApiError {
    fn from(err: KnotError) -> Self {
        match err {
            KnotError::Upstream { status, detail } => Self::new(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail,
            ),
            KnotError::CredentialsMissing => Self::internal(err.to_string()),
            KnotError::Http(_) | KnotError::MissingSession => {
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// Query-string extractor whose rejections use the API error shape.
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, Clone, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_query_error_statuses() {
        let err: ApiError = QueryError::Validation("page must be >= 1".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "page must be >= 1");

        let err: ApiError = QueryError::NotFound("abc".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "Order with key 'abc' not found");

        let err: ApiError =
            QueryError::Storage(StorageError::Unavailable("down".to_string())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_knot_error_statuses() {
        let err: ApiError = KnotError::Upstream {
            status: 401,
            detail: "Failed to create Knot session",
        }
        .into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.detail, "Failed to create Knot session");

        let err: ApiError = KnotError::MissingSession.into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = KnotError::CredentialsMissing.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
