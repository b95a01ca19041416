use mnt_core::QueryError;
use mnt_stream::StreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "http")]
impl ApiError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::RemoteFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Query(QueryError::TransientIo(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Query(QueryError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Stream(StreamError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Stream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn query_errors_map_to_status_codes() {
        let cases = [
            (QueryError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (QueryError::RemoteFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (QueryError::TransientIo("x".into()), StatusCode::BAD_GATEWAY),
            (
                QueryError::DeadlineExceeded(Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).status_code(), code);
        }
    }

    #[test]
    fn remote_failure_message_is_passed_through() {
        let err = ApiError::from(QueryError::RemoteFailure(
            "query failed: FAILED - table not found".into(),
        ));
        assert_eq!(err.to_string(), "query failed: FAILED - table not found");
    }

    #[test]
    fn missing_stream_name_is_a_server_error() {
        let err = ApiError::from(StreamError::MissingStreamName);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
