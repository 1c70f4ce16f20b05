use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::storage::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "Staking data not found";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch staking data";

/// Failures a staking endpoint can answer with. Store detail is logged,
/// never sent to the client.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            ApiError::Store(err) => {
                tracing::error!("Staking query failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED_MESSAGE)
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn store_failure_is_generic_500() {
        let err = ApiError::Store(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "Failed to fetch staking data" }));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Staking data not found" }));
    }
}
