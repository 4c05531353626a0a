//! Request extractors that report failures as `ApiError`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Path, Request, rejection::PathRejection},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// JSON request body, parsed whatever the `Content-Type` header says.
///
/// A body that is not valid JSON for `T` is rejected as InvalidBody.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            warn!("Could not read request body: {}", rejection.body_text());
            ApiError::invalid_body()
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            warn!("Rejected request body: {}", e);
            ApiError::invalid_body()
        })
    }
}

/// Identifier from the path. Ids that are not an `i32` match no row and
/// are reported with the `missing` message.
pub fn path_id(
    path: Result<Path<i32>, PathRejection>,
    missing: &'static str,
) -> Result<i32, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!("Unusable path id: {}", rejection.body_text());
        ApiError::NotFound(missing)
    })
}
