use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::ApiErrorBody;

/// `Json<T>` whose rejections use the service-wide `{"message": ...}` body.
/// Keeps the rejection status (400 syntax, 413 too large, 415 content type, 422 shape).
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    (
        status,
        Json(ApiErrorBody {
            message: rejection.body_text(),
        }),
    )
        .into_response()
}
