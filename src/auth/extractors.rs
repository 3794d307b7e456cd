use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::auth::SESSION_COOKIE;
use crate::errors::ErrorDetail;

/// Extractor for the session cookie; rejects requests without one.
pub struct SessionKey(pub String);

impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorDetail>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .map(|cookie| SessionKey(cookie.value().to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ErrorDetail {
                    detail: "Missing session cookie".to_string(),
                }),
            ))
    }
}
