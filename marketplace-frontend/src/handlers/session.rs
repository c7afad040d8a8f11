//! Cookie bridge endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use service_core::error::AppError;

use crate::session::cookie::{delete_auth_cookie, write_auth_cookie};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteCookieRequest {
    pub access_token: String,
}

/// `PUT /api/session/cookie`
pub async fn write_cookie(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<WriteCookieRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = payload.access_token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request("accessToken must not be empty"));
    }

    tracing::debug!(max_age = state.cookie_max_age, "Writing auth cookie");
    Ok((
        write_auth_cookie(jar, token, state.cookie_max_age),
        StatusCode::NO_CONTENT,
    ))
}

/// `DELETE /api/session/cookie`
pub async fn delete_cookie(jar: CookieJar) -> impl IntoResponse {
    tracing::debug!("Deleting auth cookie");
    (delete_auth_cookie(jar), StatusCode::NO_CONTENT)
}
