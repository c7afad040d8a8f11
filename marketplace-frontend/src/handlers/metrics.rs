use axum::{http::StatusCode, response::IntoResponse};

pub async fn metrics() -> impl IntoResponse {
    match crate::services::metrics::get_metrics() {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::NOT_FOUND, "Metrics recorder not initialized".to_string()),
    }
}
