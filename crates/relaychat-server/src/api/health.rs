//! GET /health: liveness probe.

use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;

#[derive(serde::Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: String,
    endpoints: [&'static str; 3],
}

pub async fn health() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        Json(Health {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339(),
            endpoints: ["/api/chat", "/api/mock-chat", "/health"],
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn reports_healthy_with_no_store_headers() {
        let response: Response = health().await.into_response();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache, no-store, must-revalidate"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }
}
