pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.analyzer.max_content_length;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::interpreter::KeywordInterpreter;
    use crate::config::{AiConfig, AnalyzerConfig, Config};
    use crate::models::profile::parse_and_validate_profile;

    fn test_state(ai_enabled: bool) -> AppState {
        let profile = parse_and_validate_profile(json!({
            "skills": ["Python", "RAG"],
            "projects": [{
                "name": "Retrieval Assistant",
                "tags": ["RAG", "Python"],
                "stack": ["Python"],
                "outcomes": ["Shipped grounded answers"],
                "evidence_urls": ["https://portfolio.example/rag/"]
            }],
            "constraints": {"location": "Remote", "languages": ["English"], "availability": "Full-time"}
        }))
        .unwrap();

        AppState {
            profile: Arc::new(profile),
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                profile_path: PathBuf::new(),
                analyzer: AnalyzerConfig {
                    max_content_length: 2_048,
                    ..AnalyzerConfig::default()
                },
                ai: AiConfig {
                    enabled: ai_enabled,
                    ..AiConfig::default()
                },
            },
            interpreter: Arc::new(KeywordInterpreter),
        }
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(false));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "concierge");
    }

    #[tokio::test]
    async fn test_analyze_returns_scored_response() {
        let app = build_router(test_state(true));
        let body = json!({"jd_text": "Responsibilities:\n- Build RAG assistants in Python\nRequirements:\n- Python"});
        let response = app.oneshot(post_json(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["score"].as_u64().unwrap() <= 100);
        assert_eq!(body["rubric_breakdown"].as_array().unwrap().len(), 6);
        assert!(!body["request_id"].as_str().unwrap().is_empty());
        assert_eq!(body["ai_metadata"]["ai_model"], "deterministic");
    }

    #[tokio::test]
    async fn test_analyze_omits_ai_metadata_when_disabled() {
        let app = build_router(test_state(false));
        let body = json!({"jd_text": "Requirements:\n- Python"});
        let response = app.oneshot(post_json(body.to_string())).await.unwrap();
        let body = json_body(response).await;
        assert!(body.get("ai_metadata").is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_text() {
        let app = build_router(test_state(false));
        let response = app
            .oneshot(post_json(json!({"jd_text": "  "}).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Field jd_text cannot be empty");
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_body() {
        let app = build_router(test_state(false));
        let body = json!({"jd_text": "x".repeat(4_096)}).to_string();
        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = build_router(test_state(false));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
