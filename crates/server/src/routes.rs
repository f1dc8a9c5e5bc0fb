//! API route definitions

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{chat, health, history, page},
    middleware::logging_middleware,
    state::AppState,
};

/// All routes, with logging, tracing and CORS layers applied
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(health::health_check))
        .route("/api/chat", post(chat::chat))
        .route("/api/history", get(history::history))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use stemtutor_core::{AppError, AppResult};
    use stemtutor_knowledge::embeddings::providers::TrigramProvider;
    use stemtutor_knowledge::{
        DatasetCatalog, EmbeddingConfig, EmbeddingEngine, EmbeddingProvider, KnowledgeBase,
        TutorBot, TutorSettings,
    };
    use stemtutor_qa::LexicalReader;
    use tower::ServiceExt;

    const DIMENSIONS: usize = 384;

    /// Fails on every batch that mentions "detonate".
    #[derive(Debug)]
    struct FlakyProvider(TrigramProvider);

    #[async_trait::async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        fn model_name(&self) -> &str {
            "flaky-v1"
        }

        fn dimensions(&self) -> usize {
            self.0.dimensions()
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains("detonate")) {
                return Err(AppError::Embedding("model crashed".to_string()));
            }
            self.0.embed_batch(texts).await
        }
    }

    async fn test_app() -> Router {
        let engine = EmbeddingEngine::with_provider(
            Arc::new(FlakyProvider(TrigramProvider::new(DIMENSIONS))),
            EmbeddingConfig::trigram(DIMENSIONS),
            None,
        );
        let bot = TutorBot::assemble(
            KnowledgeBase::builtin().unwrap(),
            DatasetCatalog::default(),
            Some(engine),
            Arc::new(LexicalReader::new()),
            TutorSettings::default(),
        )
        .await
        .unwrap();

        app(AppState::new(Arc::new(bot)).unwrap())
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = test_app().await.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<title>STEM Tutor</title>"));
        assert!(html.contains("Explain photosynthesis"));
    }

    #[tokio::test]
    async fn test_chat_answers() {
        let response = test_app()
            .await
            .oneshot(post_chat(r#"{"message": "What is Newton's second law?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["response"]
            .as_str()
            .unwrap()
            .starts_with("**Newton's Second Law:**"));
        assert!((body["confidence"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(body["topic"], "newtons_second_law");
        assert_eq!(body["subject"], "physics");
        assert_eq!(body["source"], "Local Knowledge Base");
    }

    #[tokio::test]
    async fn test_chat_without_match_omits_source() {
        let response = test_app()
            .await
            .oneshot(post_chat(
                r#"{"message": "Recommend a good novel to read tonight please"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["confidence"], 0.0);
        assert!(body.get("source").is_none());
        assert!(body.get("highlight").is_none());
    }

    #[tokio::test]
    async fn test_chat_empty_message() {
        for payload in [r#"{"message": ""}"#, r#"{"message": null}"#, "{}"] {
            let response = test_app().await.oneshot(post_chat(payload)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                serde_json::json!({ "error": "No message provided" })
            );
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_json() {
        let response = test_app()
            .await
            .oneshot(post_chat("{message: "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn test_chat_tutor_failure() {
        let response = test_app()
            .await
            .oneshot(post_chat(
                r#"{"message": "What happens when you detonate hydrogen?"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(
            body["response"],
            "A severe server error occurred while processing your request."
        );
    }

    #[tokio::test]
    async fn test_history_after_chat() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(post_chat(r#"{"message": "What is kinetic energy?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api/history")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["questions"], serde_json::json!(["What is kinetic energy?"]));
        assert_eq!(
            body["summary"],
            "Recent questions:\n  1. What is kinetic energy?"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().await.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["stats"]["knowledge_base_topics"], 16);
        assert_eq!(body["stats"]["semantic_search"], true);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app().await.oneshot(get("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
