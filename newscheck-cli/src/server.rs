//! Axum routes for the NewsCheck page.
//!
//! # Routes
//!
//! - `GET  /`                  Empty page with the configured default selection
//! - `POST /analyze`           Form submission, re-renders the page with results
//! - `POST /api/analyze`       JSON `{ "text": ..., "analyses": {...} }` → report
//! - `GET  /api/capabilities`  Configured providers
//! - `GET  /health`            Liveness probe

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use newscheck_core::analysis::{AnalysisKind, AnalysisSelection, Analyzer};
use newscheck_core::render::{render_page, PageState};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub default_selection: AnalysisSelection,
}

impl AppState {
    pub fn new(analyzer: Analyzer, default_selection: AnalysisSelection) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            default_selection,
        }
    }
}

/// Build the router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_form_handler))
        .route("/api/analyze", post(analyze_json_handler))
        .route("/api/capabilities", get(capabilities_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": newscheck_core::VERSION,
        "service": "newscheck",
    }))
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageState::new(state.default_selection)))
}

/// Unchecked checkboxes are simply absent from the form body, so the
/// selection is derived from which keys are present.
fn selection_from_form(form: &HashMap<String, String>) -> AnalysisSelection {
    AnalysisSelection::from_kinds(
        AnalysisKind::ALL
            .into_iter()
            .filter(|kind| form.contains_key(kind.key())),
    )
}

async fn analyze_form_handler(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let text = form.get("text").cloned().unwrap_or_default();
    let selection = selection_from_form(&form);
    let result = state.analyzer.analyze(&text, &selection).await;

    Html(render_page(&PageState {
        text,
        selection,
        result: Some(result),
    }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default)]
    analyses: Option<AnalysisSelection>,
}

async fn analyze_json_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let selection = request.analyses.unwrap_or(state.default_selection);
    match state.analyzer.analyze(&request.text, &selection).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

async fn capabilities_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.analyzer.invoker().registry().list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use newscheck_core::capability::{
        text_operation, CapabilityRegistry, GuardedInvoker, StaticProvider,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                StaticProvider::new("fake")
                    .with_operation("predict_fake", text_operation(|_| "Likely Fake (92%)".into()))
                    .into_shared(),
            )
            .unwrap();
        let analyzer = Analyzer::new(GuardedInvoker::new(Arc::new(registry)));
        app_router(AppState::new(analyzer, AnalysisSelection::default()))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_submission_renders_cards() {
        let response = app()
            .oneshot(
                Request::post("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("text=Moon+replaced+by+cheese&fake=on&emotion=on"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Likely Fake (92%)"));
        assert!(html.contains("🚧 Coming Soon — ProviderNotFound"));
        assert!(!html.contains("Topic Classification</h4>"));
    }

    #[tokio::test]
    async fn test_form_submission_with_blank_text_warns() {
        let response = app()
            .oneshot(
                Request::post("/analyze")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("text=+++&topic=on"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains("Please paste a news article before analyzing."));
    }

    #[tokio::test]
    async fn test_json_api() {
        let response = app()
            .oneshot(
                Request::post("/api/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text": "Breaking: Moon replaced by cheese"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let report: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let cards = report["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1]["outcome"]["value"], "Likely Fake (92%)");
    }

    #[tokio::test]
    async fn test_json_api_rejects_blank_text() {
        let response = app()
            .oneshot(
                Request::post("/api/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
