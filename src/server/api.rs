//! HTTP API server implementation

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::config::ServiceConfig;
use crate::core::engine::Seq2SeqTranslator;
use crate::core::errors::TranslationError;
use crate::core::models::{ErrorResponse, ModelInfo, TranslationRequest, TranslationResponse};

const HOME_MESSAGE: &str = "Servidor de Tradução IA está no ar!";
const EMPTY_BODY: &str = "Corpo da requisição vazio";
const MISSING_TEXT: &str = "Nenhum texto fornecido no corpo da requisição";
const INTERNAL_ERROR: &str = "Erro interno do servidor ao processar a tradução";

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Arc<Seq2SeqTranslator>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(translator: Seq2SeqTranslator) -> Self {
        Self {
            translator: Arc::new(translator),
            started_at: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    started_at: DateTime<Utc>,
    uptime_seconds: i64,
}

/// Error with the status code it is reported under
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR.to_string(),
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            warn!("Translation failed: {}", err);
            Self::internal()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Liveness message
async fn home() -> &'static str {
    HOME_MESSAGE
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

/// Model dimensions handler
async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.translator.info())
}

/// Translation handler
async fn translate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranslationResponse>, ApiError> {
    let text = parse_request(&body)?;

    let translator = Arc::clone(&state.translator);
    let original = text.clone();
    let translated = tokio::task::spawn_blocking(move || translator.translate(&original))
        .await
        .map_err(|e| {
            warn!("Translation task failed: {}", e);
            ApiError::internal()
        })??;

    info!(
        "Translated {} chars into {} chars",
        text.chars().count(),
        translated.chars().count()
    );

    Ok(Json(TranslationResponse {
        original: text,
        translated,
    }))
}

/// Extract `texto` from a raw body, mapping absent or empty values to 400s
fn parse_request(body: &[u8]) -> Result<String, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request(EMPTY_BODY));
    }

    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Malformed request body: {}", e);
        ApiError::bad_request(EMPTY_BODY)
    })?;

    if is_falsy(&value) {
        return Err(ApiError::bad_request(EMPTY_BODY));
    }

    let request: TranslationRequest =
        serde_json::from_value(value).map_err(|_| ApiError::bad_request(MISSING_TEXT))?;

    match request.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::bad_request(MISSING_TEXT)),
    }
}

/// JSON values a client sends when it has nothing to send
fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Create router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/v1/model", get(model_info))
        .route("/traduzir", post(translate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: &ServiceConfig) -> anyhow::Result<()> {
    info!("Loading model...");
    let translator =
        Seq2SeqTranslator::load(&config.model_config_path, &config.model_weights_path)?;

    let app = build_router(AppState::new(translator));

    // Bind address
    let addr: SocketAddr = config.bind_address().parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::fixtures;
    use crate::nn::weights::WeightStore;
    use assert_json_diff::assert_json_eq;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = fixtures::model_config();
        let weights = WeightStore::from_bytes(fixtures::weights(&config, fixtures::OI)).unwrap();
        build_router(AppState::new(Seq2SeqTranslator::new(config, &weights).unwrap()))
    }

    async fn post(body: &'static str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/traduzir")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_success() {
        let (status, body) = post(r#"{"texto": "hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_json_eq!(body, json!({"texto_original": "hi", "texto_traduzido": "oi"}));
    }

    #[tokio::test]
    async fn test_empty_body() {
        for body in ["", "{}", "null", "[]", "\"\"", "0", "0.0", "false"] {
            let (status, json) = post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_json_eq!(json, json!({"erro": EMPTY_BODY}));
        }
    }

    #[tokio::test]
    async fn test_missing_text() {
        for body in [r#"{"texto": ""}"#, r#"{"text": "hi"}"#, r#"{"texto": null}"#] {
            let (status, json) = post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_json_eq!(json, json!({"erro": MISSING_TEXT}));
        }
    }

    #[tokio::test]
    async fn test_input_too_long() {
        let (status, body) = post(r#"{"texto": "hello there"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_json_eq!(
            body,
            json!({"erro": "Input too long: 11 characters (maximum 5)"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let mut config = fixtures::model_config();
        config.num_decoder_tokens = 5;
        let weights = WeightStore::from_bytes(fixtures::weights(&config, &[(0, 4)])).unwrap();
        let app = build_router(AppState::new(Seq2SeqTranslator::new(config, &weights).unwrap()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/traduzir")
                    .body(Body::from(r#"{"texto": "hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_json_eq!(body, json!({"erro": INTERNAL_ERROR}));
    }

    #[tokio::test]
    async fn test_home_and_model_info() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], HOME_MESSAGE.as_bytes());

        let response = app
            .oneshot(Request::builder().uri("/v1/model").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_json_eq!(
            body,
            json!({
                "latent_dim": 4,
                "num_encoder_tokens": 3,
                "num_decoder_tokens": 4,
                "max_encoder_seq_length": 5,
                "max_decoder_seq_length": 3
            })
        );
    }

    #[tokio::test]
    async fn test_truthy_non_object_body_lacks_text() {
        for body in ["[1]", "\"hi\"", "1", "true"] {
            let (status, json) = post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_json_eq!(json, json!({"erro": MISSING_TEXT}));
        }
    }

    #[tokio::test]
    async fn test_health_fields() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["started_at"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .is_some());
        assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/traduzir")
                    .header("origin", "http://localhost:8081")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.contains_key("access-control-allow-methods"));

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://localhost:8081")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
