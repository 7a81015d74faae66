//! HTTP routes and handlers

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, Form, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use memeguard_core::{ErrorResponse, PredictRequest, PredictionResponse};
use serde::Deserialize;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::docs;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(index))
        .route("/apidocs", get(docs::swagger_ui))
        .route("/apidocs/", get(docs::swagger_ui))
        .route(docs::SPEC_PATH, get(docs::openapi_spec))
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/apidocs")])
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

/// Raw form fields of a prediction request.
///
/// Accepts `application/x-www-form-urlencoded` and `multipart/form-data`.
/// Any other body yields no fields, which the handler reports as missing.
#[derive(Debug, Default, Deserialize)]
pub struct PredictForm {
    pub image: Option<String>,
    pub text: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for PredictForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;

            let mut form = PredictForm::default();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::rejected(e.status(), e.body_text()))?
            {
                let name = field.name().map(str::to_owned);
                let slot = match name.as_deref() {
                    Some("image") => &mut form.image,
                    Some("text") => &mut form.text,
                    _ => continue,
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
                *slot = Some(value);
            }
            Ok(form)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<PredictForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
            Ok(form)
        } else {
            debug!("Unsupported content type '{}', no form fields read", content_type);
            Ok(PredictForm::default())
        }
    }
}

/// Classify an (image, text) pair
async fn predict(
    State(state): State<AppState>,
    form: PredictForm,
) -> Result<Json<PredictionResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);

    async move {
        metrics::counter!("memeguard_requests_total").increment(1);

        let request = PredictRequest::from_fields(form.image, form.text)?;
        debug!(
            image_len = request.image.len(),
            text_len = request.text.len(),
            "Received prediction request"
        );

        let classifier = state.classifier.clone();
        let start = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            classifier.classify(&request.image, &request.text)
        })
        .await
        .map_err(|e| AppError::Internal(format!("inference task failed: {}", e)))??;

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!("memeguard_inference_latency_us").record(latency_us as f64);
        metrics::counter!("memeguard_predictions_total", "label" => result.label.as_str())
            .increment(1);

        debug!(
            label = %result.label,
            score = result.score,
            latency_us,
            "Prediction complete"
        );

        Ok::<_, AppError>(Json(PredictionResponse {
            prediction: result.label,
        }))
    }
    .instrument(span)
    .await
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete request
    InvalidRequest(String),
    /// Body rejected by an extractor; payload-too-large keeps its status
    Rejected(StatusCode, String),
    /// Failure reported by the classification pipeline
    Pipeline(memeguard_core::Error),
    Internal(String),
}

impl AppError {
    fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Rejected(status, message)
        } else {
            AppError::InvalidRequest(message)
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Rejected(..) => "rejected",
            AppError::Pipeline(e) => e.kind(),
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<memeguard_core::Error> for AppError {
    fn from(err: memeguard_core::Error) -> Self {
        AppError::Pipeline(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("memeguard_errors_total", "kind" => self.kind()).increment(1);

        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected(status, msg) => (status, msg),
            AppError::Pipeline(err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Pipeline(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            error!("Request failed: {}", message);
        } else {
            warn!("Request rejected: {}", message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
