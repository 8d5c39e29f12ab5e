//! HTTP API: image extraction and prediction proxy.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use formscan_core::{FormScanner, OcrError, PredictError, PredictionClient, PredictionInput};

/// Shared application state for API handlers.
pub struct AppState {
    pub scanner: FormScanner,
    pub predictor: PredictionClient,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/extract", post(extract))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<OcrError> for ApiError {
    fn from(e: OcrError) -> Self {
        if e.is_input_error() {
            warn!(error = %e, "Rejected upload");
            Self::bad_request(e.to_string())
        } else {
            error!(error = %e, "OCR failed");
            Self::internal(e.to_string())
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidInput(_) => Self::bad_request(e.to_string()),
            _ => {
                error!(error = %e, "Prediction request failed");
                Self::new(StatusCode::BAD_GATEWAY, e.to_string())
            }
        }
    }
}

/// `POST /extract`: OCR the uploaded `image` and return the extracted fields.
async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(format!("No image uploaded: {}", e.body_text())))?;

    let Some(image) = read_image_field(&mut multipart).await? else {
        return Err(ApiError::bad_request(
            "No image uploaded: missing \"image\" field",
        ));
    };

    let scanner = state.scanner.clone();
    let report = tokio::task::spawn_blocking(move || scanner.scan_image(&image))
        .await
        .map_err(|e| ApiError::internal(format!("OCR task failed: {}", e)))??;

    info!(
        fields = report.extracted.len(),
        elapsed_ms = report.processing_time_ms,
        "Extraction complete"
    );

    Ok(Json(json!({ "extracted": report.extracted })))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Invalid upload: {}", e.body_text())))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), format!("Invalid upload: {}", e.body_text())))?;

        info!(file = ?file_name, size = data.len(), "Received upload");
        return Ok(Some(data));
    }

    Ok(None)
}

/// `POST /predict`: forward the eight-field payload to the prediction service.
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let prediction = state.predictor.predict(&input).await?;
    info!(%prediction, "Prediction complete");

    Ok(Json(json!({ "prediction": prediction })))
}

/// `GET /health`
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let scanner = state.scanner.clone();
    let available = tokio::task::spawn_blocking(move || scanner.ocr().is_available())
        .await
        .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "ocr_engine": state.scanner.ocr().name(),
        "ocr_available": available,
    }))
}
