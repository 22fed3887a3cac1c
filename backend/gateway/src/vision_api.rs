//! Vision extraction endpoints.
//!
//! `detect-items` and `extract-item` keep the legacy envelope contract:
//! upload problems are 4xx, but extraction failures still answer 200 with
//! a `status: "error"` envelope, which is what the existing frontend
//! expects. `/api/menu/extract` is the full-document endpoint and maps
//! terminal extraction failures to 502.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

use canta_core::mime::is_image;
use canta_core::{ImagePayload, MenuDocument};
use canta_extraction::{box_summary, first_item_summary, ShapedResponse};

use crate::server::GatewayState;

/// Upload validation failure, rendered as `{"error": ...}`.
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

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}

/// Pull the uploaded image out of a multipart body.
///
/// Expects a `file` field carrying an `image/*` part.
async fn read_image(mut multipart: Multipart) -> Result<ImagePayload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("unreadable multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let mime = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_default();
        if !is_image(&mime) {
            return Err(ApiError::bad_request("File must be an image"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("No file selected"));
        }

        info!(bytes = bytes.len(), mime = %mime, "image upload received");
        return Ok(ImagePayload::new(bytes.to_vec(), mime));
    }

    Err(ApiError::bad_request("No file provided"))
}

/// `POST /api/vision/detect-items` — box-summary envelope.
pub async fn detect_items(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<ShapedResponse>, ApiError> {
    let image = read_image(multipart).await?;
    let outcome = state.extractor.extract(&image).await;
    if let Err(failure) = &outcome {
        error!(error = %failure, "detect-items extraction failed");
    }
    Ok(Json(box_summary(&outcome)))
}

/// `POST /api/vision/extract-item` — single-item envelope.
pub async fn extract_item(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<ShapedResponse>, ApiError> {
    let image = read_image(multipart).await?;
    let outcome = state.extractor.extract(&image).await;
    if let Err(failure) = &outcome {
        error!(error = %failure, "extract-item extraction failed");
    }
    Ok(Json(first_item_summary(&outcome)))
}

/// `POST /api/menu/extract` — full validated document.
pub async fn extract_menu(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<MenuDocument>, ApiError> {
    let image = read_image(multipart).await?;
    match state.extractor.extract(&image).await {
        Ok(doc) => Ok(Json(doc)),
        Err(failure) => {
            error!(error = %failure, "menu extraction failed");
            Err(ApiError::bad_gateway(failure.to_string()))
        }
    }
}

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
