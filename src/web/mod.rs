//! Browser front end: an embedded single-page UI plus the JSON edit API.
//!
//! The page is a static string; there is no asset pipeline. State lives in
//! the browser - the server holds only the shared editor.

mod ui;

use crate::edit::{EditMode, EditRequest, ImageEditor};
use crate::error::BackdropError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Cap on the multipart body (source plus reference image).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for the web handlers.
#[derive(Clone)]
pub struct AppState {
    /// The editor every request goes through.
    pub editor: Arc<dyn ImageEditor>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/edit", post(edit_image))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves the UI until the process is stopped.
pub async fn serve(addr: SocketAddr, editor: Arc<dyn ImageEditor>) -> crate::Result<()> {
    let app = router(AppState { editor });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(ui::PAGE)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint - returns 200 OK when the service is running
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "ok": false, "error": message.into() })))
}

/// Maps a library error to the HTTP status the browser sees.
fn status_for(err: &BackdropError) -> StatusCode {
    match err {
        BackdropError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BackdropError::Auth(_) => StatusCode::UNAUTHORIZED,
        BackdropError::Billing(_) => StatusCode::PAYMENT_REQUIRED,
        BackdropError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        BackdropError::ContentBlocked(_) => StatusCode::BAD_REQUEST,
        BackdropError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

async fn edit_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut image = None;
    let mut mode = None;
    let mut prompt = None;
    let mut reference = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let data = field.bytes().await.map_err(|e| {
                    api_error(StatusCode::BAD_REQUEST, format!("image read error: {e}"))
                })?;
                image = Some(data.to_vec());
            }
            "reference" => {
                let data = field.bytes().await.map_err(|e| {
                    api_error(StatusCode::BAD_REQUEST, format!("reference read error: {e}"))
                })?;
                reference = Some(data.to_vec());
            }
            "mode" => {
                let value = field.text().await.map_err(|e| {
                    api_error(StatusCode::BAD_REQUEST, format!("mode read error: {e}"))
                })?;
                mode = Some(value);
            }
            "prompt" => {
                let value = field.text().await.map_err(|e| {
                    api_error(StatusCode::BAD_REQUEST, format!("prompt read error: {e}"))
                })?;
                prompt = Some(value);
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    let image = image
        .filter(|data| !data.is_empty())
        .ok_or_else(|| api_error(StatusCode::UNPROCESSABLE_ENTITY, "missing 'image' upload"))?;
    let mode = mode
        .ok_or_else(|| api_error(StatusCode::UNPROCESSABLE_ENTITY, "missing 'mode' field"))?;
    let mode = EditMode::from_str(&mode)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let mut request = EditRequest::new(image, mode);

    // Blank optional fields from the form are treated as absent
    if let Some(prompt) = prompt {
        let prompt = prompt.trim().to_string();
        if !prompt.is_empty() {
            request = request.with_backdrop_prompt(prompt);
        }
    }
    if let Some(reference) = reference {
        if !reference.is_empty() {
            request = request.with_reference_image(reference);
        }
    }

    request
        .validate()
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    info!(
        mode = %request.mode,
        source_bytes = request.image.len(),
        has_reference = request.reference_image.is_some(),
        "edit request received"
    );

    match state.editor.edit(&request).await {
        Ok(edited) => Ok(Json(json!({
            "ok": true,
            "image": edited.to_data_url(),
            "format": edited.format.extension(),
            "model": edited.metadata.model,
            "duration_ms": edited.metadata.duration_ms,
        }))),
        Err(err) => {
            error!("edit failed: {err}");
            Err((
                status_for(&err),
                Json(json!({ "ok": false, "error": err.to_string() })),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let editor = crate::GeminiEditor::builder()
            .api_key("test-key")
            .build()
            .expect("build editor");
        router(AppState {
            editor: Arc::new(editor),
        })
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_string(response).await;
        assert!(text.contains("<!doctype html>"));
        assert!(text.contains("Backdrop"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_string(response).await;
        assert!(text.contains("healthy"));
    }

    #[tokio::test]
    async fn test_edit_rejects_missing_image() {
        let body = concat!(
            "--boundary\r\n",
            "Content-Disposition: form-data; name=\"mode\"\r\n\r\n",
            "remove\r\n",
            "--boundary--\r\n"
        );

        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/edit")
                    .header(
                        header::CONTENT_TYPE,
                        "multipart/form-data; boundary=boundary",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let text = body_string(response).await;
        assert!(text.contains("missing 'image' upload"));
    }

    #[tokio::test]
    async fn test_edit_rejects_unknown_mode() {
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(b"--boundary\r\n");
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(b"\x89PNG\r\n\x1a\n\0\0\0\0\r\n");
        body.extend_from_slice(b"--boundary\r\n");
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"mode\"\r\n\r\n");
        body.extend_from_slice(b"sepia\r\n");
        body.extend_from_slice(b"--boundary--\r\n");

        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/edit")
                    .header(
                        header::CONTENT_TYPE,
                        "multipart/form-data; boundary=boundary",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let text = body_string(response).await;
        assert!(text.contains("unknown edit mode"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&BackdropError::InvalidRequest("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&BackdropError::Auth("bad key".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&BackdropError::RateLimited { retry_after: None }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&BackdropError::ContentBlocked("nsfw".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BackdropError::UnexpectedResponse("empty".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
