use std::time::Duration;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};
use crate::core::models::{FormInput, Frame, Status};
use crate::render::exporter::{encode_png, Export};
use crate::render::session::Session;
use crate::web::state::AppState;

pub const RENDER_TOKEN_HEADER: &str = "x-render-token";

/// What the page needs to refresh its status line.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub state: String,
    pub message: String,
    pub token: u64,
    pub has_logo: bool,
}

impl StatusView {
    async fn of(session: &Session) -> Self {
        let status = session.status().await;
        let token = session.frame().await.map(|f| f.token).unwrap_or(0);
        let state = match status {
            Status::Ready => "ready",
            Status::Rendered => "rendered",
            Status::Error(_) => "error",
        };
        Self {
            state: state.to_string(),
            message: status.message().to_string(),
            token,
            has_logo: session.has_logo().await,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CanvasQuery {
    pub after: Option<u64>,
}

pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let handle = state.create_session().await;
    let render = &state.config.render;

    (StatusCode::CREATED, Json(json!({
        "id": handle.session.id(),
        "defaults": {
            "size": render.default_size,
            "border": render.default_border,
            "fg": render.fg().to_string(),
            "bg": render.bg().to_string(),
            "logo_scale": render.default_logo_scale,
            "max_logo_bytes": render.max_logo_bytes,
            "debounce_ms": render.debounce_ms,
        }
    })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.remove_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusView>> {
    let handle = state.session(id).await?;
    Ok(Json(StatusView::of(&handle.session).await))
}

/// Live update: debounced through the session's scheduler.
pub async fn update_params(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<StatusCode> {
    let handle = state.session(id).await?;
    if !handle.schedule(form).await {
        return Err(AppError::Server("redraw scheduler stopped".to_string()));
    }
    Ok(StatusCode::ACCEPTED)
}

/// Explicit preview: redraw now.
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Json<StatusView>> {
    let handle = state.session(id).await?;
    let outcome = handle.session.redraw(&form).await?;
    debug!(session = %id, ?outcome, "Preview rendered");
    Ok(Json(StatusView::of(&handle.session).await))
}

pub async fn upload_logo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<StatusView>> {
    let handle = state.session(id).await?;
    let session = &handle.session;

    // Bodies past the request limit fail inside multipart, before the loader
    // sees them; they still count as a failed load.
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let read_error = |e: MultipartError| {
        let limit = session.defaults().max_logo_bytes;
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::LogoTooLarge {
                size: declared.unwrap_or(limit.saturating_add(1)),
                limit,
            }
        } else {
            AppError::UnreadableFile(e.body_text())
        }
    };

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            let err = AppError::UnreadableFile("no file in request".to_string());
            session.reject_logo(&err).await;
            return Err(err);
        }
        Err(e) => {
            let err = read_error(e);
            session.reject_logo(&err).await;
            return Err(err);
        }
    };

    let file_name = field.file_name().unwrap_or("logo").to_string();
    let mime = field.content_type().map(str::to_string);
    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = read_error(e);
            session.reject_logo(&err).await;
            return Err(err);
        }
    };

    info!(session = %id, file = %file_name, bytes = bytes.len(), "Logo upload received");

    session.load_logo(bytes.to_vec(), mime.as_deref()).await?;

    // Redraw errors are reflected in the status view.
    let _ = session.redraw_last().await;
    Ok(Json(StatusView::of(session).await))
}

pub async fn delete_logo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusView>> {
    let handle = state.session(id).await?;
    handle.session.reset_logo().await;
    let _ = handle.session.redraw_last().await;
    Ok(Json(StatusView::of(&handle.session).await))
}

/// Current canvas as PNG. With `?after=N`, wait for a frame newer than `N`.
pub async fn get_canvas(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CanvasQuery>,
) -> AppResult<Response> {
    let handle = state.session(id).await?;

    let frame = match query.after {
        Some(after) => {
            let timeout = Duration::from_millis(state.config.server.long_poll_ms);
            match handle.session.wait_for_frame(after, timeout).await {
                Some(frame) => frame,
                None => return Ok(StatusCode::NO_CONTENT.into_response()),
            }
        }
        None => match handle.session.frame().await {
            Some(frame) => frame,
            None => return Ok(StatusCode::NOT_FOUND.into_response()),
        },
    };

    let token = frame.token;
    let bytes = png_of(frame).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(RENDER_TOKEN_HEADER, HeaderValue::from(token));
    Ok((headers, bytes).into_response())
}

/// Redraw with the submitted form and offer the PNG as a download.
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let handle = state.session(id).await?;
    let Export { file_name, bytes } = handle.session.export(&form).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| AppError::Export(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok((headers, bytes).into_response())
}

async fn png_of(frame: std::sync::Arc<Frame>) -> AppResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_png(&frame.image))
        .await
        .map_err(|e| AppError::Export(format!("encoder task failed: {}", e)))?
}
