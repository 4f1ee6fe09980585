use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use qrsmith::{create_routes, AppConfig, AppState, QrEncoder};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt;

const BOUNDARY: &str = "qrsmith-test-boundary";

fn test_state() -> AppState {
    let mut config = AppConfig::default();
    config.render.max_logo_bytes = 64 * 1024;
    config.render.debounce_ms = 50;
    config.server.long_poll_ms = 5_000;
    AppState::new(config, Arc::new(QrEncoder))
}

fn app(state: &AppState) -> Router {
    create_routes(state.clone())
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, file_name: &str, mime: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"logo\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            file_name, mime
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([220, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

async fn new_session(state: &AppState) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .body(Body::empty())
        .unwrap();
    let response = app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["defaults"]["size"], 400);
    assert_eq!(created["defaults"]["fg"], "#000000");
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_state();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "qrsmith");
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn test_index_served_for_non_api_paths() {
    let state = test_state();
    for uri in ["/", "/anything"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<title>qrsmith"));
    }
}

#[tokio::test]
async fn test_unknown_api_route() {
    let state = test_state();
    let request = Request::builder()
        .uri("/api/nope")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_unknown_session() {
    let state = test_state();
    let request = Request::builder()
        .uri("/api/sessions/00000000-0000-0000-0000-000000000000")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "session_not_found");
}

#[tokio::test]
async fn test_preview_and_canvas() {
    let state = test_state();
    let id = new_session(&state).await;

    // Nothing rendered yet
    let request = Request::builder()
        .uri(format!("/api/sessions/{}/canvas", id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let form = serde_json::json!({
        "text": "https://example.com",
        "size": "400",
        "border": "4",
        "fg": "#000000",
        "bg": "#ffffff"
    });
    let response = app(&state)
        .oneshot(json_request("POST", &format!("/api/sessions/{}/preview", id), form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["state"], "rendered");
    assert_eq!(view["token"], 1);
    assert_eq!(view["has_logo"], false);

    let request = Request::builder()
        .uri(format!("/api/sessions/{}/canvas", id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(response.headers()["x-render-token"], "1");

    let png = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!((png.width(), png.height()), (400, 400));
}

#[tokio::test]
async fn test_preview_empty_text() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            &format!("/api/sessions/{}/preview", id),
            serde_json::json!({ "text": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "empty_input");
    assert!(body["message"].as_str().unwrap().contains("enter text"));

    let request = Request::builder()
        .uri(format!("/api/sessions/{}", id))
        .body(Body::empty())
        .unwrap();
    let view = body_json(app(&state).oneshot(request).await.unwrap()).await;
    assert_eq!(view["state"], "error");
    assert_eq!(view["message"], "enter text to generate");
}

#[tokio::test]
async fn test_debounced_params_update_reaches_canvas() {
    let state = test_state();
    let id = new_session(&state).await;

    for text in ["h", "he", "hel", "hello"] {
        let response = app(&state)
            .oneshot(json_request(
                "PUT",
                &format!("/api/sessions/{}/params", id),
                serde_json::json!({ "text": text, "size": "256" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let request = Request::builder()
        .uri(format!("/api/sessions/{}/canvas?after=0", id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token: u64 = response.headers()["x-render-token"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(token >= 1);

    let png = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!(png.width(), 256);
}

#[tokio::test]
async fn test_logo_upload_and_reset() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            &format!("/api/sessions/{}/preview", id),
            serde_json::json!({ "text": "with logo" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&state)
        .oneshot(multipart_request(
            &format!("/api/sessions/{}/logo", id),
            "logo.png",
            "image/png",
            &png_bytes(32, 16),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["has_logo"], true);
    // The logo upload triggers a redraw with the last form
    assert_eq!(view["token"], 2);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/sessions/{}/logo", id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["has_logo"], false);
    assert_eq!(view["token"], 3);
}

#[tokio::test]
async fn test_oversized_logo_rejected() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(multipart_request(
            &format!("/api/sessions/{}/logo", id),
            "huge.png",
            "image/png",
            &vec![0u8; 65 * 1024],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "logo_too_large");

    let request = Request::builder()
        .uri(format!("/api/sessions/{}", id))
        .body(Body::empty())
        .unwrap();
    let view = body_json(app(&state).oneshot(request).await.unwrap()).await;
    assert_eq!(view["has_logo"], false);
    assert!(view["message"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_upload_past_body_limit_clears_logo() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(multipart_request(
            &format!("/api/sessions/{}/logo", id),
            "logo.png",
            "image/png",
            &png_bytes(8, 8),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["has_logo"], true);

    // Well past the logo limit plus the form overhead
    let response = app(&state)
        .oneshot(multipart_request(
            &format!("/api/sessions/{}/logo", id),
            "huge.png",
            "image/png",
            &vec![0u8; 200 * 1024],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "logo_too_large");

    let request = Request::builder()
        .uri(format!("/api/sessions/{}", id))
        .body(Body::empty())
        .unwrap();
    let view = body_json(app(&state).oneshot(request).await.unwrap()).await;
    assert_eq!(view["has_logo"], false);
    assert_eq!(view["state"], "error");
    assert!(view["message"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_non_image_upload_rejected() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(multipart_request(
            &format!("/api/sessions/{}/logo", id),
            "notes.txt",
            "text/plain",
            b"hello",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(response).await["error"], "undecodable_image");
}

#[tokio::test]
async fn test_export_download() {
    let state = test_state();
    let id = new_session(&state).await;

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            &format!("/api/sessions/{}/export", id),
            serde_json::json!({ "text": "Hello, World!", "size": "300" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hello_world.png\""
    );

    let png = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!((png.width(), png.height()), (300, 300));
}

#[tokio::test]
async fn test_delete_session() {
    let state = test_state();
    let id = new_session(&state).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/sessions/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.session_count().await, 0);
}
