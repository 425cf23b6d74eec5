//! Drives the service clients against an in-process axum server bound to
//! an ephemeral localhost port.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use autoreel_core::options::{Resolution, ScriptLength, ScriptStyle, Visibility};
use autoreel_core::providers::{
    AnimationJobStatus, AnimationRequest, AnimationService, ProviderError, PublishMetadata,
    ScriptGenerator, ScriptRequest, VideoPublisher,
};
use autoreel_services::{OpenAiScriptGenerator, PikaAnimationService, YoutubePublisher};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Accept connections but never answer, so every request hangs.
async fn spawn_silent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn metadata() -> PublishMetadata {
    PublishMetadata {
        title: "Daily motivation".into(),
        description: "Short clip".into(),
        tags: vec![],
        visibility: Visibility::Private,
    }
}

// ---------------------------------------------------------------------------
// Test: animation job lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn animation_submit_status_and_download() {
    let app = Router::new()
        .route(
            "/video.create",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers[header::AUTHORIZATION], "Bearer pika-key");
                assert_eq!(body["aspect_ratio"], "1920:1080");
                assert_eq!(body["fps"], 24);
                Json(json!({ "id": "job-1" }))
            }),
        )
        .route(
            "/video.get",
            get(
                |Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    assert_eq!(q.get("id").map(String::as_str), Some("job-1"));
                    Json(json!({ "status": "completed", "video": "/asset.mp4" }))
                },
            ),
        )
        .route("/asset.mp4", get(|| async { b"MP4DATA".to_vec() }));
    let base = spawn(app).await;

    let service = PikaAnimationService::new(base.clone(), Some("pika-key".into()));
    let (w, h) = Resolution::FullHd.dimensions();
    let job_id = service
        .submit(&AnimationRequest {
            prompt: "A modern animated video".into(),
            aspect_ratio: format!("{w}:{h}"),
            fps: 24,
            duration_secs: 10,
        })
        .await
        .unwrap();
    assert_eq!(job_id, "job-1");

    let status = service.status(&job_id).await.unwrap();
    assert_eq!(
        status,
        AnimationJobStatus::Completed {
            asset_url: "/asset.mp4".into()
        }
    );

    let bytes = service.download(&format!("{base}/asset.mp4")).await.unwrap();
    assert_eq!(bytes, b"MP4DATA");
}

#[tokio::test]
async fn animation_api_error_carries_status_and_body() {
    let app = Router::new().route(
        "/video.create",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad prompt") }),
    );
    let base = spawn(app).await;

    let service = PikaAnimationService::new(base, Some("k".into()));
    let err = service
        .submit(&AnimationRequest {
            prompt: "x".into(),
            aspect_ratio: "1280:720".into(),
            fps: 24,
            duration_secs: 10,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ProviderError::Api { status: 422, body } if body == "bad prompt");
}

// ---------------------------------------------------------------------------
// Test: resumable upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_opens_session_then_puts_bytes() {
    let dir = tempfile::TempDir::new().unwrap();
    let video = dir.path().join("video.mp4");
    std::fs::write(&video, b"0123456789").unwrap();

    // The session URI must be absolute, so the server needs its own address.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let session = format!("{base}/session/abc");

    let app = Router::new()
        .route(
            "/videos",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let session = session.clone();
                async move {
                    assert_eq!(headers["x-upload-content-length"], "10");
                    assert_eq!(headers["x-upload-content-type"], "video/mp4");
                    assert_eq!(body["status"]["privacyStatus"], "private");
                    (StatusCode::OK, [(header::LOCATION, session)]).into_response()
                }
            }),
        )
        .route(
            "/session/abc",
            put(|body: axum::body::Bytes| async move {
                assert_eq!(&body[..], b"0123456789");
                Json(json!({ "id": "vid123" }))
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let publisher = YoutubePublisher::new(base, Some("token".into()));
    let id = publisher.publish(&video, &metadata()).await.unwrap();
    assert_eq!(id, "vid123");
}

#[tokio::test]
async fn upload_rejected_token_is_auth_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let video = dir.path().join("video.mp4");
    std::fs::write(&video, b"data").unwrap();

    let app = Router::new().route(
        "/videos",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid credentials") }),
    );
    let base = spawn(app).await;

    let publisher = YoutubePublisher::new(base, Some("expired".into()));
    let err = publisher.publish(&video, &metadata()).await.unwrap_err();
    assert_matches!(err, ProviderError::Auth(_));
}

#[tokio::test]
async fn upload_without_token_fails_before_network() {
    let publisher = YoutubePublisher::new("http://127.0.0.1:9".into(), None);
    let err = publisher
        .publish(std::path::Path::new("missing.mp4"), &metadata())
        .await
        .unwrap_err();
    assert_matches!(err, ProviderError::Auth(msg) if msg.contains("YOUTUBE_ACCESS_TOKEN"));
}

// ---------------------------------------------------------------------------
// Test: request time limits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn script_request_to_silent_server_times_out() {
    let base = spawn_silent().await;
    let generator = OpenAiScriptGenerator::new(base, Some("k".into()), "gpt-4o-mini".into())
        .with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = generator
        .generate(&ScriptRequest {
            topic: "Tides".into(),
            length: ScriptLength::Short,
            style: ScriptStyle::Casual,
        })
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Timeout { what, .. } if what.contains("/chat/completions"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn animation_status_to_silent_server_times_out() {
    let base = spawn_silent().await;
    let service = PikaAnimationService::new(base, Some("k".into()))
        .with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = service.status("job-1").await.unwrap_err();

    assert_matches!(err, ProviderError::Timeout { .. });
    assert!(started.elapsed() < Duration::from_secs(5));
}
