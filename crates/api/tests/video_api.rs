//! Integration tests for `/create_video/`.

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::{body_json, post_multipart};

use autoreel_core::artifact::ArtifactKind;

const SCRIPT: &[u8] = b"A quiet sunrise over the hills.\nThe city wakes up.\nCoffee steams.";

// ---------------------------------------------------------------------------
// Test: script upload is animated and encoded
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_video_without_voice() {
    let (app, ctx) = common::build_test_app();
    let response = post_multipart(
        app,
        "/create_video/",
        &[
            ("script_file", Some("morning.txt"), SCRIPT),
            ("style", None, b"minimal"),
            ("resolution", None, b"720p"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    let filename = json["filename"].as_str().unwrap();
    assert_eq!(json["video_path"], format!("/output/{filename}"));
    assert!(filename.starts_with("video_"));
    assert_eq!(json["duration"], 10.0);
    assert_eq!(json["size"], 6);
    assert!(json.get("size_bytes").is_none());

    assert_eq!(ctx.animation.submits.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.encoder.calls.load(Ordering::SeqCst), 1);
    assert!(ctx.encoder.last_audio.lock().unwrap().is_none());
    assert!(ctx.output_dir().join(filename).exists());
}

#[tokio::test]
async fn create_video_merges_existing_voice() {
    let (app, ctx) = common::build_test_app();
    let voice = ctx
        .store()
        .write(ArtifactKind::Voice, "narration", "female", "mp3", b"ID3audio")
        .await
        .unwrap();
    let voice_name = voice.file_name().unwrap().to_string_lossy().to_string();

    let response = post_multipart(
        app,
        "/create_video/",
        &[
            ("script_file", Some("morning.md"), SCRIPT),
            ("voice_file", None, voice_name.as_bytes()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let audio = ctx.encoder.last_audio.lock().unwrap().clone().unwrap();
    assert_eq!(audio.file_name(), voice.file_name());
}

// ---------------------------------------------------------------------------
// Test: failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn encoder_failure_surfaces_diagnostics() {
    let (app, ctx) = common::build_test_app_with_encoder(Some("Unknown encoder 'libx265'"));
    let response = post_multipart(
        app,
        "/create_video/",
        &[("script_file", Some("morning.txt"), SCRIPT)],
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ENCODING_ERROR");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .contains("Unknown encoder 'libx265'"));
    assert_eq!(ctx.encoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn voice_file_traversal_is_rejected_before_animation() {
    let (app, ctx) = common::build_test_app();
    ctx.store().ensure_dir().await.unwrap();

    let response = post_multipart(
        app,
        "/create_video/",
        &[
            ("script_file", Some("morning.txt"), SCRIPT),
            ("voice_file", None, b"../../etc/passwd"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_PATH");
    assert_eq!(ctx.animation.submits.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.encoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_voice_file_is_not_found() {
    let (app, ctx) = common::build_test_app();
    ctx.store().ensure_dir().await.unwrap();

    let response = post_multipart(
        app,
        "/create_video/",
        &[
            ("script_file", Some("morning.txt"), SCRIPT),
            ("voice_file", None, b"voice_missing.mp3"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.animation.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_video_requires_script_file() {
    let (app, ctx) = common::build_test_app();
    let response = post_multipart(app, "/create_video/", &[("style", None, b"modern")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.animation.submits.load(Ordering::SeqCst), 0);
}
