mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use tokio_util::sync::CancellationToken;

use autoreel_core::error::StageError;
use autoreel_core::options::{ScriptLength, ScriptStyle};
use autoreel_pipeline::{Pipeline, PipelineRequest, StageKind};
use common::{AnimationBehaviour, Harness, MockAnimation, MockEncoder, MockPublisher};

fn request() -> PipelineRequest {
    PipelineRequest {
        topic: "daily motivation".into(),
        length: ScriptLength::Short,
        style: ScriptStyle::Educational,
        ..Default::default()
    }
}

#[tokio::test]
async fn full_run_hands_each_artifact_forward() {
    let h = Harness::new();
    let pipeline = Pipeline::new(h.stages());

    let report = pipeline
        .run(&request(), &CancellationToken::new())
        .await
        .unwrap();

    for artifact in [&report.script, &report.voice, &report.animation, &report.video] {
        assert!(artifact.path.exists(), "{} missing", artifact.path.display());
    }
    assert_eq!(report.published.video_id, "vid123");

    let job = h.encoder.last_job.lock().unwrap().clone().unwrap();
    assert_eq!(job.video, report.animation.path);
    assert_eq!(job.audio, Some(report.voice.path.clone()));

    let title = h.publisher.last_title.lock().unwrap().clone();
    assert_eq!(title.as_deref(), Some("daily motivation"));
}

#[tokio::test]
async fn empty_topic_aborts_at_script_stage() {
    let h = Harness::new();
    let pipeline = Pipeline::new(h.stages());
    let mut req = request();
    req.topic = "  ".into();

    let err = pipeline.run(&req, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.stage, StageKind::Script);
    assert_matches!(err.source, StageError::Validation(_));
    assert_eq!(h.synthesizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failure_stops_later_stages_and_keeps_earlier_artifacts() {
    let mut h = Harness::new();
    h.animation = MockAnimation::new(AnimationBehaviour::Fails("quota exceeded".into()));
    let pipeline = Pipeline::new(h.stages());

    let err = pipeline
        .run(&request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.stage, StageKind::Animation);
    assert!(err.to_string().starts_with("animation stage failed"));
    assert_eq!(h.encoder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);

    // Script and voice stay on disk for inspection.
    let names: Vec<String> = h
        .store()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(names.iter().any(|n| n.starts_with("script_")));
    assert!(names.iter().any(|n| n.starts_with("voice_")));
}

#[tokio::test]
async fn encoding_failure_names_video_edit_stage() {
    let mut h = Harness::new();
    h.encoder = MockEncoder::failing(234, "Invalid argument");
    let pipeline = Pipeline::new(h.stages());

    let err = pipeline
        .run(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage, StageKind::VideoEdit);
    assert_matches!(err.source, StageError::Encoding { exit_code: Some(234), .. });
    assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_upload_is_auth_failure_at_upload_stage() {
    let mut h = Harness::new();
    h.publisher = MockPublisher::rejecting();
    let pipeline = Pipeline::new(h.stages());

    let err = pipeline
        .run(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage, StageKind::Upload);
    assert_matches!(err.source, StageError::Auth(_));
}
