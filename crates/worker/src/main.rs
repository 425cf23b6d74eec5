//! Runs the whole content pipeline once from the command line.

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoreel_core::options::{
    Resolution, ScriptLength, ScriptStyle, VideoStyle, Visibility, VoiceSpeed, VoiceType,
};
use autoreel_pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineRequest};

/// Write, voice, animate, merge and publish a short video about a topic.
#[derive(Parser, Debug)]
#[command(name = "autoreel-worker", version, about)]
struct Cli {
    /// Topic of the video
    #[arg(short, long)]
    topic: String,

    /// Script length: short, medium or long
    #[arg(long, default_value = "medium")]
    length: String,

    /// Script tone: educational, entertaining, professional or casual
    #[arg(long, default_value = "educational")]
    style: String,

    /// Narrator voice: male, female or neutral
    #[arg(long, default_value = "female")]
    voice: String,

    /// Speaking speed: slow, normal, fast or a number
    #[arg(long, default_value = "normal")]
    speed: String,

    /// Visual style: modern, minimal, dynamic or elegant
    #[arg(long, default_value = "modern")]
    video_style: String,

    /// Output resolution: 720p, 1080p or 4k
    #[arg(long, default_value = "1080p")]
    resolution: String,

    /// Video title (defaults to the topic)
    #[arg(long)]
    title: Option<String>,

    /// Video description (defaults to the start of the script)
    #[arg(long)]
    description: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// public, unlisted or private
    #[arg(long, default_value = "private")]
    visibility: String,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn request(&self) -> PipelineRequest {
        PipelineRequest {
            topic: self.topic.clone(),
            length: ScriptLength::from_name(&self.length),
            style: ScriptStyle::from_name(&self.style),
            voice: VoiceType::from_name(&self.voice),
            speed: VoiceSpeed::from_name(&self.speed),
            video_style: VideoStyle::from_name(&self.video_style),
            resolution: Resolution::from_name(&self.resolution),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self
                .tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            visibility: Visibility::from_name(&self.visibility),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoreel_worker=info,autoreel_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::from_env();
    config.warn_missing_credentials();
    let pipeline = Pipeline::new(config.stages());
    if let Err(e) = pipeline.stages().store().ensure_dir().await {
        tracing::error!(error = %e, "Cannot prepare output directory");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received Ctrl-C, cancelling");
                cancel.cancel();
            }
        }
    });

    match pipeline.run(&cli.request(), &cancel).await {
        Ok(report) => {
            print_report(&report, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &PipelineReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialise report"),
        }
        return;
    }

    println!("script:    {}", report.script.path.display());
    println!("voice:     {}", report.voice.path.display());
    println!("animation: {}", report.animation.path.display());
    println!("video:     {}", report.video.path.display());
    println!("published: {}", report.published.url);
}
