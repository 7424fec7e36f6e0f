use std::sync::Arc;

use camsnap::{
    app_state::AppState,
    camera::{
        ffmpeg_source::FfmpegSource,
        pipeline::{FrameLogSink, FramePipeline},
        service::SnapshotCoordinator,
    },
    config::AppConfig,
    web,
};
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;

    tokio::fs::create_dir_all(&config.log_dir).await?;
    let file_appender = rolling::daily(&config.log_dir, "camsnap.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("camsnap=info,tower_http=info")),
        )
        .init();

    let mut pipeline = FramePipeline::new();
    pipeline.add_sink(FrameLogSink);

    let snapshots = SnapshotCoordinator::new(Arc::new(FfmpegSource::new()), Some(pipeline));
    let state = Arc::new(AppState::new(config.clone(), snapshots));
    let app = web::routes::build_router(state);

    info!(
        "camsnap listening on {} (input={})",
        config.bind_addr,
        config.snapshot.redacted().input_url
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
