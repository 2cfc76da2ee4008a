use async_trait::async_trait;
use dotenv::dotenv;
use related_video::{
    Catalog, ContentItem, MemoryDom, PlayerControls, RecommendationFetcher, RelatedVideoConfig,
    RelatedVideoResult, RelatedVideoSession, SessionPorts, TokioScheduler, VideoRef,
    WordPressFetcher, content::POST_ID_FIELD,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Stand-in player that only logs what the session asks of it.
struct LoggingPlayer;

#[async_trait]
impl Catalog for LoggingPlayer {
    async fn get_video(&self, video_id: &str) -> RelatedVideoResult<VideoRef> {
        info!("Catalog lookup for {}", video_id);
        Ok(VideoRef::new(video_id))
    }
}

#[async_trait]
impl PlayerControls for LoggingPlayer {
    fn load(&self, video: &VideoRef) -> RelatedVideoResult<()> {
        info!("Loading video {}", video.id);
        Ok(())
    }

    async fn play(&self) -> RelatedVideoResult<()> {
        info!("Playing");
        Ok(())
    }

    fn hide_control_bar(&self) {
        info!("Control bar hidden");
    }

    fn show_control_bar(&self) {
        info!("Control bar shown");
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("related_video=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = RelatedVideoConfig::from_env()?;

    let post_id = env::args()
        .nth(1)
        .or_else(|| env::var("DEMO_POST_ID").ok())
        .ok_or("usage: related-video <wp-post-id> (or set DEMO_POST_ID)")?;

    let player = Arc::new(LoggingPlayer);
    let ports = SessionPorts {
        fetcher: Arc::new(RecommendationFetcher::new(Arc::new(
            WordPressFetcher::from_config(&config)?,
        ))),
        catalog: player.clone(),
        controls: player,
        render: Arc::new(MemoryDom::new()),
        scheduler: Arc::new(TokioScheduler),
    };

    // Long enough for the fetch to land, the countdown to run out and the advance to finish.
    let playback = Duration::from_secs(3);
    let wind_down = config.tick_interval * (config.countdown_seconds + 2);

    let (session, handle) = RelatedVideoSession::new(ports, config);
    let task = session.spawn();

    handle.metadata_loaded(ContentItem::new().with_field(POST_ID_FIELD, post_id));

    tokio::select! {
        _ = signal::ctrl_c() => {
            warn!("Interrupted, disposing session");
        }
        _ = async {
            tokio::time::sleep(playback).await;
            info!("Simulated playback finished");
            handle.playback_ended();
            tokio::time::sleep(wind_down).await;
        } => {}
    }

    handle.dispose();
    task.await?;

    Ok(())
}
