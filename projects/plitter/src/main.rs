use anyhow::{Context, Result};
use plitter::cli::Args;
use plitter::{LitterTracker, MediaOutcome, ObjectDetector};
use tracing::info;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();
    let config = args.tracker_config();

    let detector = ObjectDetector::new(&args.model, config.detection.inference_size)
        .with_context(|| format!("Failed to load model: {}", args.model))?;
    let mut tracker = LitterTracker::new(detector, config);

    if args.input.is_dir() {
        let manifest = tracker.process_directory(&args.input)?;
        info!(
            "Detection complete. {} image record(s), {} video(s). Results saved to {}",
            manifest.images_processed,
            manifest.videos_processed,
            tracker.config().outputs.dir.display()
        );
        return Ok(());
    }

    tracker.config().outputs.ensure_dir()?;
    match tracker.load(&args.input)? {
        MediaOutcome::Image(Some(record)) => info!("Image result: {:?}", record),
        MediaOutcome::Image(None) => info!("No result for {}", args.input.display()),
        MediaOutcome::Video(frames) => {
            info!("Video processing done: {} sampled frame(s)", frames.len())
        }
    }

    Ok(())
}
