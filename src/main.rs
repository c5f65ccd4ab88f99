//! Page Turner - headless player
//!
//! Loads a score from images, PDFs, media files or a package, then either
//! exports it as a package or plays it, logging each spread as it turns.
//! Playback starts when `--play` is given or autoplay is on in the settings.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use page_turner::core::{ObjectUrls, Session, ViewerSettings};
use page_turner::error::Result;
use page_turner::loading::{collect_inputs, LoadProgress, ScoreLoader};
use page_turner::logging::init_logging;
use page_turner::package::write_package;
use page_turner::playback::{
    start_playback, Layout, MediaError, MediaSink, PlaybackController, Spread,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turns sheet-music pages on a timer", long_about = None)]
struct Cli {
    /// Images, PDFs, an audio or video file, a package, or folders to scan
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the session to this package instead of playing it
    #[arg(short, long, value_name = "OUT.zip")]
    export: Option<PathBuf>,

    /// Seconds to show every page
    #[arg(short, long, value_name = "SECS")]
    interval: Option<i64>,

    /// Show one page at a time
    #[arg(long)]
    narrow: bool,

    /// Viewport width in pixels, compared against the configured breakpoint
    #[arg(long, value_name = "PX", conflicts_with = "narrow")]
    width: Option<u32>,

    /// Start playing even if autoplay is off in the settings
    #[arg(short, long)]
    play: bool,

    /// Log debug output to the terminal
    #[arg(short, long)]
    verbose: bool,
}

/// Stands in for a media element by logging what it is asked to do
struct LoggingMedia {
    name: Option<String>,
}

impl MediaSink for LoggingMedia {
    fn start(&mut self) -> std::result::Result<(), MediaError> {
        if let Some(name) = &self.name {
            log::info!("Media started: {}", name);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(name) = &self.name {
            log::info!("Media paused: {}", name);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = ViewerSettings::load();

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: &ViewerSettings) -> Result<()> {
    let inputs = collect_inputs(&cli.inputs)?;
    let score = ScoreLoader::new().load_with_progress(inputs, |progress| match progress {
        LoadProgress::Reading { file } => log::debug!("Reading {}", file),
        LoadProgress::Rasterizing {
            file,
            rendered,
            total,
        } => log::info!("Rendering {}: page {} of {}", file, rendered, total),
    })?;

    let mut session =
        Session::new(ObjectUrls::new()).with_default_interval(settings.default_interval_secs);
    score.adopt_into(&mut session);
    if let Some(seconds) = cli.interval {
        session.set_all_intervals(seconds);
    }

    if let Some(out) = &cli.export {
        write_package(session.snapshot(), out)?;
        println!("Exported {} pages to {}", session.page_count(), out.display());
        session.clear();
        return Ok(());
    }

    if session.is_empty() {
        log::warn!("Nothing to play: no pages were loaded");
        return Ok(());
    }

    let narrow = cli.narrow || cli.width.is_some_and(|w| settings.is_narrow(w));
    let layout = Layout::for_narrow(narrow);

    if !settings.should_autoplay(cli.play) {
        if let Some(label) = Spread::COVER.label(layout, session.page_count()) {
            log::info!("{}", label);
        }
        log::info!("Autoplay is off, pass --play to start playback");
        session.clear();
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut session = runtime.block_on(play(session, layout));
    session.clear();

    let (created, revoked) = session.urls().totals();
    log::debug!("Object URLs created: {}, revoked: {}", created, revoked);
    Ok(())
}

/// Play from the cover until the last spread is showing
async fn play(session: Session, layout: Layout) -> Session {
    let urls = session.urls().clone();
    let media = LoggingMedia {
        name: session.media().map(|m| m.name().to_string()),
    };
    let controller = PlaybackController::new(session, media);
    let (mut handle, task) = start_playback(controller, layout);

    let mut last_label = handle.snapshot().label;
    if let Some(label) = &last_label {
        log::info!("{}", label);
    }
    handle.play();

    // Follow the published state until playback stops or cannot advance
    while let Some(snapshot) = handle.changed().await {
        if snapshot.label != last_label {
            if let Some(label) = &snapshot.label {
                log::info!("{}", label);
            }
            last_label = snapshot.label.clone();
        }
        if !snapshot.playing || !snapshot.can_advance {
            break;
        }
    }

    handle.shutdown();
    match task.await {
        Ok(controller) => controller.into_session(),
        Err(e) => {
            // The session went down with the task; its handles cannot be revoked
            log::error!("Playback task failed: {}", e);
            log::warn!("{} object URLs leaked", urls.live_count());
            Session::new(urls)
        }
    }
}
