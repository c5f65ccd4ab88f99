//! Asynchronous driver for the playback controller
//!
//! The runner owns the controller inside one tokio task. User intents and
//! media events arrive as [`PlaybackCommand`]s on a channel; the armed
//! countdown is a deadline the task sleeps towards. Both are handled by the
//! same loop, one at a time, so transitions never interleave. After every
//! step the deadline is recomputed from the controller's current countdown,
//! which is how a disarmed countdown is dropped before it can fire.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::controller::{PlaybackController, PlaybackStatus};
use super::media::{MediaEvent, MediaSink};
use super::spread::Layout;
use crate::core::{MediaFile, PageImage};

/// Intents and events accepted by the runner
#[derive(Debug)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Next,
    Prev,
    Reconfigure(Vec<u32>),
    SetInterval { index: usize, seconds: i64 },
    SetAllIntervals(i64),
    Load {
        pages: Vec<PageImage>,
        intervals: Option<Vec<u32>>,
        media: Option<MediaFile>,
    },
    Clear,
    SetLayout(Layout),
    Media(MediaEvent),
    Shutdown,
}

/// What the presentation needs to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub left_index: isize,
    pub playing: bool,
    pub page_count: usize,
    pub status: PlaybackStatus,
    pub layout: Layout,
    pub visible_pages: Vec<usize>,
    pub label: Option<String>,
    /// Seconds of the countdown currently armed, if any
    pub countdown_secs: Option<u32>,
    pub can_advance: bool,
    pub can_go_back: bool,
}

impl PlaybackSnapshot {
    fn of<M: MediaSink>(controller: &PlaybackController<M>, layout: Layout) -> Self {
        Self {
            left_index: controller.left_index(),
            playing: controller.is_playing(),
            page_count: controller.page_count(),
            status: controller.status(),
            layout,
            visible_pages: controller.visible_pages(layout).indices(),
            label: controller.label(layout),
            countdown_secs: controller.countdown().map(|c| c.seconds()),
            can_advance: controller.can_advance(),
            can_go_back: controller.can_go_back(),
        }
    }
}

/// Handle for controlling a running playback task
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<PlaybackCommand>,
    state: watch::Receiver<PlaybackSnapshot>,
}

impl PlaybackHandle {
    /// Queue a command; returns false if the runner has stopped
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn play(&self) -> bool {
        self.send(PlaybackCommand::Play)
    }

    pub fn pause(&self) -> bool {
        self.send(PlaybackCommand::Pause)
    }

    pub fn next(&self) -> bool {
        self.send(PlaybackCommand::Next)
    }

    pub fn prev(&self) -> bool {
        self.send(PlaybackCommand::Prev)
    }

    pub fn reconfigure(&self, intervals: Vec<u32>) -> bool {
        self.send(PlaybackCommand::Reconfigure(intervals))
    }

    pub fn media_event(&self, event: MediaEvent) -> bool {
        self.send(PlaybackCommand::Media(event))
    }

    pub fn shutdown(&self) -> bool {
        self.send(PlaybackCommand::Shutdown)
    }

    /// Latest published state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.borrow().clone()
    }

    /// Wait for the next published state; `None` once the runner is gone
    pub async fn changed(&mut self) -> Option<PlaybackSnapshot> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }
}

/// Countdown the runner is currently sleeping towards
#[derive(Debug, Clone, Copy)]
struct Armed {
    generation: u64,
    deadline: Instant,
}

struct PlaybackRunner<M: MediaSink> {
    controller: PlaybackController<M>,
    commands: mpsc::UnboundedReceiver<PlaybackCommand>,
    state: watch::Sender<PlaybackSnapshot>,
    layout: Layout,
    armed: Option<Armed>,
}

/// Start driving `controller` on the current tokio runtime
///
/// The join handle yields the controller back after shutdown, so the caller
/// can release its session.
pub fn start_playback<M>(
    controller: PlaybackController<M>,
    layout: Layout,
) -> (PlaybackHandle, JoinHandle<PlaybackController<M>>)
where
    M: MediaSink + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(PlaybackSnapshot::of(&controller, layout));

    let runner = PlaybackRunner {
        controller,
        commands: command_rx,
        state: state_tx,
        layout,
        armed: None,
    };
    let task = tokio::spawn(runner.run());

    (
        PlaybackHandle {
            commands: command_tx,
            state: state_rx,
        },
        task,
    )
}

impl<M: MediaSink> PlaybackRunner<M> {
    async fn run(mut self) -> PlaybackController<M> {
        log::debug!("Playback runner started");
        loop {
            // Pick up whatever the last step armed or disarmed before sleeping
            self.sync_deadline();
            self.publish();

            let deadline = self.armed.map(|a| a.deadline);
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    None | Some(PlaybackCommand::Shutdown) => break,
                    Some(command) => self.apply(command),
                },
                _ = wait_for(deadline) => {
                    // The controller rejects the expiry if it was re-armed meanwhile
                    if let Some(armed) = self.armed.take() {
                        self.controller.on_countdown_elapsed(armed.generation);
                    }
                }
            }
        }

        // Leave the media element stopped for whoever takes the controller back
        self.controller.pause();
        self.publish();
        log::debug!("Playback runner stopped");
        self.controller
    }

    fn apply(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::Play => {
                self.controller.play();
            }
            PlaybackCommand::Pause => self.controller.pause(),
            PlaybackCommand::Next => {
                self.controller.next();
            }
            PlaybackCommand::Prev => self.controller.prev(),
            PlaybackCommand::Reconfigure(intervals) => self.controller.reconfigure(intervals),
            PlaybackCommand::SetInterval { index, seconds } => {
                if index < self.controller.page_count() {
                    self.controller.set_interval(index, seconds);
                } else {
                    log::error!(
                        "Ignoring interval for page {} of {}",
                        index,
                        self.controller.page_count()
                    );
                }
            }
            PlaybackCommand::SetAllIntervals(seconds) => self.controller.set_all_intervals(seconds),
            PlaybackCommand::Load {
                pages,
                intervals,
                media,
            } => self.controller.load(pages, intervals, media),
            PlaybackCommand::Clear => self.controller.clear(),
            PlaybackCommand::SetLayout(layout) => self.layout = layout,
            PlaybackCommand::Media(event) => self.controller.on_media_event(event),
            PlaybackCommand::Shutdown => {}
        }
    }

    /// Follow the controller's countdown: keep the deadline of the same
    /// arming, start a new one for a new arming, drop it when disarmed
    fn sync_deadline(&mut self) {
        self.armed = match (self.controller.countdown(), self.armed) {
            (None, _) => None,
            (Some(countdown), Some(armed)) if armed.generation == countdown.generation() => {
                Some(armed)
            }
            (Some(countdown), _) => Some(Armed {
                generation: countdown.generation(),
                deadline: Instant::now() + countdown.duration(),
            }),
        };
    }

    fn publish(&self) {
        let snapshot = PlaybackSnapshot::of(&self.controller, self.layout);
        self.state.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
