use std::fmt;

use crate::catalog::{truncate_chars, TrackCatalog};
use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use crate::host::{EventSink, HostCapabilities, MediaOutput, PlayerEvent};
use crate::ui_sync::{PlayAffordance, UiSync};
use crate::visualizer::VisualizerLoop;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Playing,
    Paused,
    Finished,
}

/// Playback state, owned by the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
}

/// Output flags the status line is derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputFlags {
    pub paused: bool,
    pub current_time: f64,
    pub seeking: bool,
    pub waiting: bool,
}

impl OutputFlags {
    pub fn read(output: &dyn MediaOutput) -> Self {
        Self {
            paused: output.is_paused(),
            current_time: output.current_time(),
            seeking: output.is_seeking(),
            waiting: output.is_waiting(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Paused,
    Stopped,
    Loading,
    NowPlaying,
}

impl PlaybackStatus {
    pub fn derive(flags: OutputFlags) -> Self {
        if flags.paused && flags.current_time > 0.0 {
            Self::Paused
        } else if flags.paused {
            Self::Stopped
        } else if flags.seeking || flags.waiting {
            Self::Loading
        } else {
            Self::NowPlaying
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Loading => "Loading",
            Self::NowPlaying => "Now Playing",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Active,
    Disposed,
}

/// Owns the current track and keeps output, visualizer and controls in step.
pub struct PlaybackController {
    catalog: TrackCatalog,
    config: PlayerConfig,
    state: PlaybackState,
    phase: PlaybackPhase,
    output: Box<dyn MediaOutput>,
    ui: UiSync,
    visualizer: VisualizerLoop,
    lifecycle: Lifecycle,
}

impl PlaybackController {
    pub fn new(catalog: TrackCatalog, config: PlayerConfig, host: HostCapabilities) -> Result<Self> {
        if catalog.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        config.validate()?;

        let visualizer = VisualizerLoop::new(
            host.analysis,
            host.scheduler,
            host.surface,
            config.visualizer.clone(),
            config.fft_size,
        );
        Ok(Self {
            state: PlaybackState {
                current_index: 0,
                is_playing: false,
                current_time: 0.0,
                duration: None,
                volume: config.initial_volume,
            },
            phase: PlaybackPhase::Idle,
            catalog,
            config,
            output: host.output,
            ui: UiSync::new(host.widgets),
            visualizer,
            lifecycle: Lifecycle::Created,
        })
    }

    /// Subscribe to output and control events, build the track list and load the first track.
    /// Only the first call has any effect.
    pub fn initialize(&mut self, sink: EventSink) -> Result<()> {
        if self.lifecycle != Lifecycle::Created {
            return Ok(());
        }
        self.lifecycle = Lifecycle::Active;

        self.output.subscribe(sink.clone())?;
        self.ui.bind(sink.clone())?;
        self.visualizer.bind(sink);
        self.ui.populate(&self.catalog)?;

        self.output.set_volume(self.state.volume);
        self.ui.volume(self.state.volume);
        self.ui.affordance(PlayAffordance::Play);

        log::info!("Playlist player initialized with {} tracks", self.catalog.len());
        self.load_track(0);
        Ok(())
    }

    /// Stop the visualizer, release the analysis context and drop all subscriptions.
    /// Safe to call before `initialize` and more than once.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.lifecycle = Lifecycle::Disposed;
        self.visualizer.dispose();
        self.output.unsubscribe();
        self.ui.unbind();
        log::debug!("Playlist player disposed");
    }

    pub fn dispatch(&mut self, event: PlayerEvent) {
        if self.lifecycle != Lifecycle::Active {
            log::debug!("Ignoring {event:?}: player is not active");
            return;
        }

        match event {
            PlayerEvent::Ended => self.play_next(),
            PlayerEvent::Paused => self.on_paused(),
            PlayerEvent::Playing => self.on_playing(),
            PlayerEvent::Waiting => self.refresh_status(),
            PlayerEvent::TimeUpdate => {
                self.state.current_time = self.output.current_time();
                self.ui.seek_position(self.state.current_time);
            }
            PlayerEvent::MetadataLoaded => {
                self.state.duration = self.output.duration();
                self.ui.seek_range(self.state.duration.unwrap_or(0.0));
            }
            PlayerEvent::PlayRejected(reason) => self.on_play_rejected(&PlayerError::PlaybackRejected(reason)),
            PlayerEvent::AnimationFrame => self.visualizer.on_frame(),
            PlayerEvent::SeekChanged(seconds) => self.seek_to(seconds),
            PlayerEvent::VolumeChanged(volume) => self.set_volume(volume),
            PlayerEvent::PlayPauseClicked => self.toggle_play_pause(),
            PlayerEvent::TrackSelected(row) => self.load_track(row),
        }
    }

    /// Load and start track `index`; past the end the playlist is finished.
    pub fn load_track(&mut self, index: usize) {
        let Some(track) = self.catalog.get(index) else {
            self.phase = PlaybackPhase::Finished;
            self.state.is_playing = false;
            self.visualizer.stop();
            self.ui.status(&self.config.finished_message);
            log::info!("Playlist finished");
            return;
        };

        self.state.current_index = index;
        self.state.current_time = 0.0;
        self.state.duration = None;
        self.phase = PlaybackPhase::Loading;
        self.ui.seek_range(0.0);
        self.ui.seek_position(0.0);

        log::debug!("Loading track {index}: {}", track.url());
        self.output.set_source(track.url());
        // Hosts that answer later report a refusal as PlayRejected.
        if let Err(e) = self.output.play() {
            self.on_play_rejected(&e);
        }

        self.ui.highlight(self.state.current_index);
        self.refresh_status();
    }

    pub fn play_next(&mut self) {
        self.load_track(self.state.current_index + 1);
    }

    pub fn toggle_play_pause(&mut self) {
        if self.output.is_paused() {
            match self.output.play() {
                Ok(()) => self.ui.affordance(PlayAffordance::Pause),
                Err(e) => self.on_play_rejected(&e),
            }
        } else {
            self.output.pause();
            self.ui.affordance(PlayAffordance::Play);
        }
    }

    /// Non-finite positions are ignored.
    pub fn seek_to(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            log::debug!("Ignoring seek to {seconds}");
            return;
        }
        let seconds = seconds.max(0.0);
        self.output.set_current_time(seconds);
        self.state.current_time = seconds;
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            log::debug!("Ignoring volume {volume}");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(volume);
        self.state.volume = volume;
    }

    pub fn poll_output(&mut self) {
        if self.lifecycle == Lifecycle::Active {
            self.output.poll();
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn visualizer_running(&self) -> bool {
        self.visualizer.is_running()
    }

    /// `"{status}: {name}"`, or the finished message once the playlist is done.
    pub fn status_text(&self) -> String {
        if self.phase == PlaybackPhase::Finished {
            return self.config.finished_message.clone();
        }
        let name = self
            .catalog
            .get(self.state.current_index)
            .map(|track| track.display_name())
            .unwrap_or_default();
        let status = PlaybackStatus::derive(OutputFlags::read(self.output.as_ref()));
        format!("{status}: {}", truncate_chars(&name, self.config.status_name_chars))
    }

    fn refresh_status(&mut self) {
        let text = self.status_text();
        self.ui.status(&text);
    }

    fn on_playing(&mut self) {
        self.state.is_playing = true;
        self.phase = PlaybackPhase::Playing;
        self.visualizer.start();
        self.ui.affordance(PlayAffordance::Pause);
        self.refresh_status();
    }

    fn on_paused(&mut self) {
        self.state.is_playing = false;
        if self.phase != PlaybackPhase::Finished {
            self.phase = PlaybackPhase::Paused;
        }
        self.visualizer.stop();
        self.ui.affordance(PlayAffordance::Play);
        self.refresh_status();
    }

    // Soft failure: the track stays loaded and the user can retry from the button.
    fn on_play_rejected(&mut self, error: &PlayerError) {
        log::warn!("Playback blocked by host (user interaction required): {error}");
        self.state.is_playing = false;
        if self.phase != PlaybackPhase::Finished {
            self.phase = PlaybackPhase::Paused;
        }
        self.visualizer.stop();
        self.ui.affordance(PlayAffordance::Play);
        self.refresh_status();
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}
