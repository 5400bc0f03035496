//! Capabilities the player borrows from its host environment.
//!
//! The browser build implements these over `HtmlAudioElement`, `AnalyserNode`,
//! `requestAnimationFrame` and a 2D canvas; the native build over rodio, rustfft
//! and egui. Everything here is single-threaded.

use std::rc::Rc;

use crate::config::Rgb;
use crate::error::Result;
use crate::ui_sync::PlayerWidgets;

/// Everything that can happen to a mounted player.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    // Media lifecycle
    Ended,
    Paused,
    Playing,
    Waiting,
    TimeUpdate,
    MetadataLoaded,
    /// The asynchronous play request was refused by the host.
    PlayRejected(String),

    // Per-frame callback
    AnimationFrame,

    // User input
    SeekChanged(f64),
    VolumeChanged(f64),
    PlayPauseClicked,
    TrackSelected(usize),
}

/// Delivery path from host callbacks back into the controller.
///
/// Hosts must not invoke it synchronously from inside a controller call.
pub type EventSink = Rc<dyn Fn(PlayerEvent)>;

/// Audio output element: source assignment, transport and lifecycle events.
pub trait MediaOutput {
    /// Register lifecycle listeners that forward into `sink`.
    fn subscribe(&mut self, sink: EventSink) -> Result<()>;
    fn unsubscribe(&mut self);

    fn set_source(&mut self, url: &str);
    /// Request playback. Hosts that resolve asynchronously return `Ok` and
    /// report a refusal later as [`PlayerEvent::PlayRejected`].
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// `None` until metadata is known or for unbounded streams.
    fn duration(&self) -> Option<f64>;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn is_paused(&self) -> bool;
    fn is_seeking(&self) -> bool;
    fn is_waiting(&self) -> bool;

    /// Hosts without push notifications turn output state into events here.
    fn poll(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// Creates the analysis graph (source -> analyser -> destination).
pub trait AnalysisBackend {
    fn connect(&mut self, fft_size: usize) -> Result<Box<dyn AnalysisGraph>>;
}

pub trait AnalysisGraph {
    fn state(&self) -> ContextState;
    /// Best effort; hosts may finish asynchronously and only log a failure.
    fn resume(&mut self) -> Result<()>;
    fn bin_count(&self) -> usize;
    fn fill_frequency_data(&mut self, bins: &mut [u8]);
    fn close(&mut self);
}

/// Opaque id of a pending frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

pub trait FrameScheduler {
    /// Frames are delivered as [`PlayerEvent::AnimationFrame`] through `sink`.
    fn bind(&mut self, sink: EventSink);
    fn unbind(&mut self);
    fn request_frame(&mut self) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// 2D drawing surface
pub trait DrawSurface {
    /// Width and height in pixels
    fn size(&self) -> (f64, f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);
    fn fill_text(&mut self, text: &str, font: &str, x: f64, y: f64);
}

/// The full set of host objects one player instance owns.
pub struct HostCapabilities {
    pub output: Box<dyn MediaOutput>,
    pub widgets: Box<dyn PlayerWidgets>,
    pub analysis: Box<dyn AnalysisBackend>,
    pub scheduler: Box<dyn FrameScheduler>,
    pub surface: Box<dyn DrawSurface>,
}
