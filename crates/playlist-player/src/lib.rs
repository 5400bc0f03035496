//! Embeddable audio playlist player with a real-time frequency visualizer.
//!
//! The core is host-agnostic: a [`PlaybackController`] owns the current track and
//! reacts to [`PlayerEvent`]s, a [`VisualizerLoop`] renders bar-chart frames from a
//! lazily connected [`FrequencySampler`], and [`UiSync`] projects state onto the
//! player's controls. Hosts supply the capabilities in [`host`]; the browser host
//! lives in `web` (wasm32 only).

mod catalog;
mod config;
mod controller;
mod error;
pub mod host;
mod player;
mod sampler;
mod ui_sync;
mod visualizer;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use catalog::{truncate_chars, TrackCatalog, TrackRef};
pub use config::{IdleGlyph, PlayerConfig, Rgb, VisualizerConfig};
pub use controller::{OutputFlags, PlaybackController, PlaybackPhase, PlaybackState, PlaybackStatus};
pub use error::{PlayerError, Result};
pub use host::{
    AnalysisBackend, AnalysisGraph, ContextState, DrawSurface, EventSink, FrameHandle, FrameScheduler,
    HostCapabilities, MediaOutput, PlayerEvent,
};
pub use player::{mount, Mounted, EMPTY_PLAYLIST_MESSAGE};
pub use sampler::{FrequencyFrame, FrequencySampler};
pub use ui_sync::{active_rows, PlayAffordance, PlayerWidgets, UiSync};
pub use visualizer::{bar_color, render_bars, VisualizerLoop};
