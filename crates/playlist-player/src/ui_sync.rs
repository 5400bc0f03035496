//! Projection of playback state onto the player's controls.

use crate::catalog::TrackCatalog;
use crate::error::Result;
use crate::host::EventSink;

/// What the play/pause button currently offers to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayAffordance {
    Play,
    Pause,
}

impl PlayAffordance {
    pub fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
        }
    }
}

/// The sub-controls one player instance owns.
pub trait PlayerWidgets {
    /// Register input listeners (seek, volume, button, rows) that forward into `sink`.
    fn bind(&mut self, sink: EventSink) -> Result<()>;
    fn unbind(&mut self);

    fn populate_tracks(&mut self, names: &[String]) -> Result<()>;
    fn set_row_active(&mut self, row: usize, active: bool);
    fn set_status(&mut self, text: &str);
    fn set_seek_position(&mut self, seconds: f64);
    fn set_seek_max(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_play_affordance(&mut self, affordance: PlayAffordance);
}

/// Row `i` is active iff it is the current track.
pub fn active_rows(current: usize, len: usize) -> impl Iterator<Item = bool> {
    (0..len).map(move |row| row == current)
}

pub struct UiSync {
    widgets: Box<dyn PlayerWidgets>,
    rows: usize,
}

impl UiSync {
    pub fn new(widgets: Box<dyn PlayerWidgets>) -> Self {
        Self { widgets, rows: 0 }
    }

    pub fn bind(&mut self, sink: EventSink) -> Result<()> {
        self.widgets.bind(sink)
    }

    pub fn unbind(&mut self) {
        self.widgets.unbind();
    }

    pub fn populate(&mut self, catalog: &TrackCatalog) -> Result<()> {
        let names = catalog.display_names();
        self.widgets.populate_tracks(&names)?;
        self.rows = names.len();
        Ok(())
    }

    // Full recompute; playlists are small.
    pub fn highlight(&mut self, current: usize) {
        for (row, active) in active_rows(current, self.rows).enumerate() {
            self.widgets.set_row_active(row, active);
        }
    }

    pub fn status(&mut self, text: &str) {
        self.widgets.set_status(text);
    }

    pub fn seek_position(&mut self, seconds: f64) {
        self.widgets.set_seek_position(seconds);
    }

    pub fn seek_range(&mut self, duration: f64) {
        self.widgets.set_seek_max(duration);
    }

    pub fn volume(&mut self, volume: f64) {
        self.widgets.set_volume(volume);
    }

    pub fn affordance(&mut self, affordance: PlayAffordance) {
        self.widgets.set_play_affordance(affordance);
    }
}
