use std::cell::RefCell;
use std::rc::Rc;

use playlist_player::{EventSink, PlayAffordance, PlayerEvent, PlayerWidgets, Result};

/// What the egui controls show; written by the controller, read when drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetState {
    pub rows: Vec<(String, bool)>,
    pub status: String,
    pub seek_position: f64,
    pub seek_max: f64,
    pub volume: f64,
    pub affordance: PlayAffordance,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            status: "Ready to play...".to_string(),
            seek_position: 0.0,
            seek_max: 0.0,
            volume: 1.0,
            affordance: PlayAffordance::Play,
        }
    }
}

#[derive(Default)]
struct Shared {
    state: WidgetState,
    sink: Option<EventSink>,
}

#[derive(Clone, Default)]
pub struct SharedWidgets {
    shared: Rc<RefCell<Shared>>,
}

impl SharedWidgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> WidgetState {
        self.shared.borrow().state.clone()
    }

    /// Forward a user interaction; dropped while unbound.
    pub fn emit(&self, event: PlayerEvent) {
        let sink = self.shared.borrow().sink.clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    fn update(&self, f: impl FnOnce(&mut WidgetState)) {
        f(&mut self.shared.borrow_mut().state);
    }
}

impl PlayerWidgets for SharedWidgets {
    fn bind(&mut self, sink: EventSink) -> Result<()> {
        self.shared.borrow_mut().sink = Some(sink);
        Ok(())
    }

    fn unbind(&mut self) {
        self.shared.borrow_mut().sink = None;
    }

    fn populate_tracks(&mut self, names: &[String]) -> Result<()> {
        self.update(|state| state.rows = names.iter().map(|name| (name.clone(), false)).collect());
        Ok(())
    }

    fn set_row_active(&mut self, row: usize, active: bool) {
        self.update(|state| {
            if let Some((_, flag)) = state.rows.get_mut(row) {
                *flag = active;
            }
        });
    }

    fn set_status(&mut self, text: &str) {
        self.update(|state| state.status = text.to_string());
    }

    fn set_seek_position(&mut self, seconds: f64) {
        self.update(|state| state.seek_position = seconds);
    }

    fn set_seek_max(&mut self, seconds: f64) {
        self.update(|state| state.seek_max = seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.update(|state| state.volume = volume);
    }

    fn set_play_affordance(&mut self, affordance: PlayAffordance) {
        self.update(|state| state.affordance = affordance);
    }
}
