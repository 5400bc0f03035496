use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use super::listener::Listener;
use super::{describe, js_error};
use crate::error::Result;
use crate::host::{EventSink, MediaOutput, PlayerEvent};

// Media events forwarded to the controller
const LIFECYCLE: [(&str, PlayerEvent); 6] = [
    ("ended", PlayerEvent::Ended),
    ("pause", PlayerEvent::Paused),
    ("playing", PlayerEvent::Playing),
    ("waiting", PlayerEvent::Waiting),
    ("timeupdate", PlayerEvent::TimeUpdate),
    ("loadedmetadata", PlayerEvent::MetadataLoaded),
];

/// `<audio>` element inside the player's shadow root.
pub(crate) struct WebMediaOutput {
    element: HtmlAudioElement,
    // HTMLMediaElement has no buffering flag; track it from waiting/playing events.
    waiting: Rc<Cell<bool>>,
    sink: Option<EventSink>,
    listeners: Vec<Listener>,
}

impl WebMediaOutput {
    pub(crate) fn new(element: HtmlAudioElement) -> Self {
        Self {
            element,
            waiting: Rc::new(Cell::new(false)),
            sink: None,
            listeners: Vec::new(),
        }
    }
}

impl MediaOutput for WebMediaOutput {
    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        for (name, event) in LIFECYCLE {
            let sink = sink.clone();
            let waiting = self.waiting.clone();
            let listener = Listener::attach(&self.element, name, move |_| {
                match event {
                    PlayerEvent::Waiting => waiting.set(true),
                    PlayerEvent::Playing | PlayerEvent::Paused | PlayerEvent::Ended => waiting.set(false),
                    _ => {}
                }
                sink(event.clone());
            })?;
            self.listeners.push(listener);
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.listeners.clear();
        self.sink = None;
    }

    fn set_source(&mut self, url: &str) {
        self.waiting.set(false);
        self.element.set_src(url);
    }

    fn play(&mut self) -> Result<()> {
        let promise = self.element.play().map_err(js_error)?;
        let sink = self.sink.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                if let Some(sink) = sink {
                    sink(PlayerEvent::PlayRejected(describe(&e)));
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            log::warn!("pause() failed: {}", describe(&e));
        }
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.element.duration();
        duration.is_finite().then_some(duration)
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume.clamp(0.0, 1.0));
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn is_seeking(&self) -> bool {
        self.element.seeking()
    }

    fn is_waiting(&self) -> bool {
        self.waiting.get()
    }
}
