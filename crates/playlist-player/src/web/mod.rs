//! Browser host: mounts the player into a custom element's shadow root.
//!
//! `www/audio-playlist-player.js` defines `<audio-playlist-player playlist='[...]'>`
//! and forwards its connected/disconnected callbacks to [`AudioPlaylistPlayer`].

mod analysis;
mod canvas;
mod listener;
mod logger;
mod markup;
mod media;
mod widgets;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlAudioElement, HtmlCanvasElement, HtmlElement, HtmlInputElement, ShadowRoot, ShadowRootInit, ShadowRootMode};

use crate::config::PlayerConfig;
use crate::controller::PlaybackController;
use crate::error::PlayerError;
use crate::host::{EventSink, HostCapabilities, PlayerEvent};
use crate::player::{mount, Mounted};

use self::analysis::WebAnalysisBackend;
use self::canvas::{CanvasSurface, RafScheduler};
use self::media::WebMediaOutput;
use self::widgets::DomWidgets;

impl From<PlayerError> for JsValue {
    fn from(error: PlayerError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

pub(crate) fn js_error(value: JsValue) -> PlayerError {
    PlayerError::Host(describe(&value))
}

/// Readable message for a thrown value or rejected promise.
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

// WASM entry point
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init();
}

/// One `<audio-playlist-player>` instance.
#[wasm_bindgen]
pub struct AudioPlaylistPlayer {
    host: HtmlElement,
    controller: Option<Rc<RefCell<PlaybackController>>>,
}

#[wasm_bindgen]
impl AudioPlaylistPlayer {
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement) -> Self {
        Self { host, controller: None }
    }

    /// Render into the shadow root and start the first track.
    pub fn connect(&mut self) -> Result<(), JsValue> {
        if self.controller.is_some() {
            return Ok(());
        }

        let root = match self.host.shadow_root() {
            Some(root) => root,
            None => self.host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?,
        };
        let config = PlayerConfig::load(self.host.get_attribute("config").as_deref());
        let playlist = self.host.get_attribute("playlist");

        let mounted = mount(playlist.as_deref(), config, |config| {
            root.set_inner_html(&markup::player(config));
            build_host(&root)
        })?;

        match mounted {
            Mounted::Placeholder(message) => {
                root.set_inner_html(&markup::placeholder(message));
            }
            Mounted::Player(controller) => {
                let controller = Rc::new(RefCell::new(*controller));
                let sink = event_sink(&controller);
                controller.borrow_mut().initialize(sink)?;
                self.controller = Some(controller);
            }
        }
        Ok(())
    }

    /// Stop the visualizer, drop every listener and close the audio context.
    pub fn disconnect(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.borrow_mut().dispose();
        }
    }
}

fn query<T: JsCast>(root: &ShadowRoot, selector: &str) -> crate::error::Result<T> {
    root.query_selector(selector)
        .map_err(js_error)?
        .ok_or_else(|| PlayerError::Host(format!("missing {selector} in player markup")))?
        .dyn_into::<T>()
        .map_err(|_| PlayerError::Host(format!("{selector} has an unexpected element type")))
}

fn build_host(root: &ShadowRoot) -> crate::error::Result<HostCapabilities> {
    let audio: HtmlAudioElement = query(root, "#audio-player")?;
    let canvas: HtmlCanvasElement = query(root, "#visualizer-canvas")?;
    let window = web_sys::window().ok_or_else(|| PlayerError::Host("no window".to_string()))?;

    let widgets = DomWidgets::new(
        query::<HtmlInputElement>(root, "#seek-slider")?,
        query::<HtmlInputElement>(root, "#volume-slider")?,
        query::<HtmlElement>(root, "#play-pause-btn")?,
        query::<HtmlElement>(root, "#current-track-info")?,
        query::<HtmlElement>(root, "#playlist-list")?,
    );

    Ok(HostCapabilities {
        output: Box::new(WebMediaOutput::new(audio.clone())),
        widgets: Box::new(widgets),
        analysis: Box::new(WebAnalysisBackend::new(audio)),
        scheduler: Box::new(RafScheduler::new(window)),
        surface: Box::new(CanvasSurface::new(canvas)?),
    })
}

fn event_sink(controller: &Rc<RefCell<PlaybackController>>) -> EventSink {
    let controller = Rc::downgrade(controller);
    Rc::new(move |event| deliver(&controller, event))
}

fn deliver(controller: &Weak<RefCell<PlaybackController>>, event: PlayerEvent) {
    let Some(strong) = controller.upgrade() else {
        return;
    };
    match strong.try_borrow_mut() {
        Ok(mut player) => player.dispatch(event),
        // Raised from inside a controller call; retry once the stack unwinds.
        Err(_) => {
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move { deliver(&controller, event) });
        }
    };
}
