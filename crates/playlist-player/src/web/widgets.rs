use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, HtmlInputElement};

use super::js_error;
use super::listener::Listener;
use crate::error::{PlayerError, Result};
use crate::host::{EventSink, PlayerEvent};
use crate::ui_sync::{PlayAffordance, PlayerWidgets};

fn slider_value(event: &Event) -> Option<f64> {
    event
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value_as_number())
        .filter(|value| value.is_finite())
}

/// The shadow-root controls: seek and volume sliders, play button, status line and track list.
pub(crate) struct DomWidgets {
    seek: HtmlInputElement,
    volume: HtmlInputElement,
    button: HtmlElement,
    status: HtmlElement,
    list: HtmlElement,
    sink: Option<EventSink>,
    listeners: Vec<Listener>,
    rows: Vec<(HtmlElement, Listener)>,
}

impl DomWidgets {
    pub(crate) fn new(
        seek: HtmlInputElement,
        volume: HtmlInputElement,
        button: HtmlElement,
        status: HtmlElement,
        list: HtmlElement,
    ) -> Self {
        Self {
            seek,
            volume,
            button,
            status,
            list,
            sink: None,
            listeners: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn clear_rows(&mut self) {
        self.rows.clear();
        self.list.set_inner_html("");
    }
}

impl PlayerWidgets for DomWidgets {
    fn bind(&mut self, sink: EventSink) -> Result<()> {
        self.unbind();

        let on_seek = sink.clone();
        self.listeners.push(Listener::attach(&self.seek, "change", move |event| {
            if let Some(seconds) = slider_value(&event) {
                on_seek(PlayerEvent::SeekChanged(seconds));
            }
        })?);

        let on_volume = sink.clone();
        self.listeners.push(Listener::attach(&self.volume, "change", move |event| {
            if let Some(volume) = slider_value(&event) {
                on_volume(PlayerEvent::VolumeChanged(volume));
            }
        })?);

        let on_click = sink.clone();
        self.listeners.push(Listener::attach(&self.button, "click", move |_| {
            on_click(PlayerEvent::PlayPauseClicked);
        })?);

        self.sink = Some(sink);
        Ok(())
    }

    fn unbind(&mut self) {
        self.listeners.clear();
        self.rows.clear();
        self.sink = None;
    }

    fn populate_tracks(&mut self, names: &[String]) -> Result<()> {
        let sink = self.sink.clone().ok_or_else(|| PlayerError::Host("widgets are not bound".to_string()))?;
        let document = self
            .list
            .owner_document()
            .ok_or_else(|| PlayerError::Host("track list is detached".to_string()))?;

        self.clear_rows();
        for (index, name) in names.iter().enumerate() {
            let row = document
                .create_element("li")
                .map_err(js_error)?
                .dyn_into::<HtmlElement>()
                .map_err(|_| PlayerError::Host("li is not an HtmlElement".to_string()))?;
            row.set_text_content(Some(name.as_str()));
            self.list.append_child(&row).map_err(js_error)?;

            let on_select = sink.clone();
            let listener = Listener::attach(&row, "click", move |_| {
                on_select(PlayerEvent::TrackSelected(index));
            })?;
            self.rows.push((row, listener));
        }
        Ok(())
    }

    fn set_row_active(&mut self, row: usize, active: bool) {
        if let Some((element, _)) = self.rows.get(row) {
            if let Err(e) = element.class_list().toggle_with_force("active", active) {
                log::warn!("Failed to update row {row}: {}", super::describe(&e));
            }
        }
    }

    fn set_status(&mut self, text: &str) {
        self.status.set_text_content(Some(text));
    }

    fn set_seek_position(&mut self, seconds: f64) {
        self.seek.set_value_as_number(seconds);
    }

    fn set_seek_max(&mut self, seconds: f64) {
        self.seek.set_max(&seconds.to_string());
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume.set_value_as_number(volume);
    }

    fn set_play_affordance(&mut self, affordance: PlayAffordance) {
        self.button.set_text_content(Some(affordance.label()));
    }
}
