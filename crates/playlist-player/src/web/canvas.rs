use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::js_error;
use crate::config::Rgb;
use crate::error::{PlayerError, Result};
use crate::host::{DrawSurface, EventSink, FrameHandle, FrameScheduler, PlayerEvent};

pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| PlayerError::Host("canvas has no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlayerError::Host("unexpected 2d context type".to_string()))?;
        Ok(Self { canvas, context })
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.context.set_fill_style_str(&color.css());
        self.context.fill_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, font: &str, x: f64, y: f64) {
        self.context.set_font(font);
        if let Err(e) = self.context.fill_text(text, x, y) {
            log::warn!("fillText failed: {}", super::describe(&e));
        }
    }
}

/// `requestAnimationFrame` driver; each callback becomes a [`PlayerEvent::AnimationFrame`].
pub(crate) struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    pub(crate) fn new(window: Window) -> Self {
        Self { window, callback: None }
    }
}

impl FrameScheduler for RafScheduler {
    fn bind(&mut self, sink: EventSink) {
        self.callback = Some(Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            sink(PlayerEvent::AnimationFrame);
        }));
    }

    fn unbind(&mut self) {
        self.callback = None;
    }

    fn request_frame(&mut self) -> Result<FrameHandle> {
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| PlayerError::Scheduler("frame scheduler is not bound".to_string()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| PlayerError::Scheduler(super::describe(&e)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {}", super::describe(&e));
        }
    }
}
