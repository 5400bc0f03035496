use std::cell::RefCell;
use std::rc::Rc;

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Vec2};
use playlist_player::{DrawSurface, EventSink, FrameHandle, FrameScheduler, PlayerError, PlayerEvent, Result, Rgb};

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Rect { x: f64, y: f64, width: f64, height: f64, color: Rgb },
    Text { text: String, size: f32, x: f64, y: f64 },
}

/// Pixel size of a CSS font shorthand such as `62px sans-serif`.
fn font_size(font: &str) -> f32 {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px")?.parse().ok())
        .unwrap_or(16.0)
}

fn color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

#[derive(Default)]
struct Canvas {
    width: f64,
    height: f64,
    paints: Vec<Paint>,
}

/// Canvas the visualizer draws into; replayed onto an egui painter every frame.
#[derive(Clone)]
pub struct PainterSurface {
    canvas: Rc<RefCell<Canvas>>,
}

impl PainterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Rc::new(RefCell::new(Canvas {
                width: f64::from(width),
                height: f64::from(height),
                paints: Vec::new(),
            })),
        }
    }

    pub fn paints(&self) -> Vec<Paint> {
        self.canvas.borrow().paints.clone()
    }

    /// Draw the retained canvas scaled into `rect`.
    pub fn replay(&self, painter: &Painter, rect: Rect) {
        let canvas = self.canvas.borrow();
        let scale = Vec2::new(
            rect.width() / canvas.width as f32,
            rect.height() / canvas.height as f32,
        );
        let at = |x: f64, y: f64| rect.min + Vec2::new(x as f32 * scale.x, y as f32 * scale.y);

        for paint in &canvas.paints {
            match paint {
                Paint::Rect { x, y, width, height, color } => {
                    let min = at(*x, *y);
                    let size = Vec2::new(*width as f32 * scale.x, *height as f32 * scale.y);
                    painter.rect_filled(Rect::from_min_size(min, size), 0.0, color32(*color));
                }
                Paint::Text { text, size, x, y } => {
                    let pos: Pos2 = at(*x, *y);
                    painter.text(pos, Align2::LEFT_BOTTOM, text, FontId::proportional(size * scale.y), Color32::BLACK);
                }
            }
        }
    }
}

impl DrawSurface for PainterSurface {
    fn size(&self) -> (f64, f64) {
        let canvas = self.canvas.borrow();
        (canvas.width, canvas.height)
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        let mut canvas = self.canvas.borrow_mut();
        // An opaque full-canvas fill hides everything painted before it.
        if x <= 0.0 && y <= 0.0 && width >= canvas.width && height >= canvas.height {
            canvas.paints.clear();
        }
        canvas.paints.push(Paint::Rect { x, y, width, height, color });
    }

    fn fill_text(&mut self, text: &str, font: &str, x: f64, y: f64) {
        self.canvas.borrow_mut().paints.push(Paint::Text {
            text: text.to_string(),
            size: font_size(font),
            x,
            y,
        });
    }
}

#[derive(Default)]
struct Clock {
    sink: Option<EventSink>,
    pending: Option<FrameHandle>,
    next_id: i32,
}

/// Frame scheduler driven by egui repaints: a requested frame fires on the next [`FrameClock::tick`].
#[derive(Clone, Default)]
pub struct FrameClock {
    clock: Rc<RefCell<Clock>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.clock.borrow().pending.is_some()
    }

    /// Deliver the pending frame, if any. Returns whether one fired.
    pub fn tick(&self) -> bool {
        let (fired, sink) = {
            let mut clock = self.clock.borrow_mut();
            (clock.pending.take(), clock.sink.clone())
        };
        match (fired, sink) {
            (Some(_), Some(sink)) => {
                sink(PlayerEvent::AnimationFrame);
                true
            }
            _ => false,
        }
    }
}

impl FrameScheduler for FrameClock {
    fn bind(&mut self, sink: EventSink) {
        self.clock.borrow_mut().sink = Some(sink);
    }

    fn unbind(&mut self) {
        let mut clock = self.clock.borrow_mut();
        clock.sink = None;
        clock.pending = None;
    }

    fn request_frame(&mut self) -> Result<FrameHandle> {
        let mut clock = self.clock.borrow_mut();
        if clock.sink.is_none() {
            return Err(PlayerError::Scheduler("frame clock is not bound".to_string()));
        }
        clock.next_id = clock.next_id.wrapping_add(1);
        let handle = FrameHandle(clock.next_id);
        clock.pending = Some(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut clock = self.clock.borrow_mut();
        if clock.pending == Some(handle) {
            clock.pending = None;
        }
    }
}
