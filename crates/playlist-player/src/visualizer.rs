use crate::config::{Rgb, VisualizerConfig};
use crate::host::{AnalysisBackend, ContextState, DrawSurface, EventSink, FrameHandle, FrameScheduler};
use crate::sampler::FrequencySampler;

/// Bar color for bin `index` of `len`: red follows the bar height, green the bin position.
pub fn bar_color(index: usize, len: usize, bar_height: f64, blue: u8) -> Rgb {
    let position = if len == 0 { 0.0 } else { index as f64 / len as f64 };
    Rgb::from_channels(bar_height + 10.0 * position, 100.0 * position, f64::from(blue))
}

/// Paint one bar-chart frame: background, then one bar per bin anchored to the bottom.
pub fn render_bars(surface: &mut dyn DrawSurface, bins: &[u8], config: &VisualizerConfig) {
    let (width, height) = surface.size();
    surface.fill_rect(0.0, 0.0, width, height, config.background);
    if bins.is_empty() {
        return;
    }

    let bar_width = width / bins.len() as f64 * config.bar_width_factor;
    let mut x = 0.0;
    for (i, &amplitude) in bins.iter().enumerate() {
        let bar_height = f64::from(amplitude) / 255.0 * height;
        let color = bar_color(i, bins.len(), bar_height, config.bar_blue);
        surface.fill_rect(x, height - bar_height, bar_width, bar_height, color);
        x += bar_width + config.bar_gap;
    }
}

/// Per-frame render loop: Stopped -> Running -> Stopped.
///
/// Running iff a frame request is pending, so at most one request exists at a time.
pub struct VisualizerLoop {
    sampler: FrequencySampler,
    scheduler: Box<dyn FrameScheduler>,
    surface: Box<dyn DrawSurface>,
    config: VisualizerConfig,
    frame: Option<FrameHandle>,
}

impl VisualizerLoop {
    pub fn new(
        analysis: Box<dyn AnalysisBackend>,
        scheduler: Box<dyn FrameScheduler>,
        surface: Box<dyn DrawSurface>,
        config: VisualizerConfig,
        fft_size: usize,
    ) -> Self {
        Self {
            sampler: FrequencySampler::new(analysis, fft_size),
            scheduler,
            surface,
            config,
            frame: None,
        }
    }

    pub fn bind(&mut self, sink: EventSink) {
        self.scheduler.bind(sink);
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        if self.sampler.ensure_ready() {
            if let Some(graph) = self.sampler.graph_mut() {
                // Browsers keep the context suspended until the user interacts.
                if graph.state() == ContextState::Suspended {
                    if let Err(e) = graph.resume() {
                        log::error!("AudioContext resume failed: {e}");
                    }
                }
            }
        }

        self.schedule();
    }

    pub fn stop(&mut self) {
        let Some(handle) = self.frame.take() else {
            return;
        };
        self.scheduler.cancel_frame(handle);
        if let Some(glyph) = &self.config.idle_glyph {
            self.surface.fill_text(&glyph.text, &glyph.font, glyph.x, glyph.y);
        }
    }

    /// Frame callback. Ignored unless a frame is pending.
    ///
    /// The callback consumes the pending request. A duplicate delivery may leave that
    /// request live, so it is cancelled before the next one is made.
    pub fn on_frame(&mut self) {
        let Some(handle) = self.frame.take() else {
            return;
        };
        self.scheduler.cancel_frame(handle);
        let frame = self.sampler.sample();
        render_bars(self.surface.as_mut(), frame.bins, &self.config);
        self.schedule();
    }

    /// Stop and release the analysis context.
    pub fn dispose(&mut self) {
        self.stop();
        self.sampler.close();
        self.scheduler.unbind();
    }

    fn schedule(&mut self) {
        self.frame = match self.scheduler.request_frame() {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Visualizer stopped: {e}");
                None
            }
        };
    }
}
