use std::rc::Rc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use eframe::egui::{self, Color32, RichText};
use playlist_player::{
    mount, EventSink, HostCapabilities, Mounted, PlaybackController, PlayerConfig, PlayerEvent, Result,
};

use crate::analysis::{SharedSamples, SpectrumBackend};
use crate::output::RodioOutput;
use crate::surface::{FrameClock, PainterSurface};
use crate::widgets::SharedWidgets;

// Output polling interval while nothing is animating
const IDLE_REPAINT: Duration = Duration::from_millis(250);

struct Session {
    controller: PlaybackController,
    events: Receiver<PlayerEvent>,
    widgets: SharedWidgets,
    surface: PainterSurface,
    clock: FrameClock,
    aspect: f32,
}

impl Session {
    /// Run one host turn: poll the output, fire a due frame, then deliver everything queued.
    fn step(&mut self) {
        self.controller.poll_output();
        self.clock.tick();
        while let Ok(event) = self.events.try_recv() {
            self.controller.dispatch(event);
        }
    }

    fn draw(&self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, width * self.aspect), egui::Sense::hover());
        self.surface.replay(&ui.painter_at(rect), rect);

        let state = self.widgets.snapshot();
        ui.add_space(8.0);

        ui.label("Seek");
        let mut position = state.seek_position;
        let seek = ui.add(
            egui::Slider::new(&mut position, 0.0..=state.seek_max.max(0.0))
                .show_value(false),
        );
        if seek.drag_stopped() || (seek.changed() && !seek.dragged()) {
            self.widgets.emit(PlayerEvent::SeekChanged(position));
        }

        ui.label("Volume");
        let mut volume = state.volume;
        let volume_slider = ui.add(egui::Slider::new(&mut volume, 0.0..=1.0).step_by(0.01).show_value(false));
        if volume_slider.drag_stopped() || (volume_slider.changed() && !volume_slider.dragged()) {
            self.widgets.emit(PlayerEvent::VolumeChanged(volume));
        }

        let button = egui::Button::new(RichText::new(state.affordance.label()).strong());
        if ui.add_sized([ui.available_width(), 40.0], button).clicked() {
            self.widgets.emit(PlayerEvent::PlayPauseClicked);
        }

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&state.status).strong());
        });
        ui.separator();

        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
            for (index, (name, active)) in state.rows.iter().enumerate() {
                if ui.selectable_label(*active, name.as_str()).clicked() {
                    self.widgets.emit(PlayerEvent::TrackSelected(index));
                }
            }
        });
    }

    fn is_animating(&self) -> bool {
        self.clock.is_pending() || self.controller.state().is_playing
    }
}

fn channel_sink(tx: Sender<PlayerEvent>) -> EventSink {
    Rc::new(move |event: PlayerEvent| {
        if let Err(e) = tx.send(event) {
            log::debug!("Dropping {:?}: session is gone", e.into_inner());
        }
    })
}

enum View {
    Placeholder(&'static str),
    Player(Box<Session>),
}

pub struct PlayerApp {
    view: View,
}

impl PlayerApp {
    pub fn new(playlist: Option<&str>, config: PlayerConfig) -> Result<Self> {
        let samples = SharedSamples::new();
        let widgets = SharedWidgets::new();
        let clock = FrameClock::new();
        let visualizer = &config.visualizer;
        let surface = PainterSurface::new(visualizer.canvas_width, visualizer.canvas_height);
        let aspect = visualizer.canvas_height as f32 / visualizer.canvas_width as f32;

        let mounted = mount(playlist, config, |_| {
            Ok(HostCapabilities {
                output: Box::new(RodioOutput::new(samples.clone())),
                widgets: Box::new(widgets.clone()),
                analysis: Box::new(SpectrumBackend::new(samples.clone())),
                scheduler: Box::new(clock.clone()),
                surface: Box::new(surface.clone()),
            })
        })?;

        let view = match mounted {
            Mounted::Placeholder(message) => View::Placeholder(message),
            Mounted::Player(controller) => {
                let (tx, events) = channel::unbounded();
                let sink = channel_sink(tx);
                let mut session = Session {
                    controller: *controller,
                    events,
                    widgets,
                    surface,
                    clock,
                    aspect,
                };
                session.controller.initialize(sink)?;
                session.step();
                View::Player(Box::new(session))
            }
        };
        Ok(Self { view })
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.view {
            View::Placeholder(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.colored_label(Color32::GRAY, *message);
                });
            }
            View::Player(session) => {
                session.step();
                egui::CentralPanel::default().show(ctx, |ui| session.draw(ui));
                if session.is_animating() {
                    ctx.request_repaint();
                } else {
                    ctx.request_repaint_after(IDLE_REPAINT);
                }
            }
        }
    }
}
