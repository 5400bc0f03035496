mod analysis;
mod app;
mod cli;
mod output;
mod surface;
mod widgets;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use crate::app::PlayerApp;
use crate::cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = cli.player_config()?;
    let playlist = cli.playlist_json()?;

    let width = config.visualizer.canvas_width as f32 + 80.0;
    let app = PlayerApp::new(playlist.as_deref(), config)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Audio Playlist Player")
            .with_inner_size([width, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Audio Playlist Player",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start native app: {e}"))
}
