use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playlist_player::PlayerConfig;

#[derive(Parser, Debug)]
#[command(name = "playlist-player", about = "Audio playlist player with a frequency visualizer")]
pub struct Cli {
    /// Audio files to queue, in order
    pub tracks: Vec<String>,

    /// Playlist as a JSON array of URLs; replaces positional tracks
    #[arg(short, long)]
    pub playlist: Option<String>,

    /// JSON player configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial volume (0.0-1.0)
    #[arg(long)]
    pub volume: Option<f64>,

    /// Analyser FFT size (power of two, 32-32768)
    #[arg(long)]
    pub fft_size: Option<usize>,
}

impl Cli {
    /// Playlist in the same JSON form the web component reads from its attribute.
    pub fn playlist_json(&self) -> Result<Option<String>> {
        if let Some(raw) = &self.playlist {
            return Ok(Some(raw.clone()));
        }
        if self.tracks.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&self.tracks)?))
    }

    pub fn player_config(&self) -> Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                PlayerConfig::parse(&raw).with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => PlayerConfig::default(),
        };

        if let Some(volume) = self.volume {
            config.initial_volume = volume;
        }
        if let Some(fft_size) = self.fft_size {
            config.fft_size = fft_size;
        }
        config.validate()?;
        Ok(config)
    }
}
