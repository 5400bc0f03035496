use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{PlayerError, Result};

/// RGB color as painted by the visualizer. Parses from `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rounds and clamps each channel the way a CSS `rgb()` string is interpreted.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PlayerError::InvalidConfig(format!("not a #rrggbb color: {s}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| PlayerError::InvalidConfig(format!("not a #rrggbb color: {s}")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = PlayerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Text painted on the canvas while the visualizer is stopped
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IdleGlyph {
    pub text: String,
    pub font: String,
    pub x: f64,
    pub y: f64,
}

impl Default for IdleGlyph {
    fn default() -> Self {
        Self {
            text: "🎶".to_string(),
            font: "62px sans-serif".to_string(),
            x: 160.0,
            y: 60.0,
        }
    }
}

// Configuration for the bar visualizer
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Rgb,
    pub bar_width_factor: f64,
    pub bar_gap: f64,
    pub bar_blue: u8,
    pub idle_glyph: Option<IdleGlyph>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400,
            canvas_height: 80,
            background: Rgb::new(0xb9, 0xe1, 0x92),
            bar_width_factor: 2.5,
            bar_gap: 1.0,
            bar_blue: 20,
            idle_glyph: Some(IdleGlyph::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Analyser transform size; the visualizer draws `fft_size / 2` bars.
    pub fft_size: usize,
    /// Character budget for the track name in the status line.
    pub status_name_chars: usize,
    pub finished_message: String,
    pub initial_volume: f64,
    pub visualizer: VisualizerConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            status_name_chars: 13,
            finished_message: "Playlist Finished.".to_string(),
            initial_volume: 1.0,
            visualizer: VisualizerConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON object; missing keys keep their defaults.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`PlayerConfig::parse`] but falls back to defaults on any error.
    pub fn load(raw: Option<&str>) -> Self {
        match raw.map(Self::parse) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("Ignoring player config: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(PlayerError::InvalidConfig(format!(
                "fft_size must be a power of two between 32 and 32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlayerError::InvalidConfig(format!(
                "initial_volume must be within 0..=1, got {}",
                self.initial_volume
            )));
        }
        if self.visualizer.canvas_width == 0 || self.visualizer.canvas_height == 0 {
            return Err(PlayerError::InvalidConfig("canvas size must be non-zero".to_string()));
        }
        Ok(())
    }
}
