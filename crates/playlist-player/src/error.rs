//! Error types for the playlist player

use thiserror::Error;

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Playlist input is not a JSON list of URLs
    #[error("Failed to parse playlist: {0}")]
    PlaylistParse(#[from] serde_json::Error),

    /// A controller was requested for a playlist with no tracks
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The host refused to start playback (autoplay policy, unreadable source, ...)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The analysis graph could not be created or resumed
    #[error("Audio analysis unavailable: {0}")]
    Analysis(String),

    /// The per-frame scheduling primitive failed
    #[error("Frame scheduling failed: {0}")]
    Scheduler(String),

    /// Any other failure reported by the host environment
    #[error("Host error: {0}")]
    Host(String),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
