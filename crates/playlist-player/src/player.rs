use crate::catalog::TrackCatalog;
use crate::config::PlayerConfig;
use crate::controller::PlaybackController;
use crate::error::Result;
use crate::host::HostCapabilities;

pub const EMPTY_PLAYLIST_MESSAGE: &str = "No playlist URLs provided.";

/// Outcome of mounting a player from its playlist attribute.
pub enum Mounted {
    /// Nothing to play; only the message is shown and no controls exist.
    Placeholder(&'static str),
    Player(Box<PlaybackController>),
}

/// Parse the playlist and, if it has tracks, build the host controls with `build`
/// and construct the controller. `build` is not called for an empty playlist.
pub fn mount(
    raw_playlist: Option<&str>,
    config: PlayerConfig,
    build: impl FnOnce(&PlayerConfig) -> Result<HostCapabilities>,
) -> Result<Mounted> {
    let catalog = TrackCatalog::load(raw_playlist);
    if catalog.is_empty() {
        return Ok(Mounted::Placeholder(EMPTY_PLAYLIST_MESSAGE));
    }
    let host = build(&config)?;
    let controller = PlaybackController::new(catalog, config, host)?;
    Ok(Mounted::Player(Box::new(controller)))
}
