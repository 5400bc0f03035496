use crate::config::PlayerConfig;
use crate::ui_sync::PlayAffordance;

const STYLE: &str = r#"
:host {
  display: block;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
  padding: 20px;
  max-width: 640px;
  margin: 0 auto 20px;
  box-shadow: 0 3px 10px rgba(0, 0, 0, 0.05);
  background-color: #029356;
  border-radius: 8px;
}
#custom-audio-player {
  width: 90%;
  text-align: center;
  padding: 15px;
  border-radius: 8px;
}
#visualizer-canvas {
  width: 100%;
  height: 120px;
  display: block;
  margin-bottom: 14px;
  border-radius: 4px;
}
#current-track-info {
  margin: 15px;
  font-weight: bold;
  white-space: nowrap;
  overflow: hidden;
  text-overflow: ellipsis;
}
#playlist-list {
  list-style: none;
  padding: 20px;
  max-height: 200px;
  overflow-y: auto;
  background: #b9e192;
  border-top: 1px solid #000;
  text-align: left;
}
#playlist-list li {
  padding: 10px;
  border-bottom: 1px solid #000;
  cursor: pointer;
  white-space: nowrap;
  overflow: hidden;
  text-overflow: ellipsis;
}
#playlist-list li:hover { background-color: #fff; }
#playlist-list li.active { background-color: #029356; font-weight: bold; }
#play-pause-btn {
  width: 100%;
  height: 60px;
  margin-top: 10px;
  border: none;
  border-radius: 5px;
  background-color: #b9e192;
  font-size: 120%;
  font-weight: bold;
  cursor: pointer;
}
#seek-slider, #volume-slider { width: 100%; margin-bottom: 10px; }
label { font-weight: bold; }
"#;

/// Shadow-root contents for a mounted player.
pub(crate) fn player(config: &PlayerConfig) -> String {
    let visualizer = &config.visualizer;
    format!(
        r#"<style>{STYLE}#visualizer-canvas {{ background-color: {background}; }}</style>
<div class="player-container">
  <div id="custom-audio-player">
    <canvas id="visualizer-canvas" width="{width}" height="{height}"></canvas>
    <label for="seek-slider">Seek</label>
    <input type="range" id="seek-slider" min="0" value="0">
    <audio id="audio-player" crossorigin="anonymous"></audio>
    <label for="volume-slider">Volume</label>
    <input type="range" id="volume-slider" min="0" max="1" step="0.01" value="{volume}">
    <button id="play-pause-btn">{label}</button>
    <div id="current-track-info">Ready to play...</div>
    <ul id="playlist-list"></ul>
  </div>
</div>"#,
        background = visualizer.background,
        width = visualizer.canvas_width,
        height = visualizer.canvas_height,
        volume = config.initial_volume,
        label = PlayAffordance::Play.label(),
    )
}

pub(crate) fn placeholder(message: &str) -> String {
    format!("<p>{message}</p>")
}
