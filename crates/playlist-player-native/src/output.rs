use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use playlist_player::{EventSink, MediaOutput, PlayerError, PlayerEvent, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::analysis::{SharedSamples, Tap};

/// Resolve a playlist URL to a local file. Only plain paths and `file://` URLs play natively.
pub fn local_path(url: &str) -> Result<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if url.contains("://") {
        return Err(PlayerError::PlaybackRejected(format!("{url}: only local files can be played")));
    }
    Ok(PathBuf::from(url))
}

/// rodio playback that reports the same lifecycle events as an `<audio>` element.
///
/// Events queue up during controller calls and go out on the next [`MediaOutput::poll`].
pub struct RodioOutput {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    samples: SharedSamples,
    events: Option<EventSink>,
    pending: Vec<PlayerEvent>,
    source: Option<String>,
    duration: Option<f64>,
    volume: f64,
    playing: bool,
    metadata_sent: bool,
    last_time: f64,
}

impl RodioOutput {
    pub fn new(samples: SharedSamples) -> Self {
        Self {
            stream: None,
            sink: None,
            samples,
            events: None,
            pending: Vec::new(),
            source: None,
            duration: None,
            volume: 1.0,
            playing: false,
            metadata_sent: false,
            last_time: 0.0,
        }
    }

    fn ensure_stream(&mut self) -> Result<&OutputStreamHandle> {
        if self.stream.is_none() {
            let stream = OutputStream::try_default()
                .map_err(|e| PlayerError::PlaybackRejected(format!("no audio output device: {e}")))?;
            self.stream = Some(stream);
        }
        match &self.stream {
            Some((_, handle)) => Ok(handle),
            None => Err(PlayerError::PlaybackRejected("no audio output device".to_string())),
        }
    }

    fn open(&mut self, url: &str) -> Result<Sink> {
        let path = local_path(url)?;
        let file = File::open(&path)
            .map_err(|e| PlayerError::PlaybackRejected(format!("{}: {e}", path.display())))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| PlayerError::PlaybackRejected(format!("{}: {e}", path.display())))?;
        self.duration = decoder.total_duration().map(|d| d.as_secs_f64());

        let volume = self.volume as f32;
        let tap = Tap::new(decoder, self.samples.clone());
        let handle = self.ensure_stream()?;
        let sink = Sink::try_new(handle).map_err(|e| PlayerError::PlaybackRejected(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(tap);
        Ok(sink)
    }

    fn emit(&mut self, event: PlayerEvent) {
        if self.events.is_some() {
            self.pending.push(event);
        }
    }
}

impl MediaOutput for RodioOutput {
    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        self.events = Some(sink);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.events = None;
        self.pending.clear();
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.playing = false;
    }

    fn set_source(&mut self, url: &str) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.samples.clear();
        self.source = Some(url.to_string());
        self.duration = None;
        self.playing = false;
        self.metadata_sent = false;
        self.last_time = 0.0;
    }

    fn play(&mut self) -> Result<()> {
        if self.sink.is_none() {
            let url = self
                .source
                .clone()
                .ok_or_else(|| PlayerError::PlaybackRejected("no source".to_string()))?;
            self.sink = Some(self.open(&url)?);
        }
        if let Some(sink) = &self.sink {
            if sink.empty() {
                return Err(PlayerError::PlaybackRejected("track already finished".to_string()));
            }
            sink.play();
        }
        if !self.playing {
            self.playing = true;
            self.emit(PlayerEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        if self.playing {
            self.playing = false;
            self.emit(PlayerEvent::Paused);
        }
    }

    fn current_time(&self) -> f64 {
        self.sink.as_ref().map_or(0.0, |sink| sink.get_pos().as_secs_f64())
    }

    fn set_current_time(&mut self, seconds: f64) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds.max(0.0))) {
            log::warn!("Seek to {seconds:.1}s failed: {e}");
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume as f32);
        }
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn is_seeking(&self) -> bool {
        false
    }

    fn is_waiting(&self) -> bool {
        false
    }

    fn poll(&mut self) {
        if let Some(sink) = &self.sink {
            if !self.metadata_sent {
                self.metadata_sent = true;
                self.pending.push(PlayerEvent::MetadataLoaded);
            }

            let time = sink.get_pos().as_secs_f64();
            if self.playing && time != self.last_time {
                self.last_time = time;
                self.pending.push(PlayerEvent::TimeUpdate);
            }

            if self.playing && sink.empty() {
                self.playing = false;
                self.pending.push(PlayerEvent::Paused);
                self.pending.push(PlayerEvent::Ended);
            }
        }

        let Some(events) = self.events.clone() else {
            self.pending.clear();
            return;
        };
        for event in self.pending.drain(..) {
            events(event);
        }
    }
}
