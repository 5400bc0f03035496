//! Byte frequency data for decoded rodio sources.
//!
//! [`Tap`] copies the mono mixdown of whatever the sink plays into a shared ring,
//! and [`SpectrumGraph`] turns the most recent `fft_size` samples into the same
//! 0..=255 bins a browser `AnalyserNode` reports: Blackman window, magnitude
//! scaled by `1/N`, temporal smoothing, then decibels mapped onto a byte range.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use playlist_player::{AnalysisBackend, AnalysisGraph, ContextState, PlayerError, Result};
use rodio::source::SeekError;
use rodio::Source;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const MAX_FFT_SIZE: usize = 32768;
const SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
// Mono samples buffered on the audio thread before taking the lock
const FLUSH_EVERY: usize = 512;

/// Recent mono samples, newest last.
#[derive(Clone, Default)]
pub struct SharedSamples(Arc<Mutex<VecDeque<f32>>>);

impl SharedSamples {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, samples: &[f32]) {
        if let Ok(mut ring) = self.0.lock() {
            ring.extend(samples.iter().copied());
            let excess = ring.len().saturating_sub(MAX_FFT_SIZE);
            ring.drain(..excess);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut ring) = self.0.lock() {
            ring.clear();
        }
    }

    /// Copy the newest `out.len()` samples into `out`, zero-padding at the front.
    fn latest(&self, out: &mut [f32]) {
        out.fill(0.0);
        if let Ok(ring) = self.0.lock() {
            let take = ring.len().min(out.len());
            let offset = out.len() - take;
            for (slot, sample) in out[offset..].iter_mut().zip(ring.iter().skip(ring.len() - take)) {
                *slot = *sample;
            }
        }
    }
}

/// Pass-through source that records a mono mixdown into [`SharedSamples`].
pub struct Tap<S> {
    inner: S,
    samples: SharedSamples,
    frame: Vec<f32>,
    pending: Vec<f32>,
}

impl<S> Tap<S>
where
    S: Source<Item = i16>,
{
    pub fn new(inner: S, samples: SharedSamples) -> Self {
        Self {
            inner,
            samples,
            frame: Vec::new(),
            pending: Vec::with_capacity(FLUSH_EVERY),
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.samples.push(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S> Iterator for Tap<S>
where
    S: Source<Item = i16>,
{
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };

        self.frame.push(f32::from(sample) / f32::from(i16::MAX));
        if self.frame.len() >= usize::from(self.inner.channels().max(1)) {
            let mono = self.frame.iter().sum::<f32>() / self.frame.len() as f32;
            self.frame.clear();
            self.pending.push(mono);
            if self.pending.len() >= FLUSH_EVERY {
                self.flush();
            }
        }
        Some(sample)
    }
}

impl<S> Source for Tap<S>
where
    S: Source<Item = i16>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> std::result::Result<(), SeekError> {
        self.frame.clear();
        self.pending.clear();
        self.samples.clear();
        self.inner.try_seek(pos)
    }
}

/// Connects spectrum analysers to the samples tapped from playback.
pub struct SpectrumBackend {
    samples: SharedSamples,
}

impl SpectrumBackend {
    pub fn new(samples: SharedSamples) -> Self {
        Self { samples }
    }
}

impl AnalysisBackend for SpectrumBackend {
    fn connect(&mut self, fft_size: usize) -> Result<Box<dyn AnalysisGraph>> {
        Ok(Box::new(SpectrumGraph::new(self.samples.clone(), fft_size)?))
    }
}

pub struct SpectrumGraph {
    samples: SharedSamples,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    state: ContextState,
}

impl SpectrumGraph {
    pub fn new(samples: SharedSamples, fft_size: usize) -> Result<Self> {
        if !fft_size.is_power_of_two() || !(32..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(PlayerError::Analysis(format!("unsupported FFT size {fft_size}")));
        }
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Ok(Self {
            samples,
            fft,
            window: blackman_window(fft_size),
            input: vec![0.0; fft_size],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            state: ContextState::Running,
        })
    }
}

impl AnalysisGraph for SpectrumGraph {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        if self.state == ContextState::Closed {
            return Err(PlayerError::Analysis("analyser is closed".to_string()));
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    fn fill_frequency_data(&mut self, bins: &mut [u8]) {
        if self.state == ContextState::Closed {
            bins.fill(0);
            return;
        }

        self.samples.latest(&mut self.input);
        for ((slot, sample), w) in self.buffer.iter_mut().zip(&self.input).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / self.input.len() as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
        }

        for (bin, magnitude) in bins.iter_mut().zip(&self.smoothed) {
            *bin = to_byte(*magnitude);
        }
    }

    fn close(&mut self) {
        self.state = ContextState::Closed;
        self.smoothed.fill(0.0);
    }
}

fn to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = (db - MIN_DECIBELS) * 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

fn blackman_window(size: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rodio::buffer::SamplesBuffer;

    fn tone(bin: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * std::f32::consts::PI * bin as f32 * n as f32 / len as f32).sin())
            .collect()
    }

    #[test]
    fn silence_yields_zero_bins() {
        let mut graph = SpectrumGraph::new(SharedSamples::new(), 256).unwrap();
        let mut bins = vec![7u8; graph.bin_count()];
        graph.fill_frequency_data(&mut bins);
        assert_eq!(graph.bin_count(), 128);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_in_its_bin() {
        let samples = SharedSamples::new();
        samples.push(&tone(16, 256));
        let mut graph = SpectrumGraph::new(samples, 256).unwrap();
        let mut bins = vec![0u8; 128];
        graph.fill_frequency_data(&mut bins);

        assert_eq!(bins[16], 255);
        assert_eq!(bins.iter().copied().max(), Some(bins[16]));
        assert_eq!(bins[60], 0);
        assert_eq!(bins[100], 0);
    }

    #[test]
    fn rejects_unsupported_sizes() {
        assert!(SpectrumGraph::new(SharedSamples::new(), 300).is_err());
        assert!(SpectrumGraph::new(SharedSamples::new(), 16).is_err());
        assert!(SpectrumGraph::new(SharedSamples::new(), 65536).is_err());
    }

    #[test]
    fn closed_graph_reports_silence() {
        let samples = SharedSamples::new();
        samples.push(&tone(8, 256));
        let mut graph = SpectrumGraph::new(samples, 256).unwrap();
        graph.close();
        let mut bins = vec![1u8; 128];
        graph.fill_frequency_data(&mut bins);
        assert_eq!(graph.state(), ContextState::Closed);
        assert!(bins.iter().all(|&b| b == 0));
        assert!(graph.resume().is_err());
    }

    #[test]
    fn ring_keeps_only_the_newest_samples() {
        let samples = SharedSamples::new();
        samples.push(&vec![0.5; MAX_FFT_SIZE]);
        samples.push(&[1.0, 2.0]);
        let mut out = [0.0; 3];
        samples.latest(&mut out);
        assert_eq!(out, [0.5, 1.0, 2.0]);
    }

    #[test]
    fn short_history_is_zero_padded() {
        let samples = SharedSamples::new();
        samples.push(&[0.25]);
        let mut out = [9.0; 4];
        samples.latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn tap_passes_samples_through_and_records_mono() {
        let samples = SharedSamples::new();
        let source = SamplesBuffer::new(2, 44_100, vec![i16::MAX, i16::MAX, 0, i16::MAX]);
        let played: Vec<i16> = Tap::new(source, samples.clone()).collect();
        assert_eq!(played, vec![i16::MAX, i16::MAX, 0, i16::MAX]);

        let mut out = [0.0; 2];
        samples.latest(&mut out);
        assert_eq!(out, [1.0, 0.5]);
    }

    proptest! {
        #[test]
        fn louder_never_maps_lower(a in 0.0f32..2.0, b in 0.0f32..2.0) {
            let (quiet, loud) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(to_byte(quiet) <= to_byte(loud));
        }
    }
}
