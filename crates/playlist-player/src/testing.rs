//! In-memory host used by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use crate::config::Rgb;
use crate::error::{PlayerError, Result};
use crate::host::{
    AnalysisBackend, AnalysisGraph, ContextState, DrawSurface, EventSink, FrameHandle, FrameScheduler,
    HostCapabilities, MediaOutput,
};
use crate::ui_sync::{PlayAffordance, PlayerWidgets};

// ===== Logging =====

struct CaptureLogger;

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        RECORDS.with(|records| records.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Install the capturing logger and clear this thread's records.
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

pub fn logged(level: log::Level) -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}

// ===== Output =====

struct OutputLog {
    subscriptions: usize,
    sources: Vec<String>,
    play_calls: usize,
    pause_calls: usize,
    reject_play: bool,
    paused: bool,
    current_time: f64,
    duration: Option<f64>,
    volume: f64,
    seeking: bool,
    waiting: bool,
}

#[derive(Clone)]
pub struct FakeOutput(Rc<RefCell<OutputLog>>);

impl FakeOutput {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(OutputLog {
            subscriptions: 0,
            sources: Vec::new(),
            play_calls: 0,
            pause_calls: 0,
            reject_play: false,
            paused: true,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            seeking: false,
            waiting: false,
        })))
    }

    pub fn reject_play(&self, reject: bool) {
        self.0.borrow_mut().reject_play = reject;
    }

    pub fn set_paused(&self, paused: bool) {
        self.0.borrow_mut().paused = paused;
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.0.borrow_mut().duration = duration;
    }

    pub fn set_waiting(&self, waiting: bool) {
        self.0.borrow_mut().waiting = waiting;
    }

    pub fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    pub fn volume(&self) -> f64 {
        self.0.borrow().volume
    }

    pub fn sources(&self) -> Vec<String> {
        self.0.borrow().sources.clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.0.borrow().subscriptions
    }

    pub fn play_calls(&self) -> usize {
        self.0.borrow().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.0.borrow().pause_calls
    }
}

impl MediaOutput for FakeOutput {
    fn subscribe(&mut self, _sink: EventSink) -> Result<()> {
        self.0.borrow_mut().subscriptions += 1;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.0.borrow_mut().subscriptions = 0;
    }

    fn set_source(&mut self, url: &str) {
        let mut log = self.0.borrow_mut();
        log.sources.push(url.to_string());
        log.current_time = 0.0;
    }

    fn play(&mut self) -> Result<()> {
        let mut log = self.0.borrow_mut();
        log.play_calls += 1;
        if log.reject_play {
            return Err(PlayerError::PlaybackRejected("NotAllowedError".to_string()));
        }
        log.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.0.borrow_mut();
        log.pause_calls += 1;
        log.paused = true;
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.0.borrow().duration
    }

    fn volume(&self) -> f64 {
        self.0.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn is_seeking(&self) -> bool {
        self.0.borrow().seeking
    }

    fn is_waiting(&self) -> bool {
        self.0.borrow().waiting
    }
}

// ===== Widgets =====

#[derive(Default)]
struct WidgetLog {
    bindings: usize,
    populate_calls: usize,
    rows: Vec<(String, bool)>,
    status: String,
    seek_position: f64,
    seek_max: Option<f64>,
    volume: f64,
    affordance: Option<PlayAffordance>,
}

#[derive(Clone, Default)]
pub struct FakeWidgets(Rc<RefCell<WidgetLog>>);

impl FakeWidgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_rows(&self) -> Vec<usize> {
        self.0
            .borrow()
            .rows
            .iter()
            .enumerate()
            .filter(|(_, (_, active))| *active)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn row_names(&self) -> Vec<String> {
        self.0.borrow().rows.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn status(&self) -> String {
        self.0.borrow().status.clone()
    }

    pub fn seek_position(&self) -> f64 {
        self.0.borrow().seek_position
    }

    pub fn seek_max(&self) -> Option<f64> {
        self.0.borrow().seek_max
    }

    pub fn affordance(&self) -> Option<PlayAffordance> {
        self.0.borrow().affordance
    }

    pub fn bindings(&self) -> usize {
        self.0.borrow().bindings
    }

    pub fn populate_calls(&self) -> usize {
        self.0.borrow().populate_calls
    }
}

impl PlayerWidgets for FakeWidgets {
    fn bind(&mut self, _sink: EventSink) -> Result<()> {
        self.0.borrow_mut().bindings += 1;
        Ok(())
    }

    fn unbind(&mut self) {
        self.0.borrow_mut().bindings = 0;
    }

    fn populate_tracks(&mut self, names: &[String]) -> Result<()> {
        let mut log = self.0.borrow_mut();
        log.populate_calls += 1;
        log.rows = names.iter().map(|name| (name.clone(), false)).collect();
        Ok(())
    }

    fn set_row_active(&mut self, row: usize, active: bool) {
        if let Some(entry) = self.0.borrow_mut().rows.get_mut(row) {
            entry.1 = active;
        }
    }

    fn set_status(&mut self, text: &str) {
        self.0.borrow_mut().status = text.to_string();
    }

    fn set_seek_position(&mut self, seconds: f64) {
        self.0.borrow_mut().seek_position = seconds;
    }

    fn set_seek_max(&mut self, seconds: f64) {
        self.0.borrow_mut().seek_max = Some(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn set_play_affordance(&mut self, affordance: PlayAffordance) {
        self.0.borrow_mut().affordance = Some(affordance);
    }
}

// ===== Analysis =====

struct AnalysisLog {
    bin_count: usize,
    bins: Vec<u8>,
    connects: usize,
    fail_connect: bool,
    state: ContextState,
    resumes: usize,
    fail_resume: bool,
    closed: bool,
}

#[derive(Clone)]
pub struct FakeAnalysis(Rc<RefCell<AnalysisLog>>);

impl FakeAnalysis {
    pub fn new(bin_count: usize) -> Self {
        Self(Rc::new(RefCell::new(AnalysisLog {
            bin_count,
            bins: vec![0; bin_count],
            connects: 0,
            fail_connect: false,
            state: ContextState::Running,
            resumes: 0,
            fail_resume: false,
            closed: false,
        })))
    }

    pub fn set_bins(&self, bins: Vec<u8>) {
        self.0.borrow_mut().bins = bins;
    }

    pub fn set_state(&self, state: ContextState) {
        self.0.borrow_mut().state = state;
    }

    pub fn fail_connect(&self) {
        self.0.borrow_mut().fail_connect = true;
    }

    pub fn fail_resume(&self) {
        self.0.borrow_mut().fail_resume = true;
    }

    pub fn connects(&self) -> usize {
        self.0.borrow().connects
    }

    pub fn resumes(&self) -> usize {
        self.0.borrow().resumes
    }

    pub fn closed(&self) -> bool {
        self.0.borrow().closed
    }
}

impl AnalysisBackend for FakeAnalysis {
    fn connect(&mut self, _fft_size: usize) -> Result<Box<dyn AnalysisGraph>> {
        let mut log = self.0.borrow_mut();
        log.connects += 1;
        if log.fail_connect {
            return Err(PlayerError::Analysis("no audio context".to_string()));
        }
        Ok(Box::new(FakeGraph(self.0.clone())))
    }
}

struct FakeGraph(Rc<RefCell<AnalysisLog>>);

impl AnalysisGraph for FakeGraph {
    fn state(&self) -> ContextState {
        self.0.borrow().state
    }

    fn resume(&mut self) -> Result<()> {
        let mut log = self.0.borrow_mut();
        log.resumes += 1;
        if log.fail_resume {
            return Err(PlayerError::Analysis("resume refused".to_string()));
        }
        log.state = ContextState::Running;
        Ok(())
    }

    fn bin_count(&self) -> usize {
        self.0.borrow().bin_count
    }

    fn fill_frequency_data(&mut self, bins: &mut [u8]) {
        let log = self.0.borrow();
        bins.fill(0);
        for (out, value) in bins.iter_mut().zip(&log.bins) {
            *out = *value;
        }
    }

    fn close(&mut self) {
        let mut log = self.0.borrow_mut();
        log.closed = true;
        log.state = ContextState::Closed;
    }
}

// ===== Frames =====

#[derive(Default)]
struct SchedulerLog {
    next_id: i32,
    pending: Vec<FrameHandle>,
    requests: usize,
    cancels: usize,
    fail: bool,
}

#[derive(Clone, Default)]
pub struct FakeScheduler(Rc<RefCell<SchedulerLog>>);

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver every pending frame.
    pub fn fire(&self) {
        self.0.borrow_mut().pending.clear();
    }

    pub fn fail_requests(&self) {
        self.0.borrow_mut().fail = true;
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    pub fn requests(&self) -> usize {
        self.0.borrow().requests
    }

    pub fn cancels(&self) -> usize {
        self.0.borrow().cancels
    }
}

impl FrameScheduler for FakeScheduler {
    fn bind(&mut self, _sink: EventSink) {}

    fn unbind(&mut self) {}

    fn request_frame(&mut self) -> Result<FrameHandle> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err(PlayerError::Scheduler("no window".to_string()));
        }
        log.requests += 1;
        log.next_id += 1;
        let handle = FrameHandle(log.next_id);
        log.pending.push(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.0.borrow_mut();
        log.cancels += 1;
        log.pending.retain(|pending| *pending != handle);
    }
}

// ===== Surface =====

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Rect { x: f64, y: f64, width: f64, height: f64, color: Rgb },
    Text { text: String, font: String, x: f64, y: f64 },
}

struct SurfaceLog {
    width: f64,
    height: f64,
    paints: Vec<Paint>,
}

#[derive(Clone)]
pub struct FakeSurface(Rc<RefCell<SurfaceLog>>);

impl FakeSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self(Rc::new(RefCell::new(SurfaceLog {
            width,
            height,
            paints: Vec::new(),
        })))
    }

    pub fn paints(&self) -> Vec<Paint> {
        self.0.borrow().paints.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().paints.clear();
    }
}

impl DrawSurface for FakeSurface {
    fn size(&self) -> (f64, f64) {
        let log = self.0.borrow();
        (log.width, log.height)
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.0.borrow_mut().paints.push(Paint::Rect { x, y, width, height, color });
    }

    fn fill_text(&mut self, text: &str, font: &str, x: f64, y: f64) {
        self.0.borrow_mut().paints.push(Paint::Text {
            text: text.to_string(),
            font: font.to_string(),
            x,
            y,
        });
    }
}

// ===== Bundle =====

pub struct Fakes {
    pub output: FakeOutput,
    pub widgets: FakeWidgets,
    pub analysis: FakeAnalysis,
    pub scheduler: FakeScheduler,
    pub surface: FakeSurface,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            output: FakeOutput::new(),
            widgets: FakeWidgets::new(),
            analysis: FakeAnalysis::new(128),
            scheduler: FakeScheduler::new(),
            surface: FakeSurface::new(400.0, 80.0),
        }
    }

    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            output: Box::new(self.output.clone()),
            widgets: Box::new(self.widgets.clone()),
            analysis: Box::new(self.analysis.clone()),
            scheduler: Box::new(self.scheduler.clone()),
            surface: Box::new(self.surface.clone()),
        }
    }
}
