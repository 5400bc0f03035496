use crate::host::{AnalysisBackend, AnalysisGraph};

/// One snapshot of byte amplitudes per frequency bin.
///
/// Borrowed from the sampler, so it cannot be kept past the next sample.
#[derive(Clone, Copy, Debug)]
pub struct FrequencyFrame<'a> {
    pub bins: &'a [u8],
}

impl FrequencyFrame<'_> {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

enum Graph {
    Unconnected,
    Ready(Box<dyn AnalysisGraph>),
    Failed,
    Closed,
}

/// Lazily connected wrapper around the host's analyser.
///
/// The graph is created on first use only: creating an audio context before the
/// user has interacted with the page is refused by autoplay policies.
pub struct FrequencySampler {
    backend: Box<dyn AnalysisBackend>,
    graph: Graph,
    fft_size: usize,
    bins: Vec<u8>,
}

impl FrequencySampler {
    pub fn new(backend: Box<dyn AnalysisBackend>, fft_size: usize) -> Self {
        Self {
            backend,
            graph: Graph::Unconnected,
            fft_size,
            bins: vec![0u8; fft_size / 2],
        }
    }

    /// Connect the graph if this is the first call. Returns whether a graph is available.
    pub fn ensure_ready(&mut self) -> bool {
        if matches!(self.graph, Graph::Unconnected) {
            self.graph = match self.backend.connect(self.fft_size) {
                Ok(graph) => {
                    log::debug!("Analysis graph connected ({} bins)", graph.bin_count());
                    self.bins.resize(graph.bin_count(), 0);
                    Graph::Ready(graph)
                }
                Err(e) => {
                    log::error!("Audio analysis init failed: {e}");
                    Graph::Failed
                }
            };
        }
        self.is_connected()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.graph, Graph::Ready(_))
    }

    pub fn graph_mut(&mut self) -> Option<&mut dyn AnalysisGraph> {
        match &mut self.graph {
            Graph::Ready(graph) => Some(graph.as_mut()),
            _ => None,
        }
    }

    /// Zeros when nothing is connected.
    pub fn sample(&mut self) -> FrequencyFrame<'_> {
        match &mut self.graph {
            Graph::Ready(graph) => graph.fill_frequency_data(&mut self.bins),
            _ => self.bins.fill(0),
        }
        FrequencyFrame { bins: &self.bins }
    }

    /// Release the analysis context. Safe to call at any time.
    pub fn close(&mut self) {
        if let Graph::Ready(mut graph) = std::mem::replace(&mut self.graph, Graph::Closed) {
            graph.close();
            log::debug!("Analysis graph closed");
        }
    }
}
