use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, AudioContextState, HtmlAudioElement, MediaElementAudioSourceNode};

use super::{describe, js_error};
use crate::error::Result;
use crate::host::{AnalysisBackend, AnalysisGraph, ContextState};

/// Builds `<audio> -> AnalyserNode -> destination` on first use.
pub(crate) struct WebAnalysisBackend {
    element: HtmlAudioElement,
}

impl WebAnalysisBackend {
    pub(crate) fn new(element: HtmlAudioElement) -> Self {
        Self { element }
    }
}

impl AnalysisBackend for WebAnalysisBackend {
    fn connect(&mut self, fft_size: usize) -> Result<Box<dyn AnalysisGraph>> {
        let context = AudioContext::new().map_err(js_error)?;
        let analyser = context.create_analyser().map_err(js_error)?;
        analyser.set_fft_size(fft_size as u32);

        let source = context.create_media_element_source(&self.element).map_err(js_error)?;
        source.connect_with_audio_node(&analyser).map_err(js_error)?;
        analyser.connect_with_audio_node(&context.destination()).map_err(js_error)?;

        Ok(Box::new(WebAnalysisGraph {
            context,
            analyser,
            _source: source,
        }))
    }
}

struct WebAnalysisGraph {
    context: AudioContext,
    analyser: AnalyserNode,
    _source: MediaElementAudioSourceNode,
}

impl AnalysisGraph for WebAnalysisGraph {
    fn state(&self) -> ContextState {
        match self.context.state() {
            AudioContextState::Suspended => ContextState::Suspended,
            AudioContextState::Running => ContextState::Running,
            _ => ContextState::Closed,
        }
    }

    fn resume(&mut self) -> Result<()> {
        let promise = self.context.resume().map_err(js_error)?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::error!("AudioContext resume failed: {}", describe(&e));
            }
        });
        Ok(())
    }

    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn fill_frequency_data(&mut self, bins: &mut [u8]) {
        self.analyser.get_byte_frequency_data(bins);
    }

    fn close(&mut self) {
        match self.context.close() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("AudioContext close failed: {}", describe(&e));
                }
            }),
            Err(e) => log::warn!("AudioContext close failed: {}", describe(&e)),
        }
    }
}
