use fx_core::error::EffectError;
use fx_core::spectrum::{AudioBackend, SpectrumSource};
use wasm_bindgen::JsValue;
use web_sys as web;

const FFT_SIZE: u32 = 256;

fn unavailable(track: &str, e: JsValue) -> EffectError {
    EffectError::AudioUnavailable {
        track: track.to_string(),
        reason: format!("{:?}", e),
    }
}

/// Streams tracks through `<audio>` elements into an analyser on a shared
/// audio context.
pub struct WebAudioBackend {
    audio_ctx: web::AudioContext,
}

impl WebAudioBackend {
    pub fn new(audio_ctx: web::AudioContext) -> Self {
        Self { audio_ctx }
    }
}

impl AudioBackend for WebAudioBackend {
    fn open(&mut self, track: &str) -> Result<Box<dyn SpectrumSource>, EffectError> {
        _ = self.audio_ctx.resume();
        let element = web::HtmlAudioElement::new_with_src(track).map_err(|e| unavailable(track, e))?;
        element.set_loop(true);
        let source = self
            .audio_ctx
            .create_media_element_source(&element)
            .map_err(|e| unavailable(track, e))?;
        let analyser = self
            .audio_ctx
            .create_analyser()
            .map_err(|e| unavailable(track, e))?;
        analyser.set_fft_size(FFT_SIZE);
        source
            .connect_with_audio_node(&analyser)
            .map_err(|e| unavailable(track, e))?;
        analyser
            .connect_with_audio_node(&self.audio_ctx.destination())
            .map_err(|e| unavailable(track, e))?;
        // Playback starts asynchronously; the spectrum reads as silence until then.
        if let Err(e) = element.play() {
            log::warn!("[audio] play {} rejected: {:?}", track, e);
        }
        log::info!("[audio] streaming {}", track);
        Ok(Box::new(WebSpectrum {
            track: track.to_string(),
            element,
            source,
            analyser,
            stopped: false,
        }))
    }
}

struct WebSpectrum {
    track: String,
    element: web::HtmlAudioElement,
    source: web::MediaElementAudioSourceNode,
    analyser: web::AnalyserNode,
    stopped: bool,
}

impl SpectrumSource for WebSpectrum {
    fn is_playing(&self) -> bool {
        !self.stopped && !self.element.paused()
    }

    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn read_into(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        _ = self.element.pause();
        self.element.set_current_time(0.0);
        _ = self.source.disconnect();
        _ = self.analyser.disconnect();
        self.element.set_src("");
        log::info!("[audio] released {}", self.track);
    }
}

impl Drop for WebSpectrum {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background music that effects may pause through the presentation state.
pub struct AmbientMusic {
    element: Option<web::HtmlAudioElement>,
    requested: Option<bool>,
}

impl AmbientMusic {
    pub fn new(track: &str) -> Self {
        let element = match web::HtmlAudioElement::new_with_src(track) {
            Ok(el) => {
                el.set_loop(true);
                Some(el)
            }
            Err(e) => {
                log::error!("[audio] ambient element error: {:?}", e);
                None
            }
        };
        Self {
            element,
            requested: None,
        }
    }

    /// Follow the presentation state; only acts when it changes.
    pub fn sync(&mut self, playing: bool) {
        if self.requested == Some(playing) {
            return;
        }
        self.requested = Some(playing);
        self.apply();
    }

    /// Browsers refuse playback before the first user gesture, so clicks
    /// retry a pending play.
    pub fn retry(&mut self) {
        self.apply();
    }

    fn apply(&self) {
        let Some(el) = &self.element else {
            return;
        };
        match self.requested {
            Some(true) if el.paused() => {
                if let Err(e) = el.play() {
                    log::warn!("[audio] ambient play rejected: {:?}", e);
                }
            }
            Some(false) if !el.paused() => {
                _ = el.pause();
            }
            _ => {}
        }
    }
}
