//! Audio spectrum interface used by audio-reactive effects.
//!
//! Front-ends implement [`AudioBackend`] on top of whatever plays audio (a
//! WebAudio analyser in the browser, synthetic sines natively). Effects own a
//! [`SpectrumSampler`] for as long as they run; dropping it stops the stream.

use crate::error::EffectError;
use std::cell::Cell;
use std::rc::Rc;

/// A playing (or about to play) audio stream that can report its spectrum.
pub trait SpectrumSource {
    /// False until playback actually starts; the spectrum is stale until then.
    fn is_playing(&self) -> bool;
    fn bin_count(&self) -> usize;
    /// Fill `out` with per-bin magnitudes in `0..=255`.
    fn read_into(&mut self, out: &mut [u8]);
    /// Stop playback and release the underlying handles. Must be idempotent.
    fn stop(&mut self);
}

pub trait AudioBackend {
    /// Start streaming `track` and return a handle to its spectrum.
    fn open(&mut self, track: &str) -> Result<Box<dyn SpectrumSource>, EffectError>;
}

/// The current frame's magnitudes, one per frequency bin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectrumSnapshot {
    bins: Vec<u8>,
}

impl SpectrumSnapshot {
    pub fn zeroed(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count],
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn magnitudes(&self) -> &[u8] {
        &self.bins
    }

    /// Magnitude of `bin` mapped to `[0, 1]`; out-of-range bins read as silence.
    #[inline]
    pub fn normalized(&self, bin: usize) -> f32 {
        self.bins.get(bin).map_or(0.0, |&m| m as f32 / 255.0)
    }

    pub fn average(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.bins.iter().map(|&m| m as u32).sum();
        sum as f32 / (self.bins.len() as f32 * 255.0)
    }
}

/// Owns a spectrum source and refreshes a snapshot from it once per frame.
pub struct SpectrumSampler {
    source: Box<dyn SpectrumSource>,
    snapshot: SpectrumSnapshot,
    released: bool,
}

impl SpectrumSampler {
    pub fn new(source: Box<dyn SpectrumSource>) -> Self {
        let bins = source.bin_count();
        Self {
            source,
            snapshot: SpectrumSnapshot::zeroed(bins),
            released: false,
        }
    }

    pub fn refresh(&mut self) -> &SpectrumSnapshot {
        if self.released || !self.source.is_playing() {
            self.snapshot.bins.fill(0);
        } else {
            let bins = self.source.bin_count();
            if self.snapshot.bins.len() != bins {
                self.snapshot.bins.resize(bins, 0);
            }
            self.source.read_into(&mut self.snapshot.bins);
        }
        &self.snapshot
    }

    pub fn snapshot(&self) -> &SpectrumSnapshot {
        &self.snapshot
    }

    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.stop();
        }
    }
}

impl Drop for SpectrumSampler {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------- Host-side sources ----------------

/// Every bin reports the same magnitude. `value = 0` is silence.
pub struct ConstantSpectrum {
    value: u8,
    bins: usize,
    open_streams: Rc<Cell<usize>>,
    stopped: bool,
}

impl SpectrumSource for ConstantSpectrum {
    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn bin_count(&self) -> usize {
        self.bins
    }

    fn read_into(&mut self, out: &mut [u8]) {
        out.fill(self.value);
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.open_streams
                .set(self.open_streams.get().saturating_sub(1));
        }
    }
}

/// Backend whose streams all report a constant spectrum. Tracks how many
/// streams are still open.
#[derive(Clone, Debug)]
pub struct ConstantBackend {
    pub value: u8,
    pub bins: usize,
    open_streams: Rc<Cell<usize>>,
}

impl ConstantBackend {
    pub fn new(value: u8, bins: usize) -> Self {
        Self {
            value,
            bins,
            open_streams: Rc::new(Cell::new(0)),
        }
    }

    pub fn silent(bins: usize) -> Self {
        Self::new(0, bins)
    }

    pub fn open_streams(&self) -> usize {
        self.open_streams.get()
    }
}

impl AudioBackend for ConstantBackend {
    fn open(&mut self, _track: &str) -> Result<Box<dyn SpectrumSource>, EffectError> {
        self.open_streams.set(self.open_streams.get() + 1);
        Ok(Box::new(ConstantSpectrum {
            value: self.value,
            bins: self.bins,
            open_streams: self.open_streams.clone(),
            stopped: false,
        }))
    }
}

/// Drifting sines per bin, loosely shaped like music (louder lows).
pub struct SyntheticSpectrum {
    bins: usize,
    t: f32,
    playing: bool,
}

impl SyntheticSpectrum {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            t: 0.0,
            playing: true,
        }
    }
}

impl SpectrumSource for SyntheticSpectrum {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn bin_count(&self) -> usize {
        self.bins
    }

    fn read_into(&mut self, out: &mut [u8]) {
        self.t += crate::constants::REFERENCE_FRAME_DT;
        let n = out.len().max(1) as f32;
        for (i, m) in out.iter_mut().enumerate() {
            let x = i as f32 / n;
            let tilt = 1.0 - 0.7 * x;
            let beat = 0.5 + 0.5 * (self.t * 2.0 * std::f32::consts::PI * 1.8).sin();
            let ripple = 0.5 + 0.5 * (self.t * 3.1 + x * 9.0).sin();
            *m = ((0.6 * beat + 0.4 * ripple) * tilt * 255.0).clamp(0.0, 255.0) as u8;
        }
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SyntheticBackend {
    pub bins: usize,
}

impl AudioBackend for SyntheticBackend {
    fn open(&mut self, _track: &str) -> Result<Box<dyn SpectrumSource>, EffectError> {
        Ok(Box::new(SyntheticSpectrum::new(self.bins)))
    }
}

/// Backend for environments without audio output; every open fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAudio;

impl AudioBackend for NoAudio {
    fn open(&mut self, track: &str) -> Result<Box<dyn SpectrumSource>, EffectError> {
        Err(EffectError::AudioUnavailable {
            track: track.to_string(),
            reason: "no audio output".to_string(),
        })
    }
}
