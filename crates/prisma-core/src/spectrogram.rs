//! Rolling magnitude-spectrum history and Hz ↔ bin conversion.
//!
//! A [`Spectrogram`] is a bounded ring buffer of magnitude frames produced by
//! an external FFT front end. Frames carry `fft_size / 2` bins; bin `i`
//! covers the frequency `i * sample_rate / fft_size`. The spectrogram is the
//! single shared input of an analysis pass: one writer pushes frames between
//! passes, many modules read during a pass.
//!
//! [`SpectrogramBank`] owns every spectrogram a pipeline feeds and hands out
//! copyable [`SpectrogramId`] handles, so a [`ModuleGroup`](crate::ModuleGroup)
//! never holds references into front-end state. The single-writer/many-reader
//! discipline falls out of the borrow rules: pushing needs `&mut` access to
//! the bank, a group pass borrows it shared.

use crate::error::SpectrogramError;

/// Bounded ring buffer of magnitude-spectrum frames.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    sample_rate: f32,
    fft_size: usize,
    num_bins: usize,
    history: usize,
    /// Flat `history × num_bins` storage; frame slots are reused in place.
    buffer: Vec<f32>,
    /// Slot index of the most recent frame.
    cursor: usize,
    /// Total frames ever pushed; bounds `frame_at` before the ring is full.
    frames_pushed: u64,
}

impl Spectrogram {
    /// Creates a spectrogram for the given audio configuration.
    ///
    /// `fft_size` must be a power of two of at least 2; frames will carry
    /// `fft_size / 2` bins. A `history` of zero is permitted but such a
    /// spectrogram rejects every [`push_frame`](Self::push_frame).
    pub fn new(sample_rate: f32, fft_size: usize, history: usize) -> Result<Self, SpectrogramError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SpectrogramError::InvalidSampleRate(sample_rate));
        }
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(SpectrogramError::InvalidFftSize(fft_size));
        }
        let num_bins = fft_size / 2;
        Ok(Self {
            sample_rate,
            fft_size,
            num_bins,
            history,
            buffer: vec![0.0; history * num_bins],
            cursor: 0,
            frames_pushed: 0,
        })
    }

    /// Sample rate of the audio the frames were computed from, in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// FFT size the frames were computed with.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins per frame (`fft_size / 2`).
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Configured history depth in frames.
    pub fn history(&self) -> usize {
        self.history
    }

    /// Number of frames currently available to [`frame_at`](Self::frame_at).
    pub fn len(&self) -> usize {
        usize::try_from(self.frames_pushed).unwrap_or(usize::MAX).min(self.history)
    }

    /// True until the first frame has been pushed.
    pub fn is_empty(&self) -> bool {
        self.frames_pushed == 0 || self.history == 0
    }

    /// Frequency width of one bin, in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate / self.fft_size as f32
    }

    /// Highest representable frequency, in Hz.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    /// Appends a frame, evicting the oldest when the history is full.
    ///
    /// Fails only when the history depth is zero. The frame data itself is
    /// taken best-effort: short frames are zero-padded, long frames
    /// truncated, and negative or NaN magnitudes clamped to 0 — a malformed
    /// frame degrades, it does not error at the real-time boundary.
    pub fn push_frame(&mut self, magnitudes: &[f32]) -> Result<(), SpectrogramError> {
        if self.history == 0 {
            return Err(SpectrogramError::ZeroHistory);
        }
        if self.frames_pushed > 0 {
            self.cursor = (self.cursor + 1) % self.history;
        }
        let start = self.cursor * self.num_bins;
        let slot = &mut self.buffer[start..start + self.num_bins];
        for (i, dst) in slot.iter_mut().enumerate() {
            // f32::max(NaN, 0.0) yields 0.0, which also scrubs NaN input.
            *dst = magnitudes.get(i).copied().unwrap_or(0.0).max(0.0);
        }
        self.frames_pushed += 1;
        Ok(())
    }

    /// Returns the frame `offset` steps behind the most recent (0 = current).
    pub fn frame_at(&self, offset: usize) -> Result<&[f32], SpectrogramError> {
        let available = self.len();
        if offset >= available {
            return Err(SpectrogramError::HistoryExhausted { offset, available });
        }
        let slot = (self.cursor + self.history - offset) % self.history;
        let start = slot * self.num_bins;
        Ok(&self.buffer[start..start + self.num_bins])
    }

    /// The most recent frame, if any has been pushed.
    pub fn current(&self) -> Option<&[f32]> {
        self.frame_at(0).ok()
    }

    /// The frame before the most recent, if available.
    pub fn previous(&self) -> Option<&[f32]> {
        self.frame_at(1).ok()
    }

    /// Nearest bin index for a frequency in Hz.
    ///
    /// Pure in the audio configuration; out-of-range input clamps to the
    /// nearest valid bin instead of failing.
    pub fn bin_for_freq(&self, hz: f32) -> usize {
        if !hz.is_finite() || hz <= 0.0 {
            return 0;
        }
        let bin = (hz * self.fft_size as f32 / self.sample_rate).round() as usize;
        bin.min(self.num_bins - 1)
    }

    /// Lower-edge frequency of a bin, in Hz. Out-of-range bins clamp.
    pub fn freq_for_bin(&self, bin: usize) -> f32 {
        bin.min(self.num_bins - 1) as f32 * self.bin_width()
    }

    /// Zeroes the buffer and resets the frame counter.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
        self.frames_pushed = 0;
    }
}

/// Handle to a spectrogram stored in a [`SpectrogramBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpectrogramId(pub(crate) usize);

/// Arena owning the spectrograms a pipeline analyzes.
///
/// The front end pushes frames through [`get_mut`](Self::get_mut) between
/// passes; [`ModuleGroup::run`](crate::ModuleGroup::run) borrows the bank
/// shared, so a pass can never observe a frame being written.
#[derive(Debug, Default)]
pub struct SpectrogramBank {
    slots: Vec<Spectrogram>,
}

impl SpectrogramBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a spectrogram into the bank, returning its handle.
    pub fn insert(&mut self, spectrogram: Spectrogram) -> SpectrogramId {
        self.slots.push(spectrogram);
        SpectrogramId(self.slots.len() - 1)
    }

    /// Shared access, e.g. for result inspection.
    pub fn get(&self, id: SpectrogramId) -> Option<&Spectrogram> {
        self.slots.get(id.0)
    }

    /// Exclusive access for the frame producer.
    pub fn get_mut(&mut self, id: SpectrogramId) -> Option<&mut Spectrogram> {
        self.slots.get_mut(id.0)
    }

    /// Number of spectrograms held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the bank holds no spectrograms.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
