//! Salient frequency bins — locally dominant bins above a threshold.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot};

/// Absolute bin indices of the window's dominant bins.
///
/// A bin is salient when it is a strict local maximum and its magnitude
/// reaches the configured threshold. Up to `max_freqs` bins are reported,
/// strongest first; [`amplitudes`](Self::amplitudes) is the companion
/// sequence with the magnitude of each reported bin. Both buffers are sized
/// on first use and reused across passes.
#[derive(Debug)]
pub struct SalientFreqs {
    max_freqs: usize,
    threshold: f32,
    bins: Vec<usize>,
    amplitudes: Vec<f32>,
    scratch: Vec<(usize, f32)>,
    slot: OutputSlot<()>,
}

impl Default for SalientFreqs {
    fn default() -> Self {
        Self::new()
    }
}

impl SalientFreqs {
    /// Default number of bins reported.
    pub const DEFAULT_MAX_FREQS: usize = 3;

    /// Creates the module reporting up to three bins with no threshold.
    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_MAX_FREQS, 0.0)
    }

    /// Creates the module with an explicit bin cap and magnitude threshold.
    ///
    /// A cap of zero is clamped to one; a negative threshold to zero.
    pub fn with_limits(max_freqs: usize, threshold: f32) -> Self {
        Self {
            max_freqs: max_freqs.max(1),
            threshold: threshold.max(0.0),
            bins: Vec::new(),
            amplitudes: Vec::new(),
            scratch: Vec::new(),
            slot: OutputSlot::new(),
        }
    }

    /// Sets the magnitude threshold a bin must reach; clamped to >= 0.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    /// The configured magnitude threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Magnitudes of the reported bins, in the same order.
    pub fn amplitudes(&self) -> Option<&[f32]> {
        self.slot.is_set().then(|| self.amplitudes.as_slice())
    }
}

impl AnalysisModule for SalientFreqs {
    fn name(&self) -> &'static str {
        "salient-freqs"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let frame = view.full();
        self.scratch.clear();
        for bin in (view.low_bin() + 1)..view.high_bin() {
            let mag = frame[bin];
            if mag > frame[bin - 1] && mag > frame[bin + 1] && mag >= self.threshold && mag > 0.0
            {
                self.scratch.push((bin, mag));
            }
        }
        self.scratch
            .sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        self.scratch.truncate(self.max_freqs);

        self.bins.clear();
        self.amplitudes.clear();
        for &(bin, mag) in &self.scratch {
            self.bins.push(bin);
            self.amplitudes.push(mag);
        }
        self.slot.set(());
    }
}

impl Feature for SalientFreqs {
    type Output = [usize];

    fn output(&self) -> Option<&[usize]> {
        self.slot.is_set().then(|| self.bins.as_slice())
    }
}
