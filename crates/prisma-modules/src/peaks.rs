//! Dominant spectral peaks of the window.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot};

/// One spectral peak: the bin's lower-edge frequency and its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Peak {
    /// Frequency of the peak's bin, in Hz.
    pub frequency: f32,
    /// Magnitude of the peak's bin.
    pub amplitude: f32,
}

/// The strongest local maxima of the window.
///
/// A peak is a bin strictly greater than both neighbors; the window's edge
/// bins have only one neighbor and never qualify. The output is sorted by
/// amplitude descending, ties broken by the lower frequency first, and never
/// exceeds the configured maximum count. Scratch storage is sized on first
/// use and reused across passes.
#[derive(Debug)]
pub struct MajorPeaks {
    max_peaks: usize,
    scratch: Vec<Peak>,
    peaks: Vec<Peak>,
    slot: OutputSlot<()>,
}

impl Default for MajorPeaks {
    fn default() -> Self {
        Self::new()
    }
}

impl MajorPeaks {
    /// Default number of peaks reported.
    pub const DEFAULT_MAX_PEAKS: usize = 4;

    /// Creates the module reporting up to
    /// [`DEFAULT_MAX_PEAKS`](Self::DEFAULT_MAX_PEAKS) peaks.
    pub fn new() -> Self {
        Self::with_max_peaks(Self::DEFAULT_MAX_PEAKS)
    }

    /// Creates the module reporting up to `max_peaks` peaks.
    ///
    /// A count of zero is clamped to one; a module that can never report
    /// anything is a configuration mistake, not a useful state.
    pub fn with_max_peaks(max_peaks: usize) -> Self {
        Self {
            max_peaks: max_peaks.max(1),
            scratch: Vec::new(),
            peaks: Vec::new(),
            slot: OutputSlot::new(),
        }
    }

    /// The configured maximum peak count.
    pub fn max_peaks(&self) -> usize {
        self.max_peaks
    }
}

impl AnalysisModule for MajorPeaks {
    fn name(&self) -> &'static str {
        "major-peaks"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let frame = view.full();
        self.scratch.clear();
        // Interior bins only: a window edge has no outer neighbor to beat.
        for bin in (view.low_bin() + 1)..view.high_bin() {
            if frame[bin] > frame[bin - 1] && frame[bin] > frame[bin + 1] {
                self.scratch.push(Peak {
                    frequency: view.freq_for_bin(bin),
                    amplitude: frame[bin],
                });
            }
        }
        self.scratch.sort_unstable_by(|a, b| {
            b.amplitude
                .total_cmp(&a.amplitude)
                .then(a.frequency.total_cmp(&b.frequency))
        });
        self.scratch.truncate(self.max_peaks);
        self.peaks.clear();
        self.peaks.extend_from_slice(&self.scratch);
        self.slot.set(());
    }
}

impl Feature for MajorPeaks {
    type Output = [Peak];

    fn output(&self) -> Option<&[Peak]> {
        self.slot.is_set().then(|| self.peaks.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    fn sg_from(frame: &[f32]) -> Spectrogram {
        let mut s = Spectrogram::new(8000.0, 32, 2).unwrap();
        s.push_frame(frame).unwrap();
        s
    }

    #[test]
    fn finds_local_maxima_sorted_by_amplitude() {
        // Peaks at bins 2 (5.0), 6 (3.0), 9 (8.0); bin width 250 Hz.
        let s = sg_from(&[
            0.0, 1.0, 5.0, 2.0, 0.0, 0.0, 3.0, 0.0, 1.0, 8.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let mut module = MajorPeaks::new();
        module.analyze(&FrameView::new(&s, 0, 15).unwrap());
        let peaks = module.output().unwrap();
        assert_eq!(peaks.len(), 3);
        assert_eq!(peaks[0], Peak { frequency: 2250.0, amplitude: 8.0 });
        assert_eq!(peaks[1], Peak { frequency: 500.0, amplitude: 5.0 });
        assert_eq!(peaks[2], Peak { frequency: 1500.0, amplitude: 3.0 });
    }

    #[test]
    fn equal_amplitudes_sort_by_lower_frequency() {
        let s = sg_from(&[
            0.0, 4.0, 0.0, 0.0, 4.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let mut module = MajorPeaks::new();
        module.analyze(&FrameView::new(&s, 0, 15).unwrap());
        let peaks = module.output().unwrap();
        let freqs: Vec<f32> = peaks.iter().map(|p| p.frequency).collect();
        assert_eq!(freqs, vec![250.0, 1000.0, 1750.0]);
    }

    #[test]
    fn count_is_capped() {
        let s = sg_from(&[
            0.0, 9.0, 0.0, 8.0, 0.0, 7.0, 0.0, 6.0, 0.0, 5.0, 0.0, 4.0, 0.0, 3.0, 0.0, 0.0,
        ]);
        let mut module = MajorPeaks::with_max_peaks(2);
        module.analyze(&FrameView::new(&s, 0, 15).unwrap());
        let peaks = module.output().unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].amplitude, 9.0);
        assert_eq!(peaks[1].amplitude, 8.0);
    }

    #[test]
    fn window_edges_never_qualify() {
        // Bin 2 is a peak of the full frame, but as the window's lower edge
        // it has no outer neighbor and is excluded.
        let s = sg_from(&[
            0.0, 1.0, 5.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let mut module = MajorPeaks::new();
        module.analyze(&FrameView::new(&s, 2, 7).unwrap());
        let peaks = module.output().unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].frequency, 1500.0);
    }

    #[test]
    fn flat_spectrum_reports_no_peaks_but_is_computed() {
        let s = sg_from(&[1.0; 16]);
        let mut module = MajorPeaks::new();
        assert!(module.output().is_none());
        module.analyze(&FrameView::new(&s, 0, 15).unwrap());
        assert_eq!(module.output().unwrap().len(), 0);
    }
}
