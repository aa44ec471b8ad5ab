//! Band-sliced magnitude sums.
//!
//! Splits the spectrum into contiguous slices at configured frequency edges
//! and reports the summed magnitude of each slice — a coarse, cheap
//! equalizer-style view of where the energy sits.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot};
use thiserror::Error;

/// Errors raised while configuring the slice edges.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BandConfigError {
    /// At least two edges are needed to form one slice.
    #[error("need at least 2 band edges to form a slice, got {0}")]
    TooFewEdges(usize),

    /// Edges must be finite, non-negative, and strictly ascending.
    #[error("band edges must be finite, non-negative and strictly ascending at index {0}")]
    NotAscending(usize),
}

/// Summed magnitude per configured frequency slice.
///
/// Slices are set with [`set_bands`](Self::set_bands); until then the module
/// has nothing to compute and its output stays unset. Each slice covers the
/// bins from its lower edge up to (not including) the next edge's bin, and
/// only bins inside the module's window contribute.
#[derive(Debug, Default)]
pub struct BreadSlicer {
    edges_hz: Vec<f32>,
    sums: Vec<f32>,
    slot: OutputSlot<()>,
}

impl BreadSlicer {
    /// Creates the module with no slices configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the module with slice edges already configured.
    pub fn with_bands(edges_hz: &[f32]) -> Result<Self, BandConfigError> {
        let mut module = Self::new();
        module.set_bands(edges_hz)?;
        Ok(module)
    }

    /// Configures the slice edges in Hz, e.g. `[0, 200, 500, 2000, 4000]`
    /// for four slices.
    ///
    /// Edges must be strictly ascending; on error the previous configuration
    /// is kept. Reconfiguring clears any previously computed output.
    pub fn set_bands(&mut self, edges_hz: &[f32]) -> Result<(), BandConfigError> {
        if edges_hz.len() < 2 {
            return Err(BandConfigError::TooFewEdges(edges_hz.len()));
        }
        for (i, window) in edges_hz.windows(2).enumerate() {
            let ok = window[0].is_finite()
                && window[1].is_finite()
                && window[0] >= 0.0
                && window[0] < window[1];
            if !ok {
                return Err(BandConfigError::NotAscending(i + 1));
            }
        }
        self.edges_hz.clear();
        self.edges_hz.extend_from_slice(edges_hz);
        self.sums.clear();
        self.sums.resize(edges_hz.len() - 1, 0.0);
        self.slot.clear();
        Ok(())
    }

    /// Number of configured slices.
    pub fn band_count(&self) -> usize {
        self.sums.len()
    }

    /// The configured edges in Hz.
    pub fn bands(&self) -> &[f32] {
        &self.edges_hz
    }
}

impl AnalysisModule for BreadSlicer {
    fn name(&self) -> &'static str {
        "bread-slicer"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        if self.edges_hz.is_empty() {
            return;
        }
        let frame = view.full();
        let sg = view.spectrogram();
        for (slice, window) in self.sums.iter_mut().zip(self.edges_hz.windows(2)) {
            let lo = view.bin_for_freq(window[0]).max(view.low_bin());
            // Upper edge is exclusive; the slice ends where the next begins.
            // Rounded without the nearest-bin clamp so a Nyquist edge still
            // covers the final bin.
            let edge = (window[1] * sg.fft_size() as f32 / sg.sample_rate()).round() as usize;
            let hi = edge.min(view.high_bin() + 1);
            *slice = if lo < hi {
                frame[lo..hi].iter().sum()
            } else {
                0.0
            };
        }
        self.slot.set(());
    }
}

impl Feature for BreadSlicer {
    type Output = [f32];

    fn output(&self) -> Option<&[f32]> {
        self.slot.is_set().then(|| self.sums.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    fn sg() -> Spectrogram {
        // bin width 500 Hz
        let mut s = Spectrogram::new(8000.0, 16, 2).unwrap();
        s.push_frame(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]).unwrap();
        s
    }

    #[test]
    fn edge_validation() {
        let mut module = BreadSlicer::new();
        assert_eq!(
            module.set_bands(&[100.0]),
            Err(BandConfigError::TooFewEdges(1))
        );
        assert_eq!(
            module.set_bands(&[0.0, 500.0, 400.0]),
            Err(BandConfigError::NotAscending(2))
        );
        assert_eq!(
            module.set_bands(&[-10.0, 500.0]),
            Err(BandConfigError::NotAscending(1))
        );
        // A failed call keeps the previous configuration.
        module.set_bands(&[0.0, 1000.0, 2000.0]).unwrap();
        assert!(module.set_bands(&[5.0, 1.0]).is_err());
        assert_eq!(module.bands(), &[0.0, 1000.0, 2000.0]);
    }

    #[test]
    fn unconfigured_module_produces_nothing() {
        let s = sg();
        let mut module = BreadSlicer::new();
        module.analyze(&FrameView::new(&s, 0, 7).unwrap());
        assert!(module.output().is_none());
    }

    #[test]
    fn slices_sum_their_bins() {
        let s = sg();
        // Edges at bins 0, 2, 4, 8 -> slices [0,1], [2,3], [4,7].
        let mut module = BreadSlicer::with_bands(&[0.0, 1000.0, 2000.0, 4000.0]).unwrap();
        module.analyze(&FrameView::new(&s, 0, 7).unwrap());
        assert_eq!(module.output().unwrap(), &[3.0, 12.0, 240.0]);
    }

    #[test]
    fn slices_respect_the_module_window() {
        let s = sg();
        let mut module = BreadSlicer::with_bands(&[0.0, 1000.0, 2000.0, 4000.0]).unwrap();
        // Window [2, 5] masks bins outside it.
        module.analyze(&FrameView::new(&s, 2, 5).unwrap());
        assert_eq!(module.output().unwrap(), &[0.0, 12.0, 48.0]);
    }
}
