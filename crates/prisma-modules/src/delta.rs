//! Per-bin amplitude change between the current and previous frame.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot, spectrum};

/// Absolute per-bin difference |curr − prev| over the window.
///
/// The output holds one value per bin of the window, in band order (index 0
/// is the window's lowest bin). When no previous frame exists yet the prior
/// spectrum is taken as silence, so the first frame reports its full
/// magnitudes as change. The backing buffer is sized on first use and
/// reused across passes.
#[derive(Debug, Default)]
pub struct DeltaAmplitudes {
    deltas: Vec<f32>,
    slot: OutputSlot<()>,
}

impl DeltaAmplitudes {
    /// Creates the module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total change over the window this pass, the band's spectral flux.
    pub fn total(&self) -> Option<f32> {
        self.slot.is_set().then(|| spectrum::band_sum(&self.deltas))
    }
}

impl AnalysisModule for DeltaAmplitudes {
    fn name(&self) -> &'static str {
        "delta-amplitudes"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let curr = view.band();
        let prev = view.band_at(1);
        self.deltas.clear();
        self.deltas.reserve(curr.len());
        for (k, &c) in curr.iter().enumerate() {
            let p = prev.map_or(0.0, |band| band[k]);
            self.deltas.push((c - p).abs());
        }
        self.slot.set(());
    }
}

impl Feature for DeltaAmplitudes {
    type Output = [f32];

    fn output(&self) -> Option<&[f32]> {
        self.slot.is_set().then(|| self.deltas.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    #[test]
    fn deltas_between_consecutive_frames() {
        let mut s = Spectrogram::new(8000.0, 16, 4).unwrap();
        s.push_frame(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        s.push_frame(&[0.0, 5.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();

        let mut module = DeltaAmplitudes::new();
        module.analyze(&FrameView::new(&s, 0, 3).unwrap());
        assert_eq!(module.output().unwrap(), &[1.0, 3.0, 0.0, 1.0]);
        assert_eq!(module.total(), Some(5.0));
    }

    #[test]
    fn first_frame_compares_against_silence() {
        let mut s = Spectrogram::new(8000.0, 16, 4).unwrap();
        s.push_frame(&[0.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();

        let mut module = DeltaAmplitudes::new();
        assert!(module.output().is_none());
        module.analyze(&FrameView::new(&s, 0, 3).unwrap());
        assert_eq!(module.output().unwrap(), &[0.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn output_tracks_the_window_not_the_frame() {
        let mut s = Spectrogram::new(8000.0, 16, 4).unwrap();
        s.push_frame(&[1.0; 8]).unwrap();
        s.push_frame(&[2.0; 8]).unwrap();

        let mut module = DeltaAmplitudes::new();
        module.analyze(&FrameView::new(&s, 2, 5).unwrap());
        assert_eq!(module.output().unwrap(), &[1.0, 1.0, 1.0, 1.0]);
    }
}
