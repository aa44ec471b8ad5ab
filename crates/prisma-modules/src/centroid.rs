//! Spectral centroid — the magnitude-weighted mean frequency of the band.
//!
//! A low centroid indicates dark, bass-heavy content; a high centroid
//! indicates bright content. The weighting uses each bin's center frequency
//! (lower edge plus half a bin width).

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot};

/// Center of mass of the band's magnitude spectrum, in Hz.
///
/// A silent band has no center of mass; the module degrades to 0.0, which
/// remains distinguishable from "never analyzed" (`output() == None`).
#[derive(Debug, Default)]
pub struct Centroid {
    slot: OutputSlot<f32>,
}

impl Centroid {
    /// Creates the module.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisModule for Centroid {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let half_bin = view.bin_width() / 2.0;
        let mut amp_sum = 0.0f32;
        let mut freq_amp_sum = 0.0f32;
        for (k, &amp) in view.band().iter().enumerate() {
            let center = view.freq_for_bin(view.low_bin() + k) + half_bin;
            amp_sum += amp;
            freq_amp_sum += center * amp;
        }
        let centroid = if amp_sum > 0.0 {
            freq_amp_sum / amp_sum
        } else {
            0.0
        };
        self.slot.set(centroid);
    }
}

impl Feature for Centroid {
    type Output = f32;

    fn output(&self) -> Option<&f32> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    #[test]
    fn weighted_mean_of_bin_centers() {
        let mut s = Spectrogram::new(8000.0, 16, 2).unwrap();
        s.push_frame(&[0.0, 1.0, 5.0, 2.0, 0.0, 0.0, 3.0, 0.0]).unwrap();
        let v = FrameView::new(&s, 1, 6).unwrap();

        let mut centroid = Centroid::new();
        centroid.analyze(&v);
        // Centers: 750, 1250, 1750, ..., 3250 Hz; weights 1, 5, 2, 0, 0, 3.
        let expected = (750.0 + 5.0 * 1250.0 + 2.0 * 1750.0 + 3.0 * 3250.0) / 11.0;
        let got = *centroid.output().unwrap();
        assert!((got - expected).abs() < 1e-3, "got {got}, want {expected}");
        // Pulled toward the dominant low bin, well below the band midpoint.
        assert!(got < 2000.0);
    }

    #[test]
    fn silence_degrades_to_zero() {
        let mut s = Spectrogram::new(8000.0, 16, 2).unwrap();
        s.push_frame(&[0.0; 8]).unwrap();
        let v = FrameView::new(&s, 0, 7).unwrap();

        let mut centroid = Centroid::new();
        assert!(centroid.output().is_none());
        centroid.analyze(&v);
        assert_eq!(centroid.output(), Some(&0.0));
    }
}
