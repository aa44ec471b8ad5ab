//! Percussive-transient detection.
//!
//! A window is flagged percussive when it is loud enough, changed enough
//! from the previous window, and noisy enough — three gates, each with its
//! own threshold. Raising any threshold makes detection strictly harder to
//! trigger; setting one to zero disables that gate. Restricting the module
//! to the upper frequencies usually improves accuracy: the low and mid bands
//! are cluttered with periodic content that masks transients.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot, spectrum};

/// Thresholded onset/transient detector.
///
/// The flag is `energy >= energy_threshold && flux >= flux_threshold &&
/// entropy >= entropy_threshold`, where energy is the band's summed
/// magnitude, flux the summed per-bin change against the previous window
/// (silence when no previous window exists), and entropy the band's
/// normalized spectral entropy in [0, 1].
#[derive(Debug)]
pub struct PercussionDetection {
    energy_threshold: f32,
    flux_threshold: f32,
    entropy_threshold: f32,
    slot: OutputSlot<bool>,
}

impl Default for PercussionDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl PercussionDetection {
    /// Creates the detector with moderate default thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(1.0, 0.5, 0.75)
    }

    /// Creates the detector with explicit thresholds, clamped like the
    /// individual setters.
    pub fn with_thresholds(energy: f32, flux: f32, entropy: f32) -> Self {
        let mut module = Self {
            energy_threshold: 0.0,
            flux_threshold: 0.0,
            entropy_threshold: 0.0,
            slot: OutputSlot::new(),
        };
        module.set_energy_threshold(energy);
        module.set_flux_threshold(flux);
        module.set_entropy_threshold(entropy);
        module
    }

    /// Minimum summed magnitude; clamped to >= 0. Zero disables the gate.
    pub fn set_energy_threshold(&mut self, threshold: f32) {
        self.energy_threshold = threshold.max(0.0);
    }

    /// Minimum summed change against the previous window; clamped to >= 0.
    pub fn set_flux_threshold(&mut self, threshold: f32) {
        self.flux_threshold = threshold.max(0.0);
    }

    /// Minimum normalized entropy; clamped into [0, 1].
    pub fn set_entropy_threshold(&mut self, threshold: f32) {
        self.entropy_threshold = threshold.clamp(0.0, 1.0);
    }

    /// Current energy threshold.
    pub fn energy_threshold(&self) -> f32 {
        self.energy_threshold
    }

    /// Current flux threshold.
    pub fn flux_threshold(&self) -> f32 {
        self.flux_threshold
    }

    /// Current entropy threshold.
    pub fn entropy_threshold(&self) -> f32 {
        self.entropy_threshold
    }
}

impl AnalysisModule for PercussionDetection {
    fn name(&self) -> &'static str {
        "percussion-detection"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let band = view.band();
        let energy = spectrum::band_sum(band);
        let flux = match view.band_at(1) {
            Some(prev) => spectrum::flux(band, prev),
            // No history: the whole band counts as change.
            None => energy,
        };
        let entropy = spectrum::normalized_entropy(band);

        let detected = energy >= self.energy_threshold
            && flux >= self.flux_threshold
            && entropy >= self.entropy_threshold;
        self.slot.set(detected);
    }
}

impl Feature for PercussionDetection {
    type Output = bool;

    fn output(&self) -> Option<&bool> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    /// Quiet tonal frame, then a loud noisy burst.
    fn sg_with_burst() -> Spectrogram {
        let mut s = Spectrogram::new(8000.0, 16, 4).unwrap();
        s.push_frame(&[0.0, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        s.push_frame(&[4.0, 5.0, 4.5, 5.0, 4.0, 4.5, 5.0, 4.0]).unwrap();
        s
    }

    #[test]
    fn burst_after_quiet_is_percussive() {
        let s = sg_with_burst();
        let mut module = PercussionDetection::with_thresholds(10.0, 10.0, 0.7);
        assert!(module.output().is_none());
        module.analyze(&FrameView::new(&s, 0, 7).unwrap());
        assert_eq!(module.output(), Some(&true));
    }

    #[test]
    fn sustained_tone_is_not_percussive() {
        let mut s = Spectrogram::new(8000.0, 16, 4).unwrap();
        let tone = [0.0, 0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        s.push_frame(&tone).unwrap();
        s.push_frame(&tone).unwrap();

        let mut module = PercussionDetection::with_thresholds(1.0, 0.5, 0.5);
        module.analyze(&FrameView::new(&s, 0, 7).unwrap());
        // Loud but neither changing nor noisy.
        assert_eq!(module.output(), Some(&false));
    }

    #[test]
    fn detection_is_monotone_in_each_threshold() {
        let s = sg_with_burst();
        let view = FrameView::new(&s, 0, 7).unwrap();

        let mut sensitive = PercussionDetection::with_thresholds(1.0, 1.0, 0.1);
        sensitive.analyze(&view);
        assert_eq!(sensitive.output(), Some(&true));

        // Raising any single threshold can only turn detections off.
        for thresholds in [
            (1e9, 1.0, 0.1),
            (1.0, 1e9, 0.1),
            (1.0, 1.0, 1.0),
        ] {
            let mut strict =
                PercussionDetection::with_thresholds(thresholds.0, thresholds.1, thresholds.2);
            strict.analyze(&view);
            assert_eq!(strict.output(), Some(&false), "thresholds {thresholds:?}");
        }
    }

    #[test]
    fn setters_clamp() {
        let mut module = PercussionDetection::new();
        module.set_energy_threshold(-3.0);
        module.set_flux_threshold(-1.0);
        module.set_entropy_threshold(7.0);
        assert_eq!(module.energy_threshold(), 0.0);
        assert_eq!(module.flux_threshold(), 0.0);
        assert_eq!(module.entropy_threshold(), 1.0);
    }
}
