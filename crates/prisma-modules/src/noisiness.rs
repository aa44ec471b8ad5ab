//! Noise-likeness of the band, scored in [0, 1].
//!
//! 0 means a fully periodic band (all energy in one bin, e.g. a sine);
//! 1 means energy spread evenly across the band (white noise). Two metrics
//! are available: the normalized spectral entropy of the band treated as a
//! probability distribution (default), and spectral flatness (geometric over
//! arithmetic mean), which penalizes isolated silent bins harder.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot, spectrum};

/// Which noise-likeness score to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseMetric {
    /// Normalized Shannon entropy of the band.
    #[default]
    Entropy,
    /// Spectral flatness (geometric / arithmetic mean).
    Flatness,
}

/// Noise-likeness score of the window, always in [0, 1].
///
/// Silent or single-bin bands degrade to 0.0 (no spread to measure),
/// distinct from the unset state.
#[derive(Debug, Default)]
pub struct Noisiness {
    metric: NoiseMetric,
    slot: OutputSlot<f32>,
}

impl Noisiness {
    /// Creates the module with the default entropy metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the module with an explicit metric.
    pub fn with_metric(metric: NoiseMetric) -> Self {
        Self {
            metric,
            slot: OutputSlot::new(),
        }
    }

    /// The metric in use.
    pub fn metric(&self) -> NoiseMetric {
        self.metric
    }
}

impl AnalysisModule for Noisiness {
    fn name(&self) -> &'static str {
        "noisiness"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        let band = view.band();
        let score = match self.metric {
            NoiseMetric::Entropy => spectrum::normalized_entropy(band),
            NoiseMetric::Flatness => spectrum::spectral_flatness(band),
        };
        self.slot.set(score.clamp(0.0, 1.0));
    }
}

impl Feature for Noisiness {
    type Output = f32;

    fn output(&self) -> Option<&f32> {
        self.slot.get()
    }
}
