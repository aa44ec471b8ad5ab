//! Amplitude reductions over the ranged band.
//!
//! The three simplest modules: maximum, mean, and total magnitude of the
//! window. They double as the reference implementations of the module
//! contract — one slot, one write per pass, nothing else.

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot, spectrum};

/// Largest magnitude in the window.
#[derive(Debug, Default)]
pub struct MaxAmplitude {
    slot: OutputSlot<f32>,
}

impl MaxAmplitude {
    /// Creates the module.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisModule for MaxAmplitude {
    fn name(&self) -> &'static str {
        "max-amplitude"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        self.slot.set(spectrum::band_max(view.band()));
    }
}

impl Feature for MaxAmplitude {
    type Output = f32;

    fn output(&self) -> Option<&f32> {
        self.slot.get()
    }
}

/// Mean magnitude of the window.
#[derive(Debug, Default)]
pub struct MeanAmplitude {
    slot: OutputSlot<f32>,
}

impl MeanAmplitude {
    /// Creates the module.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisModule for MeanAmplitude {
    fn name(&self) -> &'static str {
        "mean-amplitude"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        self.slot.set(spectrum::band_mean(view.band()));
    }
}

impl Feature for MeanAmplitude {
    type Output = f32;

    fn output(&self) -> Option<&f32> {
        self.slot.get()
    }
}

/// Sum of magnitudes in the window — the overall loudness of the band.
#[derive(Debug, Default)]
pub struct TotalAmplitude {
    slot: OutputSlot<f32>,
}

impl TotalAmplitude {
    /// Creates the module.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisModule for TotalAmplitude {
    fn name(&self) -> &'static str {
        "total-amplitude"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        self.slot.set(spectrum::band_sum(view.band()));
    }
}

impl Feature for TotalAmplitude {
    type Output = f32;

    fn output(&self) -> Option<&f32> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    fn view(sg: &Spectrogram) -> FrameView<'_> {
        FrameView::new(sg, 1, 6).unwrap()
    }

    fn sg() -> Spectrogram {
        let mut s = Spectrogram::new(8000.0, 16, 2).unwrap();
        s.push_frame(&[0.0, 1.0, 5.0, 2.0, 0.0, 0.0, 3.0, 0.0]).unwrap();
        s
    }

    #[test]
    fn fresh_modules_have_no_output() {
        assert!(MaxAmplitude::new().output().is_none());
        assert!(MeanAmplitude::new().output().is_none());
        assert!(TotalAmplitude::new().output().is_none());
    }

    #[test]
    fn reductions_over_the_ranged_band() {
        let s = sg();
        let v = view(&s);

        let mut max = MaxAmplitude::new();
        max.analyze(&v);
        assert_eq!(max.output(), Some(&5.0));

        let mut total = TotalAmplitude::new();
        total.analyze(&v);
        assert_eq!(total.output(), Some(&11.0));

        let mut mean = MeanAmplitude::new();
        mean.analyze(&v);
        assert!((mean.output().unwrap() - 11.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn silent_band_computes_zero_not_unset() {
        let mut s = Spectrogram::new(8000.0, 16, 2).unwrap();
        s.push_frame(&[0.0; 8]).unwrap();
        let v = FrameView::new(&s, 0, 7).unwrap();

        let mut max = MaxAmplitude::new();
        max.analyze(&v);
        assert_eq!(max.output(), Some(&0.0));
    }
}
