//! Vowel-presence classification over recent spectral history.
//!
//! Each of the five vowels gets a spectro-temporal template synthesized from
//! its formant profile; every pass correlates the most recent frames against
//! all five and reports the best-scoring vowel. Unlike [`Formants`], which
//! classifies a single frame by peak matching, this module integrates over
//! several frames of history, which makes it steadier on sustained vowels.
//!
//! [`Formants`]: crate::Formants

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot, TemplateCorrelator};

use crate::formants::{FORMANT_TABLE, FormantProfile, VoiceRegister, Vowel};

/// Code returned when no template scores above the floor.
pub const NO_VOCAL: i32 = -1;

/// Per-rank amplitude of the synthesized formant bumps.
const FORMANT_WEIGHTS: [f32; 5] = [1.0, 0.85, 0.7, 0.55, 0.4];

/// Multi-class vowel detector over recent history.
///
/// The output is a classification code: 0–4 for a/e/i/o/u, [`NO_VOCAL`]
/// when nothing correlates convincingly — a degraded result, still distinct
/// from the unset state before the first pass.
///
/// Templates are built lazily for the audio configuration and window the
/// module first runs under, and rebuilt only if that configuration changes;
/// steady-state passes do not allocate.
#[derive(Debug)]
pub struct VocalDetection {
    register: VoiceRegister,
    history_frames: usize,
    min_score: f32,
    correlators: Vec<Option<TemplateCorrelator>>,
    /// (fft_size, sample_rate bits, low_bin, high_bin) the templates were
    /// built for.
    built_for: Option<(usize, u32, usize, usize)>,
    scores: [f32; 5],
    slot: OutputSlot<i32>,
}

impl Default for VocalDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl VocalDetection {
    /// Default number of history frames each template spans.
    pub const DEFAULT_HISTORY_FRAMES: usize = 8;

    /// Creates the detector with tenor-register templates.
    pub fn new() -> Self {
        Self::with_register(VoiceRegister::Tenor)
    }

    /// Creates the detector with templates for a specific vocal register.
    pub fn with_register(register: VoiceRegister) -> Self {
        Self {
            register,
            history_frames: Self::DEFAULT_HISTORY_FRAMES,
            min_score: 0.1,
            correlators: Vec::new(),
            built_for: None,
            scores: [0.0; 5],
            slot: OutputSlot::new(),
        }
    }

    /// Sets the minimum correlation a vowel must reach; clamped into [0, 1].
    pub fn set_min_score(&mut self, min_score: f32) {
        self.min_score = min_score.clamp(0.0, 1.0);
    }

    /// Sets how many history frames each template spans (at least 1).
    /// Templates are rebuilt on the next pass.
    pub fn set_history_frames(&mut self, frames: usize) {
        self.history_frames = frames.max(1);
        self.built_for = None;
    }

    /// Correlation scores of the last pass, indexed by vowel code.
    pub fn scores(&self) -> &[f32; 5] {
        &self.scores
    }

    /// The last classification as a [`Vowel`], `None` before the first pass
    /// or when nothing was detected.
    pub fn detected_vowel(&self) -> Option<Vowel> {
        match self.slot.get() {
            Some(&0) => Some(Vowel::A),
            Some(&1) => Some(Vowel::E),
            Some(&2) => Some(Vowel::I),
            Some(&3) => Some(Vowel::O),
            Some(&4) => Some(Vowel::U),
            _ => None,
        }
    }

    fn profile_for(&self, vowel_code: usize) -> &'static FormantProfile {
        FORMANT_TABLE
            .iter()
            .find(|p| p.register == self.register && p.vowel as usize == vowel_code)
            .expect("the formant table covers every register/vowel pair")
    }

    /// One synthesized template frame: a Gaussian bump per in-band formant.
    fn template_frame(
        profile: &FormantProfile,
        num_bins: usize,
        bins_per_hz: f32,
        low_bin: usize,
        high_bin: usize,
    ) -> Vec<f32> {
        let mut frame = vec![0.0f32; num_bins];
        for (rank, &hz) in profile.formants.iter().enumerate() {
            let center = hz * bins_per_hz;
            if center as usize >= num_bins {
                continue;
            }
            let weight = FORMANT_WEIGHTS[rank];
            for bin in low_bin..=high_bin.min(num_bins - 1) {
                let d = bin as f32 - center;
                frame[bin] += weight * (-d * d / 8.0).exp();
            }
        }
        frame
    }

    fn rebuild(&mut self, view: &FrameView<'_>) {
        let sg = view.spectrogram();
        let key = (
            sg.fft_size(),
            sg.sample_rate().to_bits(),
            view.low_bin(),
            view.high_bin(),
        );
        if self.built_for == Some(key) {
            return;
        }
        let bins_per_hz = sg.fft_size() as f32 / sg.sample_rate();
        self.correlators.clear();
        for code in 0..5 {
            let profile = self.profile_for(code);
            let frame = Self::template_frame(
                profile,
                sg.num_bins(),
                bins_per_hz,
                view.low_bin(),
                view.high_bin(),
            );
            let frames = vec![frame; self.history_frames];
            self.correlators.push(TemplateCorrelator::new(
                &frames,
                view.low_bin(),
                view.high_bin(),
            ));
        }
        self.built_for = Some(key);
    }
}

impl AnalysisModule for VocalDetection {
    fn name(&self) -> &'static str {
        "vocal-detection"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        self.rebuild(view);
        let sg = view.spectrogram();
        let mut best = NO_VOCAL;
        let mut best_score = self.min_score;
        for (code, correlator) in self.correlators.iter().enumerate() {
            let score = correlator
                .as_ref()
                .map_or(0.0, |c| c.correlate(sg));
            self.scores[code] = score;
            if score > best_score {
                best_score = score;
                best = code as i32;
            }
        }
        self.slot.set(best);
    }
}

impl Feature for VocalDetection {
    type Output = i32;

    fn output(&self) -> Option<&i32> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    const FFT_SIZE: usize = 512;
    const SAMPLE_RATE: f32 = 8000.0;

    fn vowel_frame(profile: &FormantProfile) -> Vec<f32> {
        let num_bins = FFT_SIZE / 2;
        let bins_per_hz = FFT_SIZE as f32 / SAMPLE_RATE;
        VocalDetection::template_frame(profile, num_bins, bins_per_hz, 0, num_bins - 1)
    }

    fn sg_sustaining(profile: &FormantProfile, frames: usize) -> Spectrogram {
        let mut s = Spectrogram::new(SAMPLE_RATE, FFT_SIZE, 16).unwrap();
        let frame = vowel_frame(profile);
        for _ in 0..frames {
            s.push_frame(&frame).unwrap();
        }
        s
    }

    fn tenor(vowel: Vowel) -> &'static FormantProfile {
        FORMANT_TABLE
            .iter()
            .find(|p| p.register == VoiceRegister::Tenor && p.vowel == vowel)
            .unwrap()
    }

    #[test]
    fn sustained_vowel_is_classified() {
        for (code, vowel) in [Vowel::A, Vowel::E, Vowel::I, Vowel::O, Vowel::U]
            .into_iter()
            .enumerate()
        {
            let s = sg_sustaining(tenor(vowel), 8);
            let mut module = VocalDetection::new();
            module.analyze(&FrameView::new(&s, 0, 255).unwrap());
            assert_eq!(
                module.output(),
                Some(&(code as i32)),
                "vowel {vowel:?}, scores {:?}",
                module.scores()
            );
            assert_eq!(module.detected_vowel(), Some(vowel));
        }
    }

    #[test]
    fn silence_reports_no_vocal() {
        let mut s = Spectrogram::new(SAMPLE_RATE, FFT_SIZE, 16).unwrap();
        s.push_frame(&vec![0.0; 256]).unwrap();

        let mut module = VocalDetection::new();
        assert!(module.output().is_none());
        module.analyze(&FrameView::new(&s, 0, 255).unwrap());
        assert_eq!(module.output(), Some(&NO_VOCAL));
        assert!(module.detected_vowel().is_none());
    }

    #[test]
    fn templates_rebuild_only_on_configuration_change() {
        let s = sg_sustaining(tenor(Vowel::A), 8);
        let mut module = VocalDetection::new();
        module.analyze(&FrameView::new(&s, 0, 255).unwrap());
        let built = module.built_for;
        module.analyze(&FrameView::new(&s, 0, 255).unwrap());
        assert_eq!(module.built_for, built);

        module.analyze(&FrameView::new(&s, 10, 255).unwrap());
        assert_ne!(module.built_for, built);
    }
}
