//! Vowel classification by formant-profile matching.
//!
//! The window's strongest spectral peaks are compared against a fixed table
//! of sung-vowel formant profiles (five vocal registers × five vowels, from
//! the Csound formant appendix). The profile with the smallest weighted
//! frequency distance wins; when the frame does not carry enough peaks to
//! tell, the module degrades to [`Vowel::Unvoiced`].

use prisma_core::{AnalysisModule, Feature, FrameView, OutputSlot};

use crate::peaks::MajorPeaks;

/// Classified vowel, char-coded via [`as_char`](Self::as_char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vowel {
    /// As in "father".
    A,
    /// As in "bed".
    E,
    /// As in "see".
    I,
    /// As in "more".
    O,
    /// As in "boot".
    U,
    /// No vowel could be determined from the frame.
    Unvoiced,
}

impl Vowel {
    /// The classic single-character coding: `a e i o u`, `-` for unvoiced.
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::E => 'e',
            Self::I => 'i',
            Self::O => 'o',
            Self::U => 'u',
            Self::Unvoiced => '-',
        }
    }
}

/// Vocal register a formant profile was measured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRegister {
    /// Bass voice.
    Bass,
    /// Tenor voice.
    Tenor,
    /// Countertenor voice.
    Countertenor,
    /// Alto voice.
    Alto,
    /// Soprano voice.
    Soprano,
}

/// Reference formant frequencies of one sung vowel in one register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormantProfile {
    /// Register the profile belongs to.
    pub register: VoiceRegister,
    /// Vowel the profile describes.
    pub vowel: Vowel,
    /// The first five formant frequencies, ascending, in Hz.
    pub formants: [f32; 5],
}

/// Formant frequencies for sung vowels, per the Csound manual's formant
/// table (University of Chicago archive).
pub static FORMANT_TABLE: [FormantProfile; 25] = {
    use VoiceRegister::{Alto, Bass, Countertenor, Soprano, Tenor};
    use Vowel::{A, E, I, O, U};
    macro_rules! profile {
        ($reg:expr, $vow:expr, $f:expr) => {
            FormantProfile {
                register: $reg,
                vowel: $vow,
                formants: $f,
            }
        };
    }
    [
        profile!(Bass, A, [600.0, 1040.0, 2250.0, 2450.0, 2750.0]),
        profile!(Bass, E, [400.0, 1620.0, 2400.0, 2800.0, 3100.0]),
        profile!(Bass, I, [250.0, 1750.0, 2600.0, 3050.0, 3340.0]),
        profile!(Bass, O, [400.0, 750.0, 2400.0, 2600.0, 2900.0]),
        profile!(Bass, U, [350.0, 600.0, 2400.0, 2675.0, 2950.0]),
        profile!(Tenor, A, [650.0, 1080.0, 2650.0, 2900.0, 3250.0]),
        profile!(Tenor, E, [400.0, 1700.0, 2600.0, 3200.0, 3580.0]),
        profile!(Tenor, I, [290.0, 1870.0, 2800.0, 3250.0, 3540.0]),
        profile!(Tenor, O, [400.0, 800.0, 2600.0, 2800.0, 3000.0]),
        profile!(Tenor, U, [350.0, 600.0, 2700.0, 2900.0, 3300.0]),
        profile!(Countertenor, A, [660.0, 1120.0, 2750.0, 3000.0, 3350.0]),
        profile!(Countertenor, E, [440.0, 1800.0, 2700.0, 3000.0, 3300.0]),
        profile!(Countertenor, I, [270.0, 1850.0, 2900.0, 3350.0, 3590.0]),
        profile!(Countertenor, O, [430.0, 820.0, 2700.0, 3000.0, 3300.0]),
        profile!(Countertenor, U, [370.0, 630.0, 2750.0, 3000.0, 3400.0]),
        profile!(Alto, A, [800.0, 1150.0, 2800.0, 3500.0, 4950.0]),
        profile!(Alto, E, [400.0, 1600.0, 2700.0, 3300.0, 4950.0]),
        profile!(Alto, I, [350.0, 1700.0, 2700.0, 3700.0, 4950.0]),
        profile!(Alto, O, [450.0, 800.0, 2830.0, 3500.0, 4950.0]),
        profile!(Alto, U, [325.0, 700.0, 2530.0, 3500.0, 4950.0]),
        profile!(Soprano, A, [800.0, 1150.0, 2900.0, 3900.0, 4950.0]),
        profile!(Soprano, E, [350.0, 2000.0, 2800.0, 3600.0, 4950.0]),
        profile!(Soprano, I, [270.0, 2140.0, 2950.0, 3900.0, 4950.0]),
        profile!(Soprano, O, [450.0, 800.0, 2830.0, 3800.0, 4950.0]),
        profile!(Soprano, U, [325.0, 700.0, 2700.0, 3800.0, 4950.0]),
    ]
};

/// Number of formants compared; the lower formants carry most of the vowel
/// identity, and matching fewer is more robust to noise.
const MATCHED_FORMANTS: usize = 3;

/// Per-rank weight decay: each later formant counts slightly less.
const RANK_PENALTY: f32 = 0.9;

/// Nearest-profile vowel classification of the window.
///
/// Internally picks the five strongest peaks of the window, orders them by
/// frequency, and scores them against every profile in [`FORMANT_TABLE`].
#[derive(Debug)]
pub struct Formants {
    picker: MajorPeaks,
    ordered: [f32; 5],
    best_register: Option<VoiceRegister>,
    slot: OutputSlot<Vowel>,
}

impl Default for Formants {
    fn default() -> Self {
        Self::new()
    }
}

impl Formants {
    /// Creates the module.
    pub fn new() -> Self {
        Self {
            picker: MajorPeaks::with_max_peaks(5),
            ordered: [0.0; 5],
            best_register: None,
            slot: OutputSlot::new(),
        }
    }

    /// Register of the best-matching profile of the last classified frame,
    /// `None` before the first match or while unvoiced.
    pub fn best_register(&self) -> Option<VoiceRegister> {
        self.best_register
    }

    fn distance(profile: &FormantProfile, found: &[f32; 5]) -> f32 {
        let mut sum = 0.0f32;
        let mut weight = 1.0f32;
        for rank in 0..MATCHED_FORMANTS {
            let d = profile.formants[rank] - found[rank];
            sum += d * d * weight;
            weight *= RANK_PENALTY;
        }
        sum.sqrt()
    }
}

impl AnalysisModule for Formants {
    fn name(&self) -> &'static str {
        "formants"
    }

    fn analyze(&mut self, view: &FrameView<'_>) {
        self.picker.analyze(view);
        let peaks = self.picker.output().unwrap_or(&[]);
        if peaks.len() < 2 {
            self.best_register = None;
            self.slot.set(Vowel::Unvoiced);
            return;
        }

        // Profiles list formants ascending; re-order the amplitude-sorted
        // peaks by frequency and pad the tail with zeros.
        self.ordered = [0.0; 5];
        for (dst, peak) in self.ordered.iter_mut().zip(peaks.iter()) {
            *dst = peak.frequency;
        }
        self.ordered[..peaks.len()].sort_unstable_by(f32::total_cmp);

        let mut best_distance = f32::MAX;
        let mut best: Option<&FormantProfile> = None;
        for profile in &FORMANT_TABLE {
            let d = Self::distance(profile, &self.ordered);
            if d < best_distance {
                best_distance = d;
                best = Some(profile);
            }
        }
        match best {
            Some(profile) => {
                self.best_register = Some(profile.register);
                self.slot.set(profile.vowel);
            }
            None => {
                self.best_register = None;
                self.slot.set(Vowel::Unvoiced);
            }
        }
    }
}

impl Feature for Formants {
    type Output = Vowel;

    fn output(&self) -> Option<&Vowel> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::Spectrogram;

    /// 8 kHz / fft 512: 15.625 Hz bins, plenty of resolution for formants.
    fn sg_with_formants(formants: &[f32]) -> Spectrogram {
        let mut s = Spectrogram::new(8000.0, 512, 2).unwrap();
        let mut frame = vec![0.0f32; 256];
        for (rank, &hz) in formants.iter().enumerate() {
            let bin = (hz * 512.0 / 8000.0).round() as usize;
            frame[bin] = 10.0 - rank as f32;
        }
        s.push_frame(&frame).unwrap();
        s
    }

    #[test]
    fn recognizes_a_profile_straight_from_the_table() {
        for profile in &FORMANT_TABLE {
            // Only the matched formants are synthesized; the upper two sit
            // above Nyquist for the high registers at this sample rate.
            let s = sg_with_formants(&profile.formants[..MATCHED_FORMANTS]);
            let mut module = Formants::new();
            module.analyze(&FrameView::new(&s, 0, 255).unwrap());
            // Registers overlap heavily; the vowel is what the module
            // promises to recover.
            assert_eq!(
                module.output(),
                Some(&profile.vowel),
                "profile {:?}/{:?}",
                profile.register,
                profile.vowel
            );
        }
    }

    #[test]
    fn too_few_peaks_degrades_to_unvoiced() {
        let mut s = Spectrogram::new(8000.0, 512, 2).unwrap();
        let mut frame = vec![0.0f32; 256];
        frame[40] = 9.0; // a single tone
        s.push_frame(&frame).unwrap();

        let mut module = Formants::new();
        assert!(module.output().is_none());
        module.analyze(&FrameView::new(&s, 0, 255).unwrap());
        assert_eq!(module.output(), Some(&Vowel::Unvoiced));
        assert_eq!(module.output().unwrap().as_char(), '-');
        assert!(module.best_register().is_none());
    }

    #[test]
    fn char_coding_is_stable() {
        assert_eq!(Vowel::A.as_char(), 'a');
        assert_eq!(Vowel::U.as_char(), 'u');
        assert_eq!(Vowel::Unvoiced.as_char(), '-');
    }
}
