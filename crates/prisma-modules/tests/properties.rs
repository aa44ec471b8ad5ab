//! Property-based tests over the feature modules.
//!
//! Uses proptest to verify the reduction and ordering invariants for
//! arbitrary frames: reductions agree with the band they were computed
//! over, scores stay in their documented bounds, and peak reports are
//! always sorted and capped.

use proptest::prelude::*;

use prisma_core::{AnalysisModule, Feature, FrameView, Spectrogram};
use prisma_modules::{MajorPeaks, MaxAmplitude, Noisiness, TotalAmplitude};

const FFT_SIZE: usize = 64;
const NUM_BINS: usize = FFT_SIZE / 2;

fn arb_frame() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.0f32..100.0, NUM_BINS)
}

fn arb_band() -> impl Strategy<Value = (usize, usize)> {
    (0..NUM_BINS).prop_flat_map(|low| (Just(low), low..NUM_BINS))
}

fn spectrogram(frame: &[f32]) -> Spectrogram {
    let mut sg = Spectrogram::new(48_000.0, FFT_SIZE, 2).unwrap();
    sg.push_frame(frame).unwrap();
    sg
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The max reduction dominates every element of its band and is one of
    /// them.
    #[test]
    fn max_amplitude_is_the_band_maximum(
        frame in arb_frame(),
        (low, high) in arb_band(),
    ) {
        let sg = spectrogram(&frame);
        let view = FrameView::new(&sg, low, high).unwrap();
        let mut module = MaxAmplitude::new();
        module.analyze(&view);
        let max = *module.output().unwrap();

        let band = &frame[low..=high];
        for &v in band {
            prop_assert!(max >= v);
        }
        prop_assert!(band.is_empty() || band.contains(&max) || max == 0.0);
    }

    /// The total reduction equals the band sum within float tolerance.
    #[test]
    fn total_amplitude_is_the_band_sum(
        frame in arb_frame(),
        (low, high) in arb_band(),
    ) {
        let sg = spectrogram(&frame);
        let view = FrameView::new(&sg, low, high).unwrap();
        let mut module = TotalAmplitude::new();
        module.analyze(&view);

        let expected: f32 = frame[low..=high].iter().sum();
        let got = *module.output().unwrap();
        prop_assert!((got - expected).abs() <= expected.abs() * 1e-5 + 1e-5);
    }

    /// Peak reports are amplitude-sorted, tie-broken toward lower
    /// frequencies, and never exceed the cap.
    #[test]
    fn major_peaks_ordering_and_cap(
        frame in arb_frame(),
        max_peaks in 1usize..8,
    ) {
        let sg = spectrogram(&frame);
        let view = FrameView::new(&sg, 0, NUM_BINS - 1).unwrap();
        let mut module = MajorPeaks::with_max_peaks(max_peaks);
        module.analyze(&view);
        let peaks = module.output().unwrap();

        prop_assert!(peaks.len() <= max_peaks);
        for pair in peaks.windows(2) {
            prop_assert!(
                pair[0].amplitude > pair[1].amplitude
                    || (pair[0].amplitude == pair[1].amplitude
                        && pair[0].frequency < pair[1].frequency)
            );
        }
        // Every reported peak is a strict local maximum of the frame.
        for peak in peaks {
            let bin = (peak.frequency / sg.bin_width()).round() as usize;
            prop_assert!(bin > 0 && bin < NUM_BINS - 1);
            prop_assert!(frame[bin] > frame[bin - 1] && frame[bin] > frame[bin + 1]);
        }
    }

    /// Noisiness stays in [0, 1] for any band.
    #[test]
    fn noisiness_is_bounded(
        frame in arb_frame(),
        (low, high) in arb_band(),
    ) {
        let sg = spectrogram(&frame);
        let view = FrameView::new(&sg, low, high).unwrap();
        let mut module = Noisiness::new();
        module.analyze(&view);
        let score = *module.output().unwrap();
        prop_assert!((0.0..=1.0).contains(&score));
    }
}
