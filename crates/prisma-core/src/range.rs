//! Frequency-range scoping for analysis modules.
//!
//! A module's window can be given in Hz or directly in bin indices; either
//! way it is stored as written and resolved against the spectrogram it is
//! analyzed from at pass time. Resolution clamps to the frame's valid bins,
//! so the effective window is always the intersection of the requested range
//! with the spectrogram's validity, and changing front-end configuration
//! never invalidates a stored range.

use crate::error::RangeError;
use crate::spectrogram::Spectrogram;

/// Analysis window of a module, inclusive on both ends once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnalysisRange {
    /// The whole frame.
    #[default]
    Full,
    /// Bounds in Hz, converted with nearest-bin rounding at resolve time.
    Hz {
        /// Lower bound in Hz.
        low: f32,
        /// Upper bound in Hz.
        high: f32,
    },
    /// Bounds as bin indices, clamped to the frame at resolve time.
    Bins {
        /// Lower bin index.
        low: usize,
        /// Upper bin index, inclusive.
        high: usize,
    },
}

impl AnalysisRange {
    /// Window from frequency bounds in Hz.
    ///
    /// Inverted bounds are rejected, not swapped; bounds must be finite and
    /// non-negative.
    pub fn by_freq(low: f32, high: f32) -> Result<Self, RangeError> {
        if !(low.is_finite() && high.is_finite()) || low < 0.0 || high < 0.0 {
            return Err(RangeError::NonFiniteFreq { low, high });
        }
        if low > high {
            return Err(RangeError::InvertedFreq { low, high });
        }
        Ok(Self::Hz { low, high })
    }

    /// Window from inclusive bin bounds.
    pub fn by_bin(low: usize, high: usize) -> Result<Self, RangeError> {
        if low > high {
            return Err(RangeError::InvertedBins { low, high });
        }
        Ok(Self::Bins { low, high })
    }

    /// Resolves to inclusive `(low_bin, high_bin)` over the given
    /// spectrogram, clamped to its valid bins.
    ///
    /// Pure and idempotent: resolving the same range against the same
    /// configuration always yields the same bounds.
    pub fn resolve(&self, spectrogram: &Spectrogram) -> (usize, usize) {
        let last = spectrogram.num_bins() - 1;
        match *self {
            Self::Full => (0, last),
            Self::Hz { low, high } => {
                (spectrogram.bin_for_freq(low), spectrogram.bin_for_freq(high))
            }
            Self::Bins { low, high } => (low.min(last), high.min(last)),
        }
    }
}
