//! Error types for the analysis engine.
//!
//! All variants here are raised synchronously at setup time (construction,
//! registration, range configuration) or by explicit history queries. The
//! per-frame path — [`ModuleGroup::run`](crate::ModuleGroup::run) and every
//! module's `analyze` — never returns an error; anomalies degrade the result
//! locally instead.

use thiserror::Error;

use crate::group::ModuleId;

/// Errors raised by [`Spectrogram`](crate::Spectrogram) construction and
/// history queries.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SpectrogramError {
    /// The spectrogram was configured with a history depth of zero; it can
    /// hold no frames, so pushing is rejected.
    #[error("history depth is zero; the spectrogram cannot hold frames")]
    ZeroHistory,

    /// A history lookup reached past the frames actually available.
    #[error("frame offset {offset} exceeds available history ({available} frames)")]
    HistoryExhausted {
        /// Requested offset behind the most recent frame.
        offset: usize,
        /// Frames currently held (bounded by the history depth).
        available: usize,
    },

    /// FFT size must be a power of two of at least 2.
    #[error("fft size must be a power of two >= 2, got {0}")]
    InvalidFftSize(usize),

    /// Sample rate must be positive and finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),
}

/// Errors raised when configuring an analysis window.
///
/// Inverted bounds are rejected, never silently swapped.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RangeError {
    /// Lower frequency bound exceeds the upper bound.
    #[error("lower frequency bound {low} Hz exceeds upper bound {high} Hz")]
    InvertedFreq {
        /// Requested lower bound in Hz.
        low: f32,
        /// Requested upper bound in Hz.
        high: f32,
    },

    /// Lower bin bound exceeds the upper bound.
    #[error("lower bin {low} exceeds upper bin {high}")]
    InvertedBins {
        /// Requested lower bin index.
        low: usize,
        /// Requested upper bin index.
        high: usize,
    },

    /// Frequency bounds must be finite and non-negative.
    #[error("frequency bounds must be finite and non-negative, got ({low}, {high})")]
    NonFiniteFreq {
        /// Requested lower bound in Hz.
        low: f32,
        /// Requested upper bound in Hz.
        high: f32,
    },
}

/// Errors raised while wiring a [`ModuleGroup`](crate::ModuleGroup).
///
/// Registration and attachment validate fully before mutating, so a failed
/// call leaves the group exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GroupError {
    /// The module id does not belong to this group's arena.
    #[error("module {0:?} is not part of this group")]
    UnknownModule(ModuleId),

    /// The same module instance was registered as a top-level module twice.
    #[error("module {0:?} is already registered in this group")]
    DuplicateModule(ModuleId),

    /// The module is already attached as a submodule of another parent.
    #[error("module {child:?} is already a submodule of {parent:?}")]
    AlreadyAttached {
        /// The module that was to be attached.
        child: ModuleId,
        /// Its current parent.
        parent: ModuleId,
    },

    /// A top-level module cannot also become a submodule.
    #[error("module {0:?} is registered top-level and cannot be attached as a submodule")]
    AlreadyRegistered(ModuleId),

    /// A module cannot be its own submodule.
    #[error("module {0:?} cannot be attached to itself")]
    SelfAttachment(ModuleId),

    /// Attaching would make the child an ancestor of its own parent.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// The would-be parent.
        parent: ModuleId,
        /// The module that was to be attached.
        child: ModuleId,
    },

    /// A top-level module must resolve to exactly one spectrogram: either a
    /// per-module override or the group default, at registration time.
    #[error("module {0:?} has no spectrogram: no override given and no group default set")]
    NoSpectrogram(ModuleId),

    /// The requested analysis window is invalid.
    #[error(transparent)]
    Range(#[from] RangeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_exhausted_display_names_both_counts() {
        let err = SpectrogramError::HistoryExhausted {
            offset: 5,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'), "got: {msg}");
        assert!(msg.contains('2'), "got: {msg}");
    }

    #[test]
    fn inverted_freq_display() {
        let err = RangeError::InvertedFreq {
            low: 900.0,
            high: 100.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("900"), "got: {msg}");
        assert!(msg.contains("100"), "got: {msg}");
    }

    #[test]
    fn group_error_wraps_range_error() {
        let range = RangeError::InvertedBins { low: 8, high: 2 };
        let err = GroupError::from(range);
        assert!(matches!(err, GroupError::Range(_)));
        assert_eq!(err.to_string(), range.to_string());
    }
}
