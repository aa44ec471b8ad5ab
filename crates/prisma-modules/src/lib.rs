//! Prisma Modules - concrete audio feature extractors
//!
//! Every module here implements the
//! [`AnalysisModule`](prisma_core::AnalysisModule) contract from
//! `prisma-core` and exposes its typed result through
//! [`Feature`](prisma_core::Feature):
//!
//! - [`MaxAmplitude`] / [`MeanAmplitude`] / [`TotalAmplitude`] - band
//!   reductions
//! - [`Centroid`] - magnitude-weighted mean frequency (brightness)
//! - [`Noisiness`] - noise-likeness in [0, 1], entropy or flatness based
//! - [`DeltaAmplitudes`] - per-bin change against the previous frame
//! - [`BreadSlicer`] - summed magnitude per configured frequency slice
//! - [`SalientFreqs`] - dominant bins above a threshold
//! - [`MajorPeaks`] - strongest local maxima, amplitude-sorted
//! - [`Formants`] - vowel classification by formant-profile matching
//! - [`PercussionDetection`] - thresholded transient flag
//! - [`VocalDetection`] - vowel classification over recent history
//!
//! Modules are wired into a [`ModuleGroup`](prisma_core::ModuleGroup) and
//! run once per incoming frame; see the `prisma-core` docs for the
//! execution model.

pub mod amplitude;
pub mod bread_slicer;
pub mod centroid;
pub mod delta;
pub mod formants;
pub mod noisiness;
pub mod peaks;
pub mod percussion;
pub mod salient;
pub mod vocal;

// Re-export all modules at crate root
pub use amplitude::{MaxAmplitude, MeanAmplitude, TotalAmplitude};
pub use bread_slicer::{BandConfigError, BreadSlicer};
pub use centroid::Centroid;
pub use delta::DeltaAmplitudes;
pub use formants::{FORMANT_TABLE, FormantProfile, Formants, VoiceRegister, Vowel};
pub use noisiness::{NoiseMetric, Noisiness};
pub use peaks::{MajorPeaks, Peak};
pub use percussion::PercussionDetection;
pub use salient::SalientFreqs;
pub use vocal::{NO_VOCAL, VocalDetection};
