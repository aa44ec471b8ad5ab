//! Prisma Core - analysis-module composition engine
//!
//! This crate is the execution core of a real-time audio-feature-extraction
//! pipeline: short-time magnitude frames come in from an external FFT front
//! end, trees of analysis modules run over them once per frame, and each
//! module exposes its latest typed result.
//!
//! # Core Abstractions
//!
//! - [`Spectrogram`] - rolling ring buffer of magnitude frames with
//!   Hz ↔ bin conversion; [`SpectrogramBank`] owns them and hands out
//!   [`SpectrogramId`] handles
//! - [`AnalysisModule`] - object-safe per-frame hook implemented by every
//!   feature extractor
//! - [`Feature`] / [`OutputSlot`] - typed result accessor with an explicit
//!   "not yet computed" state
//! - [`FrameView`] - one frame scoped to a module's resolved bin window
//! - [`AnalysisRange`] - Hz- or bin-addressed analysis window, resolved
//!   lazily against the spectrogram it is analyzed from
//! - [`ModuleGroup`] - arena-owning batch runner: registration-order
//!   top-level execution, depth-first insertion-order submodules, optional
//!   per-pass deadline, [`PassSummary`] per tick
//! - [`spectrum`] - band statistics (sum, mean, max, flux, entropy,
//!   flatness) shared by the concrete modules
//! - [`xcorr`] - normalized correlation and template matching over recent
//!   history
//!
//! # Example
//!
//! ```rust,ignore
//! use prisma_core::{ModuleGroup, Spectrogram, SpectrogramBank};
//!
//! let mut bank = SpectrogramBank::new();
//! let source = bank.insert(Spectrogram::new(48_000.0, 1024, 8)?);
//!
//! let mut group = ModuleGroup::with_default_source(source);
//! let centroid = group.insert(Box::new(Centroid::new()));
//! group.add_module_in_range(centroid, 200.0, 4_000.0)?;
//!
//! // Per frame: the front end pushes, then one pass runs.
//! bank.get_mut(source).unwrap().push_frame(&magnitudes)?;
//! group.run(&bank);
//! let brightness = group.output::<Centroid>(centroid);
//! ```
//!
//! # Real-time contract
//!
//! One producer pushes frames, one pass reads them; the borrow rules of
//! [`SpectrogramBank`] make the single-writer/many-reader discipline
//! structural. Setup errors ([`GroupError`], [`RangeError`],
//! [`SpectrogramError`]) surface synchronously while wiring; the per-frame
//! path never errors and never allocates in steady state.

pub mod error;
pub mod group;
pub mod module;
pub mod range;
pub mod spectrogram;
pub mod spectrum;
pub mod xcorr;

// Re-export main types at crate root
pub use error::{GroupError, RangeError, SpectrogramError};
pub use group::{ModuleGroup, ModuleId, PassSummary};
pub use module::{AnalysisModule, Feature, FrameView, OutputSlot};
pub use range::AnalysisRange;
pub use spectrogram::{Spectrogram, SpectrogramBank, SpectrogramId};
pub use xcorr::{TemplateCorrelator, normalized_correlation};
