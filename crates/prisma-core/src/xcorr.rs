//! Cross-correlation helpers for template-matching modules.
//!
//! Two pieces: [`normalized_correlation`], the zero-lag cosine similarity of
//! two equal-length sequences, and [`TemplateCorrelator`], which scores the
//! most recent frames of a [`Spectrogram`] against a fixed spectro-temporal
//! template. The template's norm is precomputed once at configuration time;
//! scoring a pass is a single dot-product walk over the history.

use crate::spectrogram::Spectrogram;

/// Zero-lag normalized cross-correlation of two sequences.
///
/// Returns `dot(x, y) / (‖x‖ · ‖y‖)`, the cosine similarity, in [-1, 1] for
/// arbitrary input and [0, 1] for magnitude data. Sequences are compared
/// over their common length; if either is (near-)silent the correlation is
/// undefined and 0.0 is returned.
pub fn normalized_correlation(x: &[f32], y: &[f32]) -> f32 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_x = 0.0f32;
    let mut norm_y = 0.0f32;
    for i in 0..n {
        dot += x[i] * y[i];
        norm_x += x[i] * x[i];
        norm_y += y[i] * y[i];
    }
    let denom = (norm_x * norm_y).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    dot / denom
}

/// Scores recent spectrogram history against a fixed template.
///
/// The template is a sequence of frames (oldest first) restricted to an
/// inclusive bin window. [`correlate`](Self::correlate) compares it against
/// the same number of most-recent spectrogram frames; history that does not
/// exist yet is treated as silence, degrading the score smoothly instead of
/// failing.
#[derive(Debug, Clone)]
pub struct TemplateCorrelator {
    /// Flattened `frames × window` template data, oldest frame first.
    template: Vec<f32>,
    frames: usize,
    low_bin: usize,
    high_bin: usize,
    template_norm: f32,
}

impl TemplateCorrelator {
    /// Builds a correlator from template frames over the inclusive bin
    /// window `[low_bin, high_bin]`.
    ///
    /// Frames shorter than the window are padded with silence. Returns
    /// `None` for an empty template, an inverted window, or an all-silent
    /// template (its norm is zero, so every score would be degenerate).
    pub fn new(frames: &[Vec<f32>], low_bin: usize, high_bin: usize) -> Option<Self> {
        if frames.is_empty() || low_bin > high_bin {
            return None;
        }
        let window = high_bin - low_bin + 1;
        let mut template = Vec::with_capacity(frames.len() * window);
        for frame in frames {
            for bin in low_bin..=high_bin {
                template.push(frame.get(bin).copied().unwrap_or(0.0));
            }
        }
        let norm: f32 = template.iter().map(|&v| v * v).sum::<f32>().sqrt();
        if norm < 1e-12 {
            return None;
        }
        Some(Self {
            template,
            frames: frames.len(),
            low_bin,
            high_bin,
            template_norm: norm,
        })
    }

    /// Number of frames the template spans.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Correlation of the template against the most recent history, in
    /// [0, 1] for magnitude data.
    ///
    /// Frame `offset` 0 lines up with the template's newest frame. Missing
    /// history and bins beyond the frame are read as silence; a silent
    /// input scores 0.0.
    pub fn correlate(&self, spectrogram: &Spectrogram) -> f32 {
        let window = self.high_bin - self.low_bin + 1;
        let mut dot = 0.0f32;
        let mut input_norm_sq = 0.0f32;
        for t in 0..self.frames {
            // Template row t is (frames - 1 - t) frames behind the present.
            let Ok(frame) = spectrogram.frame_at(self.frames - 1 - t) else {
                continue;
            };
            let row = &self.template[t * window..(t + 1) * window];
            for (k, &tv) in row.iter().enumerate() {
                let iv = frame.get(self.low_bin + k).copied().unwrap_or(0.0);
                dot += iv * tv;
                input_norm_sq += iv * iv;
            }
        }
        let denom = input_norm_sq.sqrt() * self.template_norm;
        if denom < 1e-12 {
            return 0.0;
        }
        dot / denom
    }
}
