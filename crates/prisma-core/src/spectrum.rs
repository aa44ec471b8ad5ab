//! Band statistics shared by the concrete feature modules.
//!
//! All functions operate on a magnitude slice — typically the ranged band of
//! one frame — and are total: silent or degenerate input yields a defined
//! zero-like value rather than an error, so callers on the per-frame path
//! never branch on failure.

/// Sum of magnitudes.
pub fn band_sum(band: &[f32]) -> f32 {
    band.iter().sum()
}

/// Mean magnitude; 0.0 for an empty band.
pub fn band_mean(band: &[f32]) -> f32 {
    if band.is_empty() {
        0.0
    } else {
        band_sum(band) / band.len() as f32
    }
}

/// Largest magnitude; 0.0 for an empty band (magnitudes are non-negative).
pub fn band_max(band: &[f32]) -> f32 {
    band.iter().fold(0.0, |acc, &v| acc.max(v))
}

/// Sum of absolute per-bin changes between two bands.
///
/// The bands are compared index-by-index over their common length, so a
/// shorter history frame simply contributes fewer terms.
pub fn flux(curr: &[f32], prev: &[f32]) -> f32 {
    curr.iter()
        .zip(prev.iter())
        .map(|(&c, &p)| (c - p).abs())
        .sum()
}

/// Shannon entropy of the band treated as a probability distribution,
/// normalized to [0, 1].
///
/// 0 means all energy in one bin (fully tonal), 1 means energy spread evenly
/// across the band (noise-like). Bands of one bin or less, and silent bands,
/// score 0.
pub fn normalized_entropy(band: &[f32]) -> f32 {
    if band.len() <= 1 {
        return 0.0;
    }
    let total = band_sum(band);
    if total <= 0.0 {
        return 0.0;
    }
    let mut entropy = 0.0;
    for &v in band {
        if v > 0.0 {
            let p = v / total;
            entropy -= p * p.log2();
        }
    }
    entropy / (band.len() as f32).log2()
}

/// Spectral flatness: geometric over arithmetic mean, in [0, 1].
///
/// Like [`normalized_entropy`] this rises toward 1 for noise-like bands;
/// it reacts more sharply to isolated near-zero bins. Silent bands score 0.
pub fn spectral_flatness(band: &[f32]) -> f32 {
    if band.is_empty() {
        return 0.0;
    }
    let n = band.len() as f32;
    let log_sum: f32 = band.iter().map(|&v| v.max(1e-10).ln()).sum();
    let geometric_mean = (log_sum / n).exp();
    let arithmetic_mean = band_sum(band) / n;
    if arithmetic_mean > 1e-10 {
        (geometric_mean / arithmetic_mean).min(1.0)
    } else {
        0.0
    }
}
