//! STFT front end: windowed FFT magnitude frames for the engine.
//!
//! The engine itself never computes spectra — it consumes magnitude frames.
//! This front end is the host-side producer: it windows each hop of the
//! input signal, runs a forward FFT, and yields `fft_size / 2` magnitudes
//! per frame from a reused buffer.

use rustfft::num_complex::Complex;
use rustfft::{Fft as RustFft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function applied before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing).
    Rectangular,
    /// Hann window (raised cosine).
    #[default]
    Hann,
    /// Hamming window.
    Hamming,
    /// Blackman window.
    Blackman,
}

impl Window {
    /// Parses a window name as used in presets and flags.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Some(Self::Rectangular),
            "hann" => Some(Self::Hann),
            "hamming" => Some(Self::Hamming),
            "blackman" => Some(Self::Blackman),
            _ => None,
        }
    }

    /// Window coefficients for a frame of `size` samples.
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / size as f32;
                match self {
                    Self::Rectangular => 1.0,
                    Self::Hann => 0.5 * (1.0 - x.cos()),
                    Self::Hamming => 0.54 - 0.46 * x.cos(),
                    Self::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}

/// Streaming STFT producer with reused buffers.
pub struct StftFrontEnd {
    fft_size: usize,
    hop_size: usize,
    coeffs: Vec<f32>,
    fft: Arc<dyn RustFft<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl StftFrontEnd {
    /// Creates a front end for the given FFT size, hop size, and window.
    pub fn new(fft_size: usize, hop_size: usize, window: Window) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft_size,
            hop_size,
            coeffs: window.coefficients(fft_size),
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            magnitudes: vec![0.0; fft_size / 2],
        }
    }

    /// FFT size in samples.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Hop between consecutive frames, in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of full frames a signal of `len` samples yields.
    pub fn num_frames(&self, len: usize) -> usize {
        if len < self.fft_size {
            0
        } else {
            (len - self.fft_size) / self.hop_size + 1
        }
    }

    /// Magnitude frame of one `fft_size`-sample chunk.
    ///
    /// Chunks shorter than the FFT size are zero-padded. The returned slice
    /// borrows the reused internal buffer and holds `fft_size / 2` values.
    pub fn magnitudes(&mut self, chunk: &[f32]) -> &[f32] {
        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = chunk.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.coeffs[i], 0.0);
        }
        self.fft.process(&mut self.scratch);
        for (mag, c) in self.magnitudes.iter_mut().zip(self.scratch.iter()) {
            *mag = c.norm();
        }
        &self.magnitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: f32, freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn window_names_parse() {
        assert_eq!(Window::parse("hann"), Some(Window::Hann));
        assert_eq!(Window::parse("Blackman"), Some(Window::Blackman));
        assert_eq!(Window::parse("none"), Some(Window::Rectangular));
        assert_eq!(Window::parse("kaiser"), None);
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let sample_rate = 8000.0;
        let signal = sine(sample_rate, 1000.0, 1024);
        let mut front = StftFrontEnd::new(1024, 512, Window::Hann);
        let mags = front.magnitudes(&signal);
        assert_eq!(mags.len(), 512);

        let peak_bin = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // 1000 Hz at 8000 Hz / 1024 samples -> bin 128.
        assert_eq!(peak_bin, 128);
    }

    #[test]
    fn frame_count_accounts_for_hop() {
        let front = StftFrontEnd::new(256, 128, Window::Hann);
        assert_eq!(front.num_frames(100), 0);
        assert_eq!(front.num_frames(256), 1);
        assert_eq!(front.num_frames(512), 3);
    }

    #[test]
    fn short_chunks_are_zero_padded() {
        let mut front = StftFrontEnd::new(256, 128, Window::Rectangular);
        let mags = front.magnitudes(&[1.0; 10]);
        assert!(mags.iter().all(|m| m.is_finite()));
    }
}
