//! MFCC feature extraction for the speech model.
//!
//! Pipeline per clip:
//! 1. Centre-pad by `n_fft / 2` zeros on both sides
//! 2. Hann-windowed STFT, power spectrum
//! 3. Slaney mel filterbank (128 bands, 0 Hz to Nyquist, area-normalised)
//! 4. Power to dB (`amin = 1e-10`, floor at `max - 80 dB`)
//! 5. Orthonormal DCT-II over the mel axis, first 40 coefficients
//! 6. Zero-pad or truncate along time to 174 frames

use std::f32::consts::PI;
use std::sync::Arc;

use ndarray::Array2;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{MlError, MlResult};

/// Number of cepstral coefficients.
pub const N_MFCC: usize = 40;

/// Fixed time length of the speech model input.
pub const MFCC_FRAMES: usize = 174;

const N_FFT: usize = 2048;
const HOP_LENGTH: usize = 512;
const N_MELS: usize = 128;
const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;

/// Reusable MFCC extractor. Construction precomputes the window, FFT plan,
/// mel filterbank and DCT basis.
pub struct MfccExtractor {
    sample_rate: u32,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    mel_basis: Array2<f32>,
    dct_basis: Array2<f32>,
}

impl std::fmt::Debug for MfccExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfccExtractor")
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl MfccExtractor {
    pub fn new(sample_rate: u32) -> Self {
        // Periodic Hann window
        let window: Vec<f32> = (0..N_FFT)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / N_FFT as f32).cos())
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(N_FFT);

        Self {
            sample_rate,
            window,
            fft,
            mel_basis: mel_filterbank(sample_rate as f32, N_FFT, N_MELS),
            dct_basis: dct_ortho(N_MFCC, N_MELS),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw MFCC matrix of shape `(40, n_frames)`.
    pub fn mfcc(&self, samples: &[f32]) -> MlResult<Array2<f32>> {
        if samples.is_empty() {
            return Err(MlError::preprocess("empty audio"));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(MlError::preprocess("audio contains non-finite samples"));
        }

        let power = self.power_spectrogram(samples);
        let mel = self.mel_basis.dot(&power);
        let log_mel = power_to_db(mel);
        Ok(self.dct_basis.dot(&log_mel))
    }

    /// Model-ready features: `40 * 174` values, row-major over
    /// `(coefficient, frame)`, matching a `(1, 40, 174, 1)` tensor.
    pub fn features(&self, samples: &[f32]) -> MlResult<Vec<f32>> {
        let mfcc = self.mfcc(samples)?;
        let frames = mfcc.ncols();

        let mut out = vec![0.0f32; N_MFCC * MFCC_FRAMES];
        for c in 0..N_MFCC {
            for t in 0..frames.min(MFCC_FRAMES) {
                out[c * MFCC_FRAMES + t] = mfcc[[c, t]];
            }
        }
        Ok(out)
    }

    /// Power spectrogram of shape `(1 + n_fft / 2, n_frames)`.
    fn power_spectrogram(&self, samples: &[f32]) -> Array2<f32> {
        let padded = zero_pad(samples, N_FFT / 2);
        let n_frames = 1 + (padded.len() - N_FFT) / HOP_LENGTH;
        let n_bins = N_FFT / 2 + 1;

        let mut power = Array2::<f32>::zeros((n_bins, n_frames));
        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];

        for t in 0..n_frames {
            let start = t * HOP_LENGTH;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            for (k, c) in buffer[..n_bins].iter().enumerate() {
                power[[k, t]] = c.re * c.re + c.im * c.im;
            }
        }

        power
    }
}

/// Centre the signal between `pad` zeros on each side.
fn zero_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let mut out = vec![0.0; samples.len() + 2 * pad];
    out[pad..pad + samples.len()].copy_from_slice(samples);
    out
}

fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= min_log_mel {
        MIN_LOG_HZ * (logstep * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Slaney-style triangular mel filterbank, shape `(n_mels, 1 + n_fft / 2)`.
fn mel_filterbank(sample_rate: f32, n_fft: usize, n_mels: usize) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let fmax = sample_rate / 2.0;

    let fft_freqs: Vec<f32> = (0..n_bins)
        .map(|k| k as f32 * sample_rate / n_fft as f32)
        .collect();

    let mel_max = hz_to_mel(fmax);
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
    for m in 0..n_mels {
        let (lo, center, hi) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        let enorm = 2.0 / (hi - lo);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - lo) / (center - lo);
            let upper = (hi - f) / (hi - center);
            let w = lower.min(upper).max(0.0);
            weights[[m, k]] = w * enorm;
        }
    }
    weights
}

fn power_to_db(mut spec: Array2<f32>) -> Array2<f32> {
    spec.mapv_inplace(|v| 10.0 * v.max(AMIN).log10());
    let max = spec.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = max - TOP_DB;
    spec.mapv_inplace(|v| v.max(floor));
    spec
}

/// Orthonormal DCT-II basis, shape `(n_out, n_in)`.
fn dct_ortho(n_out: usize, n_in: usize) -> Array2<f32> {
    let mut basis = Array2::<f32>::zeros((n_out, n_in));
    let n = n_in as f32;
    for k in 0..n_out {
        let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        for i in 0..n_in {
            basis[[k, i]] = scale * (PI * k as f32 * (2 * i + 1) as f32 / (2.0 * n)).cos();
        }
    }
    basis
}
