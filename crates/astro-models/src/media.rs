//! Decoded media handed from the decoder to the classifiers.

/// One still frame, encoded as a compact image buffer (PNG).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Position of the frame in presentation order.
    pub index: usize,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl EncodedFrame {
    pub fn new(index: usize, data: Vec<u8>) -> Self {
        Self { index, data }
    }
}

/// Mono PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
