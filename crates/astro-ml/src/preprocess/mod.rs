//! Input preprocessing for the classifiers.

pub mod image;
pub mod mfcc;

pub use self::image::{frame_to_tensor, FACE_INPUT_SIZE};
pub use self::mfcc::{MfccExtractor, MFCC_FRAMES, N_MFCC};
