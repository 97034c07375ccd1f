//! Frame preprocessing for the facial model.

use image::imageops::FilterType;

use crate::error::MlResult;

/// Side length of the square grayscale model input.
pub const FACE_INPUT_SIZE: u32 = 48;

/// Decode an encoded frame into the facial model input.
///
/// Returns `48 * 48` luminance values in `[0, 1]`, row-major, matching an
/// input tensor of shape `(1, 48, 48, 1)`.
pub fn frame_to_tensor(bytes: &[u8]) -> MlResult<Vec<f32>> {
    let img = image::load_from_memory(bytes)?;
    let gray = img.to_luma8();
    let resized = image::imageops::resize(
        &gray,
        FACE_INPUT_SIZE,
        FACE_INPUT_SIZE,
        FilterType::Triangle,
    );

    Ok(resized.pixels().map(|p| p.0[0] as f32 / 255.0).collect())
}
