//! WebAssembly exports for the CAS filter.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA byte buffers (`width * height * 4` bytes, as in
//! `ImageData.data`).

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::error::{CasError, CasResult};
use crate::filters::cas::cas_rgba_u8;

/// Shape a flat RGBA buffer into a `(height, width, 4)` array.
fn rgba_from_flat(data: &[u8], width: usize, height: usize) -> CasResult<Array3<u8>> {
    let expected = width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CasError::InvalidDimensions("image dimensions overflow".into()))?;
    if data.len() != expected {
        return Err(CasError::InvalidDimensions(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    Array3::from_shape_vec((height, width, 4), data.to_vec())
        .map_err(|e| CasError::InvalidDimensions(e.to_string()))
}

fn cas_flat(data: &[u8], width: usize, height: usize, sharpening: f64, contrast: f64) -> CasResult<Vec<u8>> {
    let input = rgba_from_flat(data, width, height)?;
    let result = cas_rgba_u8(input.view(), sharpening, contrast)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Contrast Adaptive Sharpening - u8 (8-bit)
// ============================================================================

/// Apply Contrast Adaptive Sharpening to an RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `sharpening` - Sharpening intensity (0.0-1.0)
/// * `contrast` - Contrast adaptation (0.0-1.0)
///
/// # Returns
/// Flat array of RGBA bytes, alpha preserved
#[wasm_bindgen]
pub fn cas_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    sharpening: f64,
    contrast: f64,
) -> Result<Vec<u8>, JsValue> {
    cas_flat(data, width, height, sharpening, contrast).map_err(|e| JsValue::from_str(&e.to_string()))
}
