//! Contrast Adaptive Sharpening
//!
//! CPU implementation of AMD FidelityFX Contrast Adaptive Sharpening (CAS)
//! for 8-bit images, with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Image Format
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Alpha is passed through unchanged.
//!
//! ## Parameters
//! - `sharpening` (0.0-1.0, default 1.0): blend toward the sharpened color
//! - `contrast` (0.0-1.0, default 0.0): contrast adaptation; higher values
//!   soften the filter
//!
//! ## Rendering
//! [`render`] processes one rectangular region and is what a tiling host
//! calls from its worker threads. [`render_tiled`] does the partitioning and
//! dispatch itself on the rayon pool, and [`cas_rgba_u8`] wraps the whole
//! pass for a single image.
//!
//! ```
//! use cas_sharpen::cas_rgba_u8;
//! use ndarray::Array3;
//!
//! let image = Array3::<u8>::from_elem((8, 8, 4), 128);
//! let sharpened = cas_rgba_u8(image.view(), 1.0, 0.0).unwrap();
//! assert_eq!(sharpened, image);
//! ```

pub mod cancel;
pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cancel::{CancelSignal, NeverCancel};
pub use error::{CasError, CasResult};
pub use filters::cas::{
    cas_rgba_u8, render, render_regions, sharpen_pixel, CasParams, EdgeMode, Neighborhood,
    RenderStatus,
};
pub use filters::color::Rgb;
pub use filters::raster::{Raster, RasterMut, Region, Rgba8, RowBand};
pub use filters::tiling::{render_tiled, Tiling};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::cas::{cas_rgba_u8, DEFAULT_CONTRAST, DEFAULT_SHARPENING};
    use crate::CasError;

    fn to_py_err(err: CasError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Apply Contrast Adaptive Sharpening to an RGB or RGBA u8 image.
    ///
    /// # Arguments
    /// * `image` - Image with 3 or 4 channels (height, width, channels)
    /// * `sharpening` - Sharpening intensity (0.0-1.0, default 1.0)
    /// * `contrast` - Contrast adaptation (0.0-1.0, default 0.0)
    ///
    /// Alpha is preserved. Raises `ValueError` for other channel counts.
    #[pyfunction]
    #[pyo3(signature = (image, sharpening=DEFAULT_SHARPENING, contrast=DEFAULT_CONTRAST))]
    pub fn contrast_adaptive_sharpen<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sharpening: f64,
        contrast: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = cas_rgba_u8(image.as_array(), sharpening, contrast).map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    /// Contrast Adaptive Sharpening extension module
    #[pymodule]
    pub fn cas_sharpen(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(contrast_adaptive_sharpen, m)?)?;
        m.add("DEFAULT_SHARPENING", DEFAULT_SHARPENING)?;
        m.add("DEFAULT_CONTRAST", DEFAULT_CONTRAST)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::cas_sharpen;
