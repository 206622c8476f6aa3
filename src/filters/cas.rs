//! Contrast Adaptive Sharpening (AMD FidelityFX CAS).
//!
//! Sharpens each pixel from its 3x3 neighborhood:
//!
//! ```text
//!  a b c
//!  d(e)f
//!  g h i
//! ```
//!
//! Local minimum and maximum estimate how much headroom the pixel has before
//! clipping. That headroom scales a negative-lobe cross filter
//!
//! ```text
//!  0 w 0
//!  w 1 w
//!  0 w 0
//! ```
//!
//! so low-contrast detail is sharpened strongly while edges that are already
//! near the signal limits are left mostly alone. The filtered color is then
//! blended with the original by `sharpening`.
//!
//! ## Edge Handling
//!
//! Pixels on the outermost rows and columns have no full neighborhood and
//! are copied unchanged. [`EdgeMode`] selects whether "outermost" refers to
//! the region being rendered or to the whole image.
//!
//! Alpha is never filtered; every output pixel carries its source alpha.

use ndarray::{Array3, ArrayView3};
use tracing::{debug, trace};

use super::color::Rgb;
use super::raster::{check_channels, Raster, RasterMut, Region};
use super::tiling::{render_tiled, Tiling};
use crate::cancel::{CancelSignal, NeverCancel};
use crate::error::{CasError, CasResult};

/// Default blend strength toward the sharpened color.
pub const DEFAULT_SHARPENING: f64 = 1.0;
/// Default contrast adaptation.
pub const DEFAULT_CONTRAST: f64 = 0.0;

/// Which rectangle decides that a pixel is an unfiltered edge pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeMode {
    /// First and last row and column of every rendered region are copied.
    /// Region boundaries inside the image show up as unsharpened seams.
    #[default]
    Region,
    /// Only the first and last row and column of the image are copied.
    /// Output does not depend on how the image is tiled.
    Image,
}

/// Filter parameters for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CasParams {
    /// Blend strength toward the sharpened color, 0.0-1.0.
    pub sharpening: f64,
    /// Contrast adaptation, 0.0-1.0. Higher values sharpen less.
    pub contrast: f64,
    pub edge_mode: EdgeMode,
}

impl Default for CasParams {
    fn default() -> Self {
        Self {
            sharpening: DEFAULT_SHARPENING,
            contrast: DEFAULT_CONTRAST,
            edge_mode: EdgeMode::default(),
        }
    }
}

impl CasParams {
    /// Create parameters, rejecting values outside [0, 1].
    ///
    /// The kernel itself accepts any value; this is the range a host
    /// exposes to users.
    pub fn new(sharpening: f64, contrast: f64) -> CasResult<Self> {
        check_unit("sharpening", sharpening)?;
        check_unit("contrast", contrast)?;
        Ok(Self {
            sharpening,
            contrast,
            ..Self::default()
        })
    }

    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    /// Peak of the negative lobe: 8 at contrast 0 down to 5 at contrast 1.
    #[inline]
    pub fn peak(&self) -> f64 {
        -3.0 * self.contrast + 8.0
    }
}

fn check_unit(name: &str, value: f64) -> CasResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CasError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// How a render call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Every pixel of the region was written.
    Completed,
    /// The cancel signal fired; rows not yet reached were left untouched.
    Cancelled,
}

impl RenderStatus {
    #[inline]
    pub fn is_cancelled(self) -> bool {
        self == RenderStatus::Cancelled
    }
}

/// 3x3 neighborhood of normalized colors, row-major `a..i`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighborhood {
    pub a: Rgb,
    pub b: Rgb,
    pub c: Rgb,
    pub d: Rgb,
    pub e: Rgb,
    pub f: Rgb,
    pub g: Rgb,
    pub h: Rgb,
    pub i: Rgb,
}

impl Neighborhood {
    /// Sample the neighborhood centred on `(x, y)`. The caller guarantees
    /// that all eight neighbours exist.
    #[inline]
    pub fn sample<R: Raster + ?Sized>(src: &R, x: usize, y: usize) -> Self {
        let at = |x, y| Rgb::from_rgba8(src.get_pixel(x, y));
        Self {
            a: at(x - 1, y - 1),
            b: at(x, y - 1),
            c: at(x + 1, y - 1),
            d: at(x - 1, y),
            e: at(x, y),
            f: at(x + 1, y),
            g: at(x - 1, y + 1),
            h: at(x, y + 1),
            i: at(x + 1, y + 1),
        }
    }
}

/// Sharpen the center of `n`, returning the blended color.
pub fn sharpen_pixel(n: &Neighborhood, params: &CasParams) -> Rgb {
    let Neighborhood { a, b, c, d, e, f, g, h, i } = *n;

    // Soft min and max over the cross plus the full 3x3 window. Both are
    // twice their true size; the factor cancels in the ratio below.
    let mut mn = d.min(e).min(f.min(b)).min(h);
    let mn2 = mn.min(a.min(c).min(g.min(i)));
    mn = mn + mn2;

    let mut mx = d.max(e).max(f.max(b)).max(h);
    let mx2 = mx.max(a.max(c).max(g.max(i)));
    mx = mx + mx2;

    // Distance to the nearer signal limit over the max.
    let amp = (mn.min(Rgb::splat(2.0) - mx) * mx.rcp()).saturate();
    let amp = amp.rsqrt();

    let w = -(amp * params.peak()).rcp();
    let rcp_weight = (w * 4.0 + Rgb::splat(1.0)).rcp();

    let window = (b + d) + (f + h);
    let out = ((window * w + e) * rcp_weight).saturate();

    e.lerp(out, params.sharpening)
}

/// Render one region of `dst` from `src`.
///
/// Edge pixels (per `params.edge_mode`) are copied; every other pixel gets
/// the sharpened color with its source alpha. `cancel` is polled before each
/// row.
///
/// # Errors
/// [`CasError::RegionOutOfBounds`] if `region` does not fit in the bounds of
/// either raster, or, with [`EdgeMode::Image`], if the neighborhoods of its
/// pixels reach outside the source bounds. Nothing is written in that case.
pub fn render<D, S, C>(
    dst: &mut D,
    src: &S,
    region: Region,
    params: CasParams,
    cancel: &C,
) -> CasResult<RenderStatus>
where
    D: RasterMut + ?Sized,
    S: Raster + ?Sized,
    C: CancelSignal + ?Sized,
{
    for bounds in [src.bounds(), dst.bounds()] {
        if !bounds.contains_region(&region) {
            return Err(CasError::RegionOutOfBounds { region, bounds });
        }
    }

    let (width, height) = src.dimensions();
    let edges = match params.edge_mode {
        EdgeMode::Region => region,
        EdgeMode::Image => Region::from_size(width, height),
    };

    // Image-relative edges sample one pixel past the region on every side
    // that is not an image edge.
    if params.edge_mode == EdgeMode::Image && !region.is_empty() {
        let sampled = Region::new(
            region.left.saturating_sub(1),
            region.top.saturating_sub(1),
            (region.right + 1).min(width),
            (region.bottom + 1).min(height),
        );
        let bounds = src.bounds();
        if !bounds.contains_region(&sampled) {
            return Err(CasError::RegionOutOfBounds { region: sampled, bounds });
        }
    }
    trace!(%region, "cas::render");

    for y in region.top..region.bottom {
        if cancel.is_cancelled() {
            debug!(%region, row = y, "CAS render cancelled");
            return Ok(RenderStatus::Cancelled);
        }
        for x in region.left..region.right {
            let px = src.get_pixel(x, y);
            if edges.is_edge(x, y) {
                dst.set_pixel(x, y, px);
                continue;
            }

            let n = Neighborhood::sample(src, x, y);
            dst.set_pixel(x, y, sharpen_pixel(&n, &params).to_rgba8(px.a));
        }
    }

    Ok(RenderStatus::Completed)
}

/// Render a batch of regions in order, stopping at the first cancellation.
pub fn render_regions<D, S, C>(
    dst: &mut D,
    src: &S,
    regions: &[Region],
    params: CasParams,
    cancel: &C,
) -> CasResult<RenderStatus>
where
    D: RasterMut + ?Sized,
    S: Raster + ?Sized,
    C: CancelSignal + ?Sized,
{
    for &region in regions {
        if render(dst, src, region, params, cancel)?.is_cancelled() {
            return Ok(RenderStatus::Cancelled);
        }
    }
    Ok(RenderStatus::Completed)
}

// ============================================================================
// Whole-image API
// ============================================================================

/// Apply CAS to a whole RGB or RGBA u8 image.
///
/// Uses image-relative edges and renders tiles in parallel, so the result
/// does not depend on the number of threads.
///
/// # Arguments
/// * `input` - Image with 3 or 4 channels (height, width, channels)
/// * `sharpening` - Sharpening intensity (0.0-1.0, default 1.0)
/// * `contrast` - Contrast adaptation (0.0-1.0, default 0.0)
///
/// # Returns
/// Sharpened image with same shape, alpha preserved
pub fn cas_rgba_u8(input: ArrayView3<u8>, sharpening: f64, contrast: f64) -> CasResult<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;

    let params = CasParams {
        sharpening,
        contrast,
        edge_mode: EdgeMode::Image,
    };
    debug!(width, height, channels, sharpening, contrast, "Applying contrast adaptive sharpening");

    let mut output = Array3::<u8>::zeros((height, width, channels));
    render_tiled(
        output.view_mut(),
        input,
        &Tiling::auto(width, height),
        params,
        &NeverCancel,
    )?;
    Ok(output)
}
