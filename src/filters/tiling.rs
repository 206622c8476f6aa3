//! Tile partitioning and parallel dispatch.
//!
//! A [`Tiling`] cuts an image into a grid of disjoint regions. The grid rows
//! ("bands") are rendered in parallel with rayon: each band owns its rows of
//! the destination exclusively, so workers never share mutable state. Tiles
//! within one band are rendered in order by the band's worker.

use ndarray::{ArrayView3, ArrayViewMut3, Axis};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::cas::{render_regions, CasParams, RenderStatus};
use super::raster::{check_channels, Region, RowBand};
use crate::cancel::CancelSignal;
use crate::error::{CasError, CasResult};

/// Lower bound on band height chosen by [`Tiling::auto`].
const MIN_AUTO_ROWS: usize = 16;

/// Bands per worker thread chosen by [`Tiling::auto`].
const BANDS_PER_THREAD: usize = 4;

/// Grid of tiles. Edge tiles are cropped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiling {
    tile_width: usize,
    tile_height: usize,
}

impl Tiling {
    /// Tiles of `tile_width` x `tile_height` pixels.
    pub fn new(tile_width: usize, tile_height: usize) -> CasResult<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(CasError::InvalidParameter(format!(
                "tile size must be > 0, got {tile_width}x{tile_height}"
            )));
        }
        Ok(Self { tile_width, tile_height })
    }

    /// Full-width bands of `band_height` rows.
    pub fn rows(band_height: usize) -> CasResult<Self> {
        Self::new(usize::MAX, band_height)
    }

    /// One region covering the whole image.
    pub fn single() -> Self {
        Self {
            tile_width: usize::MAX,
            tile_height: usize::MAX,
        }
    }

    /// Full-width bands sized so every rayon thread gets a few of them.
    pub fn auto(width: usize, height: usize) -> Self {
        let bands = rayon::current_num_threads().max(1) * BANDS_PER_THREAD;
        let band_height = height.div_ceil(bands).max(MIN_AUTO_ROWS);
        trace!(width, height, band_height, "Tiling::auto");
        Self {
            tile_width: usize::MAX,
            tile_height: band_height,
        }
    }

    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    /// Rows per band for an image of `height` rows.
    fn band_height(&self, height: usize) -> usize {
        self.tile_height.min(height).max(1)
    }

    /// Tiles of the band starting at row `top` with `rows` rows.
    fn band_regions(&self, top: usize, rows: usize, width: usize) -> Vec<Region> {
        (0..width)
            .step_by(self.tile_width)
            .map(|left| Region::new(left, top, left.saturating_add(self.tile_width).min(width), top + rows))
            .collect()
    }

    /// All tiles of a `width` x `height` image, row-major. Together they
    /// cover every pixel exactly once.
    pub fn regions(&self, width: usize, height: usize) -> Vec<Region> {
        let band_height = self.band_height(height);
        (0..height)
            .step_by(band_height)
            .flat_map(|top| self.band_regions(top, band_height.min(height - top), width))
            .collect()
    }
}

impl Default for Tiling {
    fn default() -> Self {
        Self::single()
    }
}

/// Render `src` into `dst` tile by tile, bands in parallel.
///
/// Returns [`RenderStatus::Cancelled`] if any tile observed the cancel
/// signal; rows that were not reached keep their previous contents.
///
/// # Errors
/// [`CasError::SizeMismatch`] if the images differ in size,
/// [`CasError::UnsupportedChannels`] for anything but 3 or 4 channels.
pub fn render_tiled<C>(
    mut dst: ArrayViewMut3<u8>,
    src: ArrayView3<u8>,
    tiling: &Tiling,
    params: CasParams,
    cancel: &C,
) -> CasResult<RenderStatus>
where
    C: CancelSignal + ?Sized,
{
    let (height, width, channels) = src.dim();
    let (dst_height, dst_width, dst_channels) = dst.dim();
    check_channels(channels)?;
    check_channels(dst_channels)?;
    if (height, width) != (dst_height, dst_width) {
        return Err(CasError::SizeMismatch {
            src_width: width,
            src_height: height,
            dst_width,
            dst_height,
        });
    }
    if channels != dst_channels {
        return Err(CasError::InvalidDimensions(format!(
            "source has {channels} channels, destination has {dst_channels}"
        )));
    }
    if width == 0 || height == 0 {
        return Ok(RenderStatus::Completed);
    }

    let band_height = tiling.band_height(height);
    debug!(
        width,
        height,
        band_height,
        sharpening = params.sharpening,
        contrast = params.contrast,
        edge_mode = ?params.edge_mode,
        "Rendering CAS tiles"
    );

    let bands: Vec<_> = dst
        .axis_chunks_iter_mut(Axis(0), band_height)
        .enumerate()
        .collect();

    let statuses = bands
        .into_par_iter()
        .map(|(index, view)| {
            let mut band = RowBand::new(view, index * band_height, height);
            let regions = tiling.band_regions(band.top(), band.rows(), width);
            render_regions(&mut band, &src, &regions, params, cancel)
        })
        .collect::<CasResult<Vec<_>>>()?;

    if statuses.iter().any(|s| s.is_cancelled()) {
        debug!("CAS tile pass cancelled");
        return Ok(RenderStatus::Cancelled);
    }
    Ok(RenderStatus::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::NeverCancel;
    use crate::filters::cas::{render, EdgeMode};
    use crate::filters::raster::{Raster, RasterMut, Rgba8};
    use ndarray::Array3;
    use std::sync::atomic::AtomicBool;

    fn pattern(height: usize, width: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((height, width, 4));
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 29) ^ (y * 53)) % 256;
                img.set_pixel(x, y, Rgba8::new(v as u8, (x * 11) as u8, (y * 7) as u8, (v / 2) as u8));
            }
        }
        img
    }

    fn coverage(tiling: &Tiling, width: usize, height: usize) -> Vec<u32> {
        let mut hits = vec![0u32; width * height];
        for r in tiling.regions(width, height) {
            assert!(!r.is_empty(), "empty tile {r}");
            for y in r.top..r.bottom {
                for x in r.left..r.right {
                    hits[y * width + x] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_tiling_rejects_zero() {
        assert!(matches!(Tiling::new(0, 4), Err(CasError::InvalidParameter(_))));
        assert!(matches!(Tiling::rows(0), Err(CasError::InvalidParameter(_))));
    }

    #[test]
    fn test_regions_partition_image() {
        for tiling in [
            Tiling::new(3, 5).unwrap(),
            Tiling::new(7, 2).unwrap(),
            Tiling::new(1, 1).unwrap(),
            Tiling::rows(4).unwrap(),
            Tiling::single(),
            Tiling::auto(17, 23),
        ] {
            let hits = coverage(&tiling, 17, 23);
            assert!(hits.iter().all(|&h| h == 1), "{tiling:?}");
        }
    }

    #[test]
    fn test_regions_layout() {
        let regions = Tiling::new(4, 3).unwrap().regions(10, 5);
        assert_eq!(
            regions,
            vec![
                Region::new(0, 0, 4, 3),
                Region::new(4, 0, 8, 3),
                Region::new(8, 0, 10, 3),
                Region::new(0, 3, 4, 5),
                Region::new(4, 3, 8, 5),
                Region::new(8, 3, 10, 5),
            ]
        );
        assert_eq!(Tiling::single().regions(10, 5), vec![Region::from_size(10, 5)]);
        assert!(Tiling::single().regions(10, 0).is_empty());
    }

    #[test]
    fn test_auto_band_height() {
        let tiling = Tiling::auto(100, 3);
        assert_eq!(tiling.tile_width(), usize::MAX);
        assert!(tiling.tile_height() >= MIN_AUTO_ROWS);
        assert_eq!(tiling.regions(100, 3), vec![Region::from_size(100, 3)]);
    }

    #[test]
    fn test_image_edges_independent_of_tiling() {
        let src = pattern(29, 31);
        let params = CasParams::new(0.9, 0.2).unwrap().with_edge_mode(EdgeMode::Image);

        let mut expected = Array3::<u8>::zeros(src.dim());
        render(&mut expected, &src, Region::from_size(31, 29), params, &NeverCancel).unwrap();

        for tiling in [
            Tiling::new(5, 3).unwrap(),
            Tiling::rows(1).unwrap(),
            Tiling::rows(7).unwrap(),
            Tiling::auto(31, 29),
        ] {
            let mut dst = Array3::<u8>::zeros(src.dim());
            let status = render_tiled(dst.view_mut(), src.view(), &tiling, params, &NeverCancel).unwrap();
            assert_eq!(status, RenderStatus::Completed);
            assert_eq!(dst, expected, "{tiling:?}");
        }
    }

    #[test]
    fn test_region_edges_follow_tiles() {
        let src = pattern(20, 18);
        let params = CasParams::default();
        let tiling = Tiling::new(6, 5).unwrap();

        let mut sequential = Array3::<u8>::zeros(src.dim());
        render_regions(&mut sequential, &src, &tiling.regions(18, 20), params, &NeverCancel).unwrap();

        let mut parallel = Array3::<u8>::zeros(src.dim());
        render_tiled(parallel.view_mut(), src.view(), &tiling, params, &NeverCancel).unwrap();

        assert_eq!(parallel, sequential);
        // Row 5 starts the second band and is copied from the source.
        for x in 0..18 {
            assert_eq!(parallel.get_pixel(x, 5), src.get_pixel(x, 5));
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let src = pattern(12, 12);
        let mut dst = Array3::<u8>::from_elem(src.dim(), 9);
        let cancel = AtomicBool::new(true);

        let status = render_tiled(dst.view_mut(), src.view(), &Tiling::rows(3).unwrap(), CasParams::default(), &cancel)
            .unwrap();
        assert_eq!(status, RenderStatus::Cancelled);
        assert!(dst.iter().all(|&v| v == 9));
    }

    #[test]
    fn test_size_mismatch() {
        let src = pattern(4, 5);
        let mut dst = Array3::<u8>::zeros((5, 4, 4));
        let err = render_tiled(dst.view_mut(), src.view(), &Tiling::single(), CasParams::default(), &NeverCancel)
            .unwrap_err();
        assert_eq!(
            err,
            CasError::SizeMismatch {
                src_width: 5,
                src_height: 4,
                dst_width: 4,
                dst_height: 5,
            }
        );
    }

    #[test]
    fn test_channel_mismatch() {
        let src = pattern(4, 4);
        let mut dst = Array3::<u8>::zeros((4, 4, 3));
        let err = render_tiled(dst.view_mut(), src.view(), &Tiling::single(), CasParams::default(), &NeverCancel)
            .unwrap_err();
        assert!(matches!(err, CasError::InvalidDimensions(_)));
    }

    #[test]
    fn test_rgb_tiled() {
        let src = Array3::<u8>::from_elem((6, 6, 3), 100);
        let mut dst = Array3::<u8>::zeros((6, 6, 3));
        render_tiled(dst.view_mut(), src.view(), &Tiling::rows(2).unwrap(), CasParams::default(), &NeverCancel)
            .unwrap();
        assert_eq!(dst, src);
    }
}
