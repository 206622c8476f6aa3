//! Pixel access for the sharpening kernel.
//!
//! The kernel only needs indexed reads from the source and indexed writes
//! to the destination. [`Raster`] and [`RasterMut`] describe that surface;
//! they are implemented for every `ndarray` 3D `u8` array laid out as
//! `(height, width, channels)` and for [`RowBand`], a mutable window onto a
//! run of rows used by the parallel dispatcher.
//!
//! ## Channel layouts
//!
//! | Channels | Read alpha | Write alpha |
//! |----------|------------|-------------|
//! | 4 (RGBA) | stored     | stored      |
//! | 3 (RGB)  | 255        | dropped     |

use std::fmt;

use ndarray::{ArrayBase, ArrayViewMut3, Data, DataMut, Ix3};

use crate::error::{CasError, CasResult};

/// One 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Gray pixel with the given alpha.
    #[inline]
    pub const fn gray(v: u8, a: u8) -> Self {
        Self { r: v, g: v, b: v, a }
    }
}

/// Axis-aligned pixel rectangle. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Region {
    #[inline]
    pub const fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self { left, top, right, bottom }
    }

    /// Region anchored at the origin covering `width` x `height` pixels.
    #[inline]
    pub const fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// `true` if `other` lies entirely inside `self`. An empty region with
    /// ordered corners inside `self` counts as contained.
    #[inline]
    pub fn contains_region(&self, other: &Region) -> bool {
        other.left <= other.right
            && other.top <= other.bottom
            && other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// `true` for pixels on the first or last row or column of the region.
    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        x == self.left || y == self.top || x + 1 == self.right || y + 1 == self.bottom
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})x[{}, {})",
            self.left, self.right, self.top, self.bottom
        )
    }
}

/// Read access to an 8-bit image.
pub trait Raster {
    /// Full image size as `(width, height)`.
    fn dimensions(&self) -> (usize, usize);

    /// Rectangle that may be addressed through this raster.
    fn bounds(&self) -> Region {
        let (width, height) = self.dimensions();
        Region::from_size(width, height)
    }

    /// Pixel at `(x, y)` in image coordinates.
    fn get_pixel(&self, x: usize, y: usize) -> Rgba8;
}

/// Write access to an 8-bit image.
pub trait RasterMut: Raster {
    /// Store `px` at `(x, y)` in image coordinates.
    fn set_pixel(&mut self, x: usize, y: usize, px: Rgba8);
}

/// Check the channel count of an `(H, W, C)` array.
pub fn check_channels(channels: usize) -> CasResult<()> {
    match channels {
        3 | 4 => Ok(()),
        n => Err(CasError::UnsupportedChannels(n)),
    }
}

#[inline]
fn read_px<S: Data<Elem = u8>>(image: &ArrayBase<S, Ix3>, x: usize, y: usize) -> Rgba8 {
    let a = if image.dim().2 == 4 { image[[y, x, 3]] } else { 255 };
    Rgba8::new(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]], a)
}

#[inline]
fn write_px<S: DataMut<Elem = u8>>(image: &mut ArrayBase<S, Ix3>, x: usize, y: usize, px: Rgba8) {
    image[[y, x, 0]] = px.r;
    image[[y, x, 1]] = px.g;
    image[[y, x, 2]] = px.b;
    if image.dim().2 == 4 {
        image[[y, x, 3]] = px.a;
    }
}

impl<S: Data<Elem = u8>> Raster for ArrayBase<S, Ix3> {
    #[inline]
    fn dimensions(&self) -> (usize, usize) {
        let (height, width, _) = self.dim();
        (width, height)
    }

    #[inline]
    fn get_pixel(&self, x: usize, y: usize) -> Rgba8 {
        read_px(self, x, y)
    }
}

impl<S: DataMut<Elem = u8>> RasterMut for ArrayBase<S, Ix3> {
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, px: Rgba8) {
        write_px(self, x, y, px)
    }
}

/// Mutable window onto rows `top..top + rows` of a taller image.
///
/// Coordinates stay in image space: `set_pixel(x, y, ..)` writes row `y - top`
/// of the underlying view. `bounds()` reports only the rows the band owns.
pub struct RowBand<'a> {
    view: ArrayViewMut3<'a, u8>,
    top: usize,
    image_height: usize,
}

impl<'a> RowBand<'a> {
    pub fn new(view: ArrayViewMut3<'a, u8>, top: usize, image_height: usize) -> Self {
        debug_assert!(top + view.dim().0 <= image_height);
        Self { view, top, image_height }
    }

    /// First image row covered by the band.
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    /// Number of rows in the band.
    #[inline]
    pub fn rows(&self) -> usize {
        self.view.dim().0
    }
}

impl Raster for RowBand<'_> {
    #[inline]
    fn dimensions(&self) -> (usize, usize) {
        (self.view.dim().1, self.image_height)
    }

    #[inline]
    fn bounds(&self) -> Region {
        Region::new(0, self.top, self.view.dim().1, self.top + self.rows())
    }

    #[inline]
    fn get_pixel(&self, x: usize, y: usize) -> Rgba8 {
        read_px(&self.view, x, y - self.top)
    }
}

impl RasterMut for RowBand<'_> {
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, px: Rgba8) {
        write_px(&mut self.view, x, y - self.top, px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Axis};

    #[test]
    fn test_region_edges() {
        let r = Region::new(2, 3, 6, 8);
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 5);
        assert_eq!(r.area(), 20);
        assert!(r.is_edge(2, 5));
        assert!(r.is_edge(4, 3));
        assert!(r.is_edge(5, 5));
        assert!(r.is_edge(4, 7));
        assert!(!r.is_edge(3, 4));
        assert!(!r.is_edge(4, 6));
    }

    #[test]
    fn test_region_contains_region() {
        let outer = Region::from_size(10, 10);
        assert!(outer.contains_region(&Region::new(0, 0, 10, 10)));
        assert!(outer.contains_region(&Region::new(3, 3, 3, 3)));
        assert!(!outer.contains_region(&Region::new(5, 5, 11, 6)));
        assert!(!outer.contains_region(&Region::new(6, 0, 5, 4)));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(Region::new(1, 2, 3, 4).to_string(), "[1, 3)x[2, 4)");
    }

    #[test]
    fn test_rgba_array_get_set() {
        let mut img = Array3::<u8>::zeros((2, 3, 4));
        img.set_pixel(2, 1, Rgba8::new(1, 2, 3, 4));

        assert_eq!(img[[1, 2, 0]], 1);
        assert_eq!(img[[1, 2, 3]], 4);
        assert_eq!(img.get_pixel(2, 1), Rgba8::new(1, 2, 3, 4));
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.bounds(), Region::from_size(3, 2));
    }

    #[test]
    fn test_rgb_array_alpha_is_opaque() {
        let mut img = Array3::<u8>::zeros((1, 1, 3));
        img.set_pixel(0, 0, Rgba8::new(10, 20, 30, 7));

        assert_eq!(img.get_pixel(0, 0), Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_check_channels() {
        assert!(check_channels(3).is_ok());
        assert!(check_channels(4).is_ok());
        assert_eq!(check_channels(1), Err(CasError::UnsupportedChannels(1)));
    }

    #[test]
    fn test_row_band_uses_image_coordinates() {
        let mut img = Array3::<u8>::zeros((6, 2, 4));
        {
            let mut bands: Vec<_> = img.axis_chunks_iter_mut(Axis(0), 4).collect();
            let mut band = RowBand::new(bands.remove(1), 4, 6);

            assert_eq!(band.top(), 4);
            assert_eq!(band.rows(), 2);
            assert_eq!(band.dimensions(), (2, 6));
            assert_eq!(band.bounds(), Region::new(0, 4, 2, 6));

            band.set_pixel(1, 5, Rgba8::gray(9, 200));
            assert_eq!(band.get_pixel(1, 5), Rgba8::gray(9, 200));
        }
        assert_eq!(img.get_pixel(1, 5), Rgba8::gray(9, 200));
    }
}
