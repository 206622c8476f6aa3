//! RGB working type and 8-bit color conversion helpers.
//!
//! The kernel does its arithmetic on [`Rgb`], a plain triple of `f64`
//! channel values with elementwise operators. Conversion from bytes divides
//! by 255 in single precision and widens the result; conversion back
//! multiplies by 255 and truncates.

use std::ops::{Add, Mul, Neg, Sub};

use super::raster::Rgba8;

/// Normalized RGB triple used during per-pixel computation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Same value in every channel.
    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Apply `f` to every channel.
    #[inline]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Combine two triples channel by channel.
    #[inline]
    pub fn zip(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }

    /// Elementwise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        self.zip(other, |a, b| if a < b { a } else { b })
    }

    /// Elementwise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        self.zip(other, |a, b| if a > b { a } else { b })
    }

    /// Clamp every channel to [0, 1].
    #[inline]
    pub fn saturate(self) -> Self {
        self.map(|v| v.clamp(0.0, 1.0))
    }

    /// Elementwise `1 / v`, with 1 substituted for a zero channel.
    #[inline]
    pub fn rcp(self) -> Self {
        self.map(|v| if v == 0.0 { 1.0 } else { 1.0 / v })
    }

    /// Elementwise `1 / sqrt(v)` through [`Rgb::rcp`], so zero maps to 1.
    #[inline]
    pub fn rsqrt(self) -> Self {
        self.map(f64::sqrt).rcp()
    }

    /// `self * (1 - amount) + other * amount`
    #[inline]
    pub fn lerp(self, other: Self, amount: f64) -> Self {
        self * (1.0 - amount) + other * amount
    }

    /// Normalize the color channels of an 8-bit pixel.
    #[inline]
    pub fn from_rgba8(px: Rgba8) -> Self {
        Self::new(
            unorm8_to_f64(px.r),
            unorm8_to_f64(px.g),
            unorm8_to_f64(px.b),
        )
    }

    /// Convert back to bytes by truncation, attaching `alpha` unchanged.
    #[inline]
    pub fn to_rgba8(self, alpha: u8) -> Rgba8 {
        Rgba8::new(
            f64_to_unorm8(self.r),
            f64_to_unorm8(self.g),
            f64_to_unorm8(self.b),
            alpha,
        )
    }
}

impl Add for Rgb {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }
}

impl Sub for Rgb {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }
}

impl Mul for Rgb {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a * b)
    }
}

impl Mul<f64> for Rgb {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.map(|v| v * rhs)
    }
}

impl Neg for Rgb {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

/// 0-255 -> 0.0-1.0. The quotient is taken in `f32` and widened so that a
/// flat neighborhood truncates back to the byte it came from.
#[inline]
pub fn unorm8_to_f64(v: u8) -> f64 {
    (v as f32 / 255.0) as f64
}

/// 0.0-1.0 -> 0-255 by truncation. Out-of-range input saturates at the
/// `u8` limits and NaN maps to 0.
#[inline]
pub fn f64_to_unorm8(v: f64) -> u8 {
    (v * 255.0) as u8
}
