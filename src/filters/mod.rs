//! Contrast Adaptive Sharpening filter.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! - **Per-pixel kernel** - [`cas::render`] sharpens one region of a raster
//! - **Alpha preservation** - Alpha is copied from the source, never filtered
//! - **Thread-safe** - [`tiling::render_tiled`] renders disjoint row bands with rayon
//! - **Cooperative cancellation** - Polled once per row

pub mod cas;
pub mod color;
pub mod raster;
pub mod tiling;
