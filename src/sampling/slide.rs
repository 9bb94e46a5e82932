//! Multi-resolution slide access and the patches read from it
//!
//! A slide is addressed by `(level, position)` where level 0 is full resolution.
//! Positions handed to [`SlideImage::read_region`] are in the pixel space of the
//! requested level.

use crate::io::error::{Result, invalid_parameter};
use image::{RgbaImage, imageops::FilterType};
use ndarray::Array3;

/// Number of channels in every patch (RGBA)
pub const CHANNELS: usize = 4;

/// Read-only multi-resolution image
pub trait SlideImage {
    /// Number of resolution levels
    fn level_count(&self) -> usize;

    /// Pixel dimensions `(width, height)` of a level, `None` if it doesn't exist
    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)>;

    /// Read a square RGBA tile whose top-left corner is `origin`
    ///
    /// Pixels outside the level are transparent black.
    ///
    /// # Errors
    ///
    /// Returns an error if the level doesn't exist or the tile can't be read
    fn read_region(&self, origin: (u32, u32), level: usize, size: u32) -> Result<Patch>;
}

/// Square RGBA tile read from a slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pixels: Array3<u8>,
    origin: (u32, u32),
    level: usize,
}

impl Patch {
    /// Wrap pixel data of shape `(size, size, 4)`
    ///
    /// # Errors
    ///
    /// Returns an error if the array isn't square with four channels
    pub fn new(pixels: Array3<u8>, origin: (u32, u32), level: usize) -> Result<Self> {
        let (rows, cols, channels) = pixels.dim();
        if rows != cols || channels != CHANNELS {
            return Err(invalid_parameter(
                "pixels",
                &format!("{rows}x{cols}x{channels}"),
                &"patches must be square RGBA tiles",
            ));
        }
        Ok(Self {
            pixels,
            origin,
            level,
        })
    }

    /// Pixel data indexed by `(row, col, channel)`
    pub const fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    /// Top-left corner in level coordinates
    pub const fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Level the patch was read from
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Side length in pixels
    pub fn size(&self) -> usize {
        self.pixels.dim().0
    }

    /// Mean over every channel value, alpha included
    pub fn mean_intensity(&self) -> f64 {
        let count = self.pixels.len();
        if count == 0 {
            return 0.0;
        }
        let total: u64 = self.pixels.iter().map(|&v| u64::from(v)).sum();
        total as f64 / count as f64
    }

    /// Copy the pixels into an image buffer for export
    pub fn to_rgba_image(&self) -> RgbaImage {
        let side = self.size() as u32;
        RgbaImage::from_fn(side, side, |x, y| {
            let mut rgba = [0u8; CHANNELS];
            for (c, slot) in rgba.iter_mut().enumerate() {
                *slot = self
                    .pixels
                    .get((y as usize, x as usize, c))
                    .copied()
                    .unwrap_or(0);
            }
            image::Rgba(rgba)
        })
    }
}

/// In-memory slide pyramid built by repeated downsampling
#[derive(Debug, Clone)]
pub struct SlidePyramid {
    levels: Vec<RgbaImage>,
}

impl SlidePyramid {
    /// Use the given images as levels, finest first
    ///
    /// # Errors
    ///
    /// Returns an error if no levels are given
    pub fn from_levels(levels: Vec<RgbaImage>) -> Result<Self> {
        if levels.is_empty() {
            return Err(invalid_parameter(
                "levels",
                &0,
                &"a slide needs at least one level",
            ));
        }
        Ok(Self { levels })
    }

    /// Build `level_count` levels from a full-resolution image
    ///
    /// Each level is `downsample` times smaller per axis than the previous one.
    /// Building stops early once a level would shrink below one pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if `level_count` is zero or `downsample` is below 2
    pub fn build(base: RgbaImage, level_count: usize, downsample: u32) -> Result<Self> {
        if level_count == 0 {
            return Err(invalid_parameter(
                "level_count",
                &level_count,
                &"must be positive",
            ));
        }
        if downsample < 2 {
            return Err(invalid_parameter(
                "downsample",
                &downsample,
                &"must be at least 2",
            ));
        }

        let mut levels = Vec::with_capacity(level_count);
        levels.push(base);
        while levels.len() < level_count {
            let Some(previous) = levels.last() else {
                break;
            };
            let width = previous.width() / downsample;
            let height = previous.height() / downsample;
            if width == 0 || height == 0 {
                break;
            }
            let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
            levels.push(next);
        }

        Ok(Self { levels })
    }
}

impl SlideImage for SlidePyramid {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
        self.levels.get(level).map(RgbaImage::dimensions)
    }

    fn read_region(&self, origin: (u32, u32), level: usize, size: u32) -> Result<Patch> {
        let image = self.levels.get(level).ok_or_else(|| {
            invalid_parameter(
                "level",
                &level,
                &format!("slide has {} levels", self.levels.len()),
            )
        })?;

        let side = size as usize;
        let pixels = Array3::from_shape_fn((side, side, CHANNELS), |(row, col, channel)| {
            let x = origin.0.checked_add(col as u32);
            let y = origin.1.checked_add(row as u32);
            match (x, y) {
                (Some(x), Some(y)) => image
                    .get_pixel_checked(x, y)
                    .and_then(|p| p.0.get(channel).copied())
                    .unwrap_or(0),
                _ => 0,
            }
        });

        Patch::new(pixels, origin, level)
    }
}
