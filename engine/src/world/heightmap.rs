//! Heightmap Input
//!
//! A heightmap is a monochrome width x height grid of samples normalized to
//! [0, 1]. It is read once at terrain construction time and handed to
//! [`HeightField::from_heightmap`](super::heightfield::HeightField::from_heightmap).

use std::path::Path;

use crate::error::{Result, TerrainError};

/// Dense grid of normalized height samples, row-major (`x + y * width`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl HeightMap {
    /// Wrap an existing sample buffer.
    ///
    /// Fails if either dimension is zero or the buffer length is not
    /// `width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyHeightmap { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(TerrainError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a heightmap by evaluating `f(x, y)` for every sample.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Result<Self> {
        let samples = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, samples)
    }

    /// Flat heightmap with every sample at `level`.
    pub fn flat(width: u32, height: u32, level: f32) -> Result<Self> {
        Self::new(width, height, vec![level; width as usize * height as usize])
    }

    /// Load a heightmap from an image file.
    ///
    /// The image is converted to 16-bit luminance so 8-bit and 16-bit
    /// grayscale sources keep their full precision. A missing file is reported
    /// as [`TerrainError::HeightmapNotFound`] rather than a decode error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TerrainError::HeightmapNotFound {
                path: path.to_path_buf(),
            });
        }

        let image = image::open(path)?;
        let heightmap = Self::from_image(&image)?;
        log::debug!(
            "Loaded heightmap {} ({}x{})",
            path.display(),
            heightmap.width,
            heightmap.height
        );
        Ok(heightmap)
    }

    /// Convert a decoded image into normalized samples.
    pub fn from_image(image: &image::DynamicImage) -> Result<Self> {
        let luma = image.to_luma16();
        let (width, height) = luma.dimensions();
        let samples = luma
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / u16::MAX as f32)
            .collect();
        Self::new(width, height, samples)
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at grid coordinate `(x, y)`. Coordinates are clamped to the grid.
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.samples[x + y * self.width as usize]
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
