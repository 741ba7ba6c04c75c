//! Optional mask restricting where forcing reaches the liquid.
//!
//! The mask is resampled once to the simulation resolution. A weight of 0
//! blocks forcing completely, 1 lets it through unchanged.

use std::path::Path;

use bevy_log::info;
use image::DynamicImage;

use crate::error::LiquidError;
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq)]
pub struct ForceMask {
    weights: Grid<f32>,
}

impl ForceMask {
    /// Builds a mask from a weight function evaluated per texel.
    pub fn from_fn(size: usize, f: impl Fn(usize, usize) -> f32) -> Self {
        Self {
            weights: Grid::from_fn(size, |x, z| f(x, z).clamp(0.0, 1.0)),
        }
    }

    /// Resamples a row-major `src_width x src_height` weight image to
    /// `size x size` by nearest texel-centre lookup. Row 0 of the source is
    /// the far (+Z) edge of the liquid, as with a texture viewed from above.
    pub fn from_weights(
        src_width: usize,
        src_height: usize,
        weights: &[f32],
        size: usize,
    ) -> Result<Self, LiquidError> {
        if src_width == 0 || src_height == 0 || weights.len() != src_width * src_height {
            return Err(LiquidError::configuration(
                "mask",
                format!("{src_width}x{src_height} ({} samples)", weights.len()),
                "mask dimensions do not match its data",
            ));
        }

        Ok(Self::from_fn(size, |x, z| {
            let u = (x as f32 + 0.5) / size as f32;
            let v = (z as f32 + 0.5) / size as f32;
            let sx = ((u * src_width as f32) as usize).min(src_width - 1);
            let row = ((v * src_height as f32) as usize).min(src_height - 1);
            let sy = src_height - 1 - row;
            weights[sy * src_width + sx]
        }))
    }

    /// Uses the alpha channel when the image has one, luminance otherwise.
    pub fn from_image(image: &DynamicImage, size: usize) -> Result<Self, LiquidError> {
        let has_alpha = image.color().has_alpha();
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let weights: Vec<f32> = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if has_alpha {
                    a as f32 / 255.0
                } else {
                    (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0
                }
            })
            .collect();

        Self::from_weights(width as usize, height as usize, &weights, size)
    }

    pub fn load(path: &Path, size: usize) -> Result<Self, LiquidError> {
        let image = image::open(path).map_err(|err| {
            LiquidError::configuration("mask", path.display(), err.to_string())
        })?;
        info!(
            "Loaded liquid force mask {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_image(&image, size)
    }

    #[inline]
    pub fn weight(&self, x: usize, z: usize) -> f32 {
        self.weights.get(x, z)
    }

    pub fn size(&self) -> usize {
        self.weights.size()
    }

    /// Multiplies every texel of `buffer` by its mask weight.
    pub fn apply(&self, buffer: &mut Grid<f32>) {
        debug_assert_eq!(buffer.size(), self.size());
        for (value, weight) in buffer.as_mut_slice().iter_mut().zip(self.weights.iter()) {
            *value *= weight;
        }
    }
}
