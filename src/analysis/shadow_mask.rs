use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::filter::{box_filter, median_filter};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadowError};
use crate::geometry::Contour;
use crate::image_utils::lightness_channel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Side length of the local-mean neighborhood. Must be odd.
    pub block_size: u32,
    /// Constant subtracted from the local mean before thresholding.
    pub c_value: i16,
    /// Median smoothing radius applied to the lightness channel.
    pub median_radius: u32,
    /// Contours below this enclosed area are discarded.
    pub min_contour_area: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            block_size: 51,
            c_value: 8,
            median_radius: 2,
            min_contour_area: 100.0,
        }
    }
}

/// Binary shadow mask plus the outer boundaries of its connected regions.
#[derive(Debug, Clone)]
pub struct ShadowMask {
    pub mask: GrayImage,
    pub contours: Vec<Contour>,
}

pub struct ShadowMaskExtractor {
    config: MaskConfig,
}

impl ShadowMaskExtractor {
    pub fn new() -> Self {
        Self::with_config(MaskConfig::default())
    }

    pub fn with_config(config: MaskConfig) -> Self {
        Self { config }
    }

    /// Marks pixels darker than their local neighborhood mean minus
    /// `c_value` as shadow, then traces the outer region boundaries.
    pub fn extract(&self, image: &RgbImage) -> Result<ShadowMask> {
        let (width, height) = image.dimensions();

        if self.config.block_size < 3 || self.config.block_size % 2 == 0 {
            return Err(ShadowError::InvalidBlockSize);
        }
        if width < self.config.block_size || height < self.config.block_size {
            return Err(ShadowError::ImageTooSmall(self.config.block_size));
        }

        let lightness = lightness_channel(image);
        let smoothed = median_filter(
            &lightness,
            self.config.median_radius,
            self.config.median_radius,
        );

        let radius = (self.config.block_size - 1) / 2;
        let local_mean = box_filter(&smoothed, radius, radius);

        let mut mask = GrayImage::new(width, height);
        for (x, y, pixel) in smoothed.enumerate_pixels() {
            let threshold = local_mean.get_pixel(x, y)[0] as i16 - self.config.c_value;
            if (pixel[0] as i16) < threshold {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let contours = outer_contours(&mask, self.config.min_contour_area);
        log::debug!(
            "shadow mask: {} contour(s) above area {}",
            contours.len(),
            self.config.min_contour_area
        );

        Ok(ShadowMask { mask, contours })
    }
}

impl Default for ShadowMaskExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Outer region boundaries of a binary mask with enclosed area >= `min_area`.
pub(crate) fn outer_contours(mask: &GrayImage, min_area: f64) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .map(|contour| Contour::new(contour.points.iter().map(|p| (p.x, p.y)).collect()))
        .filter(|contour| contour.area() >= min_area)
        .collect()
}
