use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::dilate;
use imageproc::point::Point;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::analysis::shadow_mask::{MaskConfig, ShadowMaskExtractor};
use crate::error::Result;
use crate::geometry::Contour;
use crate::image_utils::{lightness_channel, normalize_to_u8};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardnessConfig {
    pub block_size: u32,
    pub c_value: i16,
    /// Mean normalized edge gradient above which a shadow counts as hard.
    pub gradient_threshold: f64,
    pub min_contour_area: f64,
    /// Dilation radius of the boundary band; 1 gives a ~3 px band.
    pub band_radius: u8,
}

impl Default for HardnessConfig {
    fn default() -> Self {
        Self {
            block_size: 51,
            c_value: 8,
            gradient_threshold: 15.0,
            min_contour_area: 100.0,
            band_radius: 1,
        }
    }
}

/// Pixel-disjoint hard/soft shadow masks.
#[derive(Debug, Clone)]
pub struct HardnessMasks {
    pub hard: GrayImage,
    pub soft: GrayImage,
}

pub struct ShadowHardnessClassifier {
    config: HardnessConfig,
}

impl ShadowHardnessClassifier {
    pub fn new() -> Self {
        Self::with_config(HardnessConfig::default())
    }

    pub fn with_config(config: HardnessConfig) -> Self {
        Self { config }
    }

    /// Splits detected shadow regions into hard and soft masks by the
    /// sharpness of their boundary gradient.
    pub fn classify(&self, image: &RgbImage) -> Result<HardnessMasks> {
        let mask_config = MaskConfig {
            block_size: self.config.block_size,
            c_value: self.config.c_value,
            min_contour_area: self.config.min_contour_area,
            ..MaskConfig::default()
        };
        let shadow = ShadowMaskExtractor::with_config(mask_config).extract(image)?;

        let (width, height) = image.dimensions();
        let gradient = normalized_gradient_magnitude(&lightness_channel(image));

        let mut hard = GrayImage::new(width, height);
        let mut soft = GrayImage::new(width, height);
        let mut hard_count = 0usize;

        for contour in &shadow.contours {
            let band = boundary_band(contour, width, height, self.config.band_radius);

            let mut total = 0.0;
            let mut count = 0usize;
            for (x, y, pixel) in band.enumerate_pixels() {
                if pixel[0] > 0 {
                    total += gradient[[y as usize, x as usize]];
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }

            let mean_gradient = total / count as f64;
            if mean_gradient > self.config.gradient_threshold {
                fill_contour(&mut hard, contour);
                hard_count += 1;
            } else {
                fill_contour(&mut soft, contour);
            }
        }

        // A nested region can fall inside another contour's fill; hard
        // wins ties so the masks stay pixel-disjoint.
        for (hard_pixel, soft_pixel) in hard.iter().zip(soft.iter_mut()) {
            if *hard_pixel > 0 {
                *soft_pixel = 0;
            }
        }

        log::debug!(
            "hardness: {} hard / {} soft contour(s)",
            hard_count,
            shadow.contours.len() - hard_count
        );

        Ok(HardnessMasks { hard, soft })
    }
}

impl Default for ShadowHardnessClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Sobel magnitude of the lightness channel, min-max normalized to 0..=255.
fn normalized_gradient_magnitude(lightness: &GrayImage) -> Array2<f64> {
    let dx = horizontal_sobel(lightness);
    let dy = vertical_sobel(lightness);

    let (width, height) = lightness.dimensions();
    let mut magnitude = Array2::zeros((height as usize, width as usize));
    for y in 0..height {
        for x in 0..width {
            let gx = dx.get_pixel(x, y)[0] as f64;
            let gy = dy.get_pixel(x, y)[0] as f64;
            magnitude[[y as usize, x as usize]] = (gx * gx + gy * gy).sqrt();
        }
    }

    normalize_to_u8(&magnitude)
}

/// Rasterizes the closed contour outline and thickens it into a band.
fn boundary_band(contour: &Contour, width: u32, height: u32, radius: u8) -> GrayImage {
    let mut band = GrayImage::new(width, height);
    let points = contour.points();

    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            &mut band,
            (x0 as f32, y0 as f32),
            (x1 as f32, y1 as f32),
            Luma([255]),
        );
    }

    dilate(&band, Norm::LInf, radius)
}

/// Fills the contour interior. Consecutive duplicate points and a closing
/// point equal to the first are removed first; polygon fill requires an
/// open vertex list.
fn fill_contour(mask: &mut GrayImage, contour: &Contour) {
    let mut vertices: Vec<Point<i32>> = Vec::with_capacity(contour.len());
    for &(x, y) in contour.points() {
        let point = Point::new(x, y);
        if vertices.last() != Some(&point) {
            vertices.push(point);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    if vertices.len() < 3 {
        for point in &vertices {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < mask.width()
                && (point.y as u32) < mask.height()
            {
                mask.put_pixel(point.x as u32, point.y as u32, Luma([255]));
            }
        }
        return;
    }

    draw_polygon_mut(mask, &vertices, Luma([255]));
}
