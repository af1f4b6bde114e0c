use image::GrayImage;

use crate::analysis::shadow_mask::outer_contours;
use crate::geometry::LightVector;

pub const DEFAULT_MIN_CONTOUR_AREA: f64 = 500.0;

/// Infers the dominant light direction from the orientation of shadow
/// regions already present in a background.
pub struct LightDirectionEstimator {
    min_contour_area: f64,
}

impl LightDirectionEstimator {
    pub fn new() -> Self {
        Self::with_min_area(DEFAULT_MIN_CONTOUR_AREA)
    }

    pub const fn with_min_area(min_contour_area: f64) -> Self {
        Self { min_contour_area }
    }

    /// Returns `None` when no contour has both area above the minimum and
    /// at least 5 boundary points; the caller must supply a fallback.
    pub fn infer(&self, mask: &GrayImage) -> Option<LightVector> {
        let mut weighted_degrees = 0.0;
        let mut total_weight = 0.0;

        for contour in outer_contours(mask, 0.0) {
            let area = contour.area();
            if area <= self.min_contour_area {
                continue;
            }
            let Some(orientation) = contour.orientation_degrees() else {
                continue;
            };

            // Arithmetic mean of undirected angles, weighted by area.
            // Contributions near the 0/180 seam do not wrap.
            weighted_degrees += orientation * area;
            total_weight += area;
        }

        if total_weight == 0.0 {
            log::warn!("could not infer light direction: no significant shadows found");
            return None;
        }

        let vector = LightVector::from_angle_degrees(weighted_degrees / total_weight);
        log::info!(
            "inferred light vector ({:.3}, {:.3})",
            vector.x,
            vector.y
        );
        Some(vector)
    }
}

impl Default for LightDirectionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill_rect(mask: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn empty_mask_yields_no_direction() {
        let mask = GrayImage::new(200, 200);
        assert!(LightDirectionEstimator::new().infer(&mask).is_none());
    }

    #[test]
    fn contour_below_min_area_yields_no_direction() {
        let mut mask = GrayImage::new(200, 200);
        // 10x10 region: enclosed area ~100, under the default 500.
        fill_rect(&mut mask, 50, 50, 60, 60);

        assert!(LightDirectionEstimator::new().infer(&mask).is_none());
    }

    #[test]
    fn inferred_vector_is_unit_norm() {
        let mut mask = GrayImage::new(300, 200);
        fill_rect(&mut mask, 40, 90, 260, 110);

        let vector = LightDirectionEstimator::new().infer(&mask).unwrap();
        assert!((vector.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn horizontal_shadow_points_along_x() {
        let mut mask = GrayImage::new(300, 200);
        fill_rect(&mut mask, 40, 90, 260, 110);

        let vector = LightDirectionEstimator::new().infer(&mask).unwrap();
        assert!(vector.x.abs() > 0.99, "got ({}, {})", vector.x, vector.y);
        assert!(vector.y.abs() < 0.1, "got ({}, {})", vector.x, vector.y);
    }

    #[test]
    fn vertical_shadow_points_along_y() {
        let mut mask = GrayImage::new(200, 300);
        fill_rect(&mut mask, 90, 40, 110, 260);

        let vector = LightDirectionEstimator::new().infer(&mask).unwrap();
        assert!(vector.y.abs() > 0.99, "got ({}, {})", vector.x, vector.y);
        assert!(vector.x.abs() < 0.1, "got ({}, {})", vector.x, vector.y);
    }

    #[test]
    fn larger_contour_dominates_the_weighted_mean() {
        let mut mask = GrayImage::new(400, 400);
        // Big horizontal bar (~0 degrees) and a small vertical one (~90).
        fill_rect(&mut mask, 20, 50, 380, 80);
        fill_rect(&mut mask, 200, 200, 230, 320);

        let vector = LightDirectionEstimator::new().infer(&mask).unwrap();
        let angle = vector.angle_degrees().abs();
        assert!(
            angle < 45.0,
            "expected the large bar to dominate, got {angle} degrees"
        );
    }

    #[test]
    fn lowering_min_area_admits_smaller_contours() {
        let mut mask = GrayImage::new(200, 200);
        fill_rect(&mut mask, 50, 50, 60, 60);

        let estimator = LightDirectionEstimator::with_min_area(50.0);
        assert!(estimator.infer(&mask).is_some());
    }
}
