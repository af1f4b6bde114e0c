use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::geometry::ShadowPolygon;
use crate::image_utils::gaussian_sigma_for_kernel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonRenderConfig {
    /// Feathering kernel size; larger than the perspective renderer's.
    pub blur_kernel: u32,
    /// Opacity cap applied to the filled polygon mask.
    pub max_opacity: f64,
    /// Polygons enclosing less area than this render as fully transparent.
    pub min_polygon_area: f64,
}

impl Default for PolygonRenderConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 55,
            max_opacity: 0.5,
            min_polygon_area: 5.0,
        }
    }
}

/// Fills the shadow polygon directly, ignoring the cutout silhouette;
/// the fallback when silhouette fidelity is unneeded.
pub struct PolygonShadowRenderer {
    config: PolygonRenderConfig,
}

impl PolygonShadowRenderer {
    pub fn new() -> Self {
        Self::with_config(PolygonRenderConfig::default())
    }

    pub fn with_config(config: PolygonRenderConfig) -> Self {
        Self { config }
    }

    /// Absent or degenerate polygons yield an all-transparent layer.
    pub fn render(
        &self,
        polygon: Option<&ShadowPolygon>,
        canvas_width: u32,
        canvas_height: u32,
    ) -> RgbaImage {
        let transparent = || RgbaImage::new(canvas_width, canvas_height);

        let Some(polygon) = polygon else {
            return transparent();
        };
        if polygon.area() < self.config.min_polygon_area {
            log::debug!("shadow too small to render");
            return transparent();
        }
        if canvas_width == 0 || canvas_height == 0 {
            return transparent();
        }

        let mut vertices: Vec<Point<i32>> = Vec::with_capacity(4);
        for corner in polygon.corners() {
            let point = Point::new(corner.x.round() as i32, corner.y.round() as i32);
            if vertices.last() != Some(&point) {
                vertices.push(point);
            }
        }
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return transparent();
        }

        let mut mask = GrayImage::new(canvas_width, canvas_height);
        draw_polygon_mut(&mut mask, &vertices, Luma([255]));

        let blurred = gaussian_blur_f32(
            &mask,
            gaussian_sigma_for_kernel(self.config.blur_kernel),
        );

        RgbaImage::from_fn(canvas_width, canvas_height, |x, y| {
            let alpha = (blurred.get_pixel(x, y)[0] as f64 * self.config.max_opacity) as u8;
            Rgba([0, 0, 0, alpha])
        })
    }
}

impl Default for PolygonShadowRenderer {
    fn default() -> Self {
        Self::new()
    }
}
