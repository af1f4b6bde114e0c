use image::{GrayImage, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::Projection;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::ShadowPolygon;
use crate::image_utils::gaussian_sigma_for_kernel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveConfig {
    /// Feathering kernel size; sigma is derived from it.
    pub blur_kernel: u32,
    /// Opacity cap applied to the warped silhouette alpha.
    pub max_opacity: f64,
    /// Shadow RGB color (#052d47 by default).
    pub shadow_color: [u8; 3],
    /// Polygons enclosing less area than this render as fully transparent.
    pub min_polygon_area: f64,
    /// Supersampling grid side for the area-averaging warp.
    pub supersamples: u32,
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 21,
            max_opacity: 0.35,
            shadow_color: [5, 45, 71],
            min_polygon_area: 5.0,
            supersamples: 3,
        }
    }
}

/// Warps the cutout silhouette into the shadow polygon with a projective
/// transform and emits a colored, feathered, opacity-capped RGBA layer.
pub struct PerspectiveShadowRenderer {
    config: PerspectiveConfig,
}

impl PerspectiveShadowRenderer {
    pub fn new() -> Self {
        Self::with_config(PerspectiveConfig::default())
    }

    pub fn with_config(config: PerspectiveConfig) -> Self {
        Self { config }
    }

    /// Degenerate inputs (absent polygon, sub-threshold area, unsolvable
    /// transform, empty cutout or canvas) yield an all-transparent layer.
    pub fn render(
        &self,
        cutout: &RgbaImage,
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

        let (cutout_width, cutout_height) = cutout.dimensions();
        if cutout_width == 0 || cutout_height == 0 || canvas_width == 0 || canvas_height == 0 {
            return transparent();
        }

        let source = [
            (0.0, 0.0),
            (cutout_width as f32, 0.0),
            (cutout_width as f32, cutout_height as f32),
            (0.0, cutout_height as f32),
        ];
        // Reversed traversal of the polygon: the cutout's top edge lands
        // on the tip edge and its base on the base edge, left staying
        // left, so the silhouette is not mirrored.
        let destination = [
            (polygon.tip_left().x as f32, polygon.tip_left().y as f32),
            (polygon.tip_right().x as f32, polygon.tip_right().y as f32),
            (polygon.base_right().x as f32, polygon.base_right().y as f32),
            (polygon.base_left().x as f32, polygon.base_left().y as f32),
        ];

        let Some(projection) = Projection::from_control_points(source, destination) else {
            log::debug!("no projective transform for degenerate shadow polygon");
            return transparent();
        };
        let inverse = projection.invert();

        let warped = self.warp_alpha(cutout, &inverse, canvas_width, canvas_height);
        let blurred = gaussian_blur_f32(
            &warped,
            gaussian_sigma_for_kernel(self.config.blur_kernel),
        );

        let [red, green, blue] = self.config.shadow_color;
        RgbaImage::from_fn(canvas_width, canvas_height, |x, y| {
            let alpha = (blurred.get_pixel(x, y)[0] as f64 * self.config.max_opacity) as u8;
            Rgba([red, green, blue, alpha])
        })
    }

    /// Inverse-maps every canvas pixel into the cutout and averages the
    /// alpha channel over a supersampling grid, so minified regions are
    /// area-averaged instead of aliased.
    fn warp_alpha(
        &self,
        cutout: &RgbaImage,
        inverse: &Projection,
        width: u32,
        height: u32,
    ) -> GrayImage {
        let samples = self.config.supersamples.max(1);
        let step = 1.0 / samples as f32;
        let sample_count = (samples * samples) as f32;

        let mut buffer = vec![0u8; (width * height) as usize];
        buffer
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, output) in row.iter_mut().enumerate() {
                    let mut total = 0.0f32;
                    for sub_y in 0..samples {
                        for sub_x in 0..samples {
                            let px = x as f32 + (sub_x as f32 + 0.5) * step;
                            let py = y as f32 + (sub_y as f32 + 0.5) * step;
                            let (u, v) = *inverse * (px, py);
                            total += sample_alpha(cutout, u, v);
                        }
                    }
                    *output = (total / sample_count).round().clamp(0.0, 255.0) as u8;
                }
            });

        GrayImage::from_raw(width, height, buffer)
            .unwrap_or_else(|| GrayImage::new(width, height))
    }
}

impl Default for PerspectiveShadowRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Bilinear tap on the alpha channel; zero outside the cutout.
fn sample_alpha(cutout: &RgbaImage, u: f32, v: f32) -> f32 {
    let (width, height) = cutout.dimensions();
    if u < 0.0 || v < 0.0 || u >= width as f32 || v >= height as f32 {
        return 0.0;
    }

    let uc = (u - 0.5).clamp(0.0, width as f32 - 1.0);
    let vc = (v - 0.5).clamp(0.0, height as f32 - 1.0);
    let x0 = uc.floor() as u32;
    let y0 = vc.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = uc - x0 as f32;
    let fy = vc - y0 as f32;

    let a00 = cutout.get_pixel(x0, y0)[3] as f32;
    let a10 = cutout.get_pixel(x1, y0)[3] as f32;
    let a01 = cutout.get_pixel(x0, y1)[3] as f32;
    let a11 = cutout.get_pixel(x1, y1)[3] as f32;

    let top = a00 * (1.0 - fx) + a10 * fx;
    let bottom = a01 * (1.0 - fx) + a11 * fx;
    top * (1.0 - fy) + bottom * fy
}
