use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod image_utils;

pub use crate::analysis::hardness::{HardnessConfig, HardnessMasks, ShadowHardnessClassifier};
pub use crate::analysis::light::LightDirectionEstimator;
pub use crate::analysis::shadow_mask::{MaskConfig, ShadowMask, ShadowMaskExtractor};
pub use crate::error::{Result, ShadowError};
pub use crate::generation::direct::{PolygonRenderConfig, PolygonShadowRenderer};
pub use crate::generation::perspective::{PerspectiveConfig, PerspectiveShadowRenderer};
pub use crate::generation::polygon::build_shadow_polygon;
pub use crate::geometry::{Contour, LightVector, ShadowPolygon, Vec2};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    pub mask: MaskConfig,
    pub hardness: HardnessConfig,
    /// Minimum contour area admitted to light-direction inference.
    pub min_light_contour_area: f64,
    pub perspective: PerspectiveConfig,
    pub polygon_fill: PolygonRenderConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            mask: MaskConfig::default(),
            hardness: HardnessConfig::default(),
            min_light_contour_area: analysis::light::DEFAULT_MIN_CONTOUR_AREA,
            perspective: PerspectiveConfig::default(),
            polygon_fill: PolygonRenderConfig::default(),
        }
    }
}

impl SynthesisConfig {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Confirmed placement of the cutout on the canvas: top-left corner plus
/// resized dimensions, as handed over by an interactive placement tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoutPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CutoutPlacement {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Ground-contact point of the cutout: bottom-center of its rectangle.
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height)
    }
}

/// Everything inferred from the background in one pass.
#[derive(Debug, Clone)]
pub struct BackgroundAnalysis {
    pub shadow: ShadowMask,
    pub light_direction: Option<LightVector>,
    pub hardness: HardnessMasks,
}

impl BackgroundAnalysis {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            shadow_contour_count: self.shadow.contours.len(),
            light_direction: self.light_direction,
            hard_coverage: coverage(&self.hardness.hard),
            soft_coverage: coverage(&self.hardness.soft),
        }
    }
}

fn coverage(mask: &image::GrayImage) -> f64 {
    let total = mask.width() as f64 * mask.height() as f64;
    if total == 0.0 {
        return 0.0;
    }
    mask.pixels().filter(|p| p[0] > 0).count() as f64 / total
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub shadow_contour_count: usize,
    pub light_direction: Option<LightVector>,
    pub hard_coverage: f64,
    pub soft_coverage: f64,
}

impl AnalysisSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wires background analysis, polygon construction and rendering together.
pub struct ShadowSynthesizer {
    config: SynthesisConfig,
}

impl ShadowSynthesizer {
    pub fn new() -> Self {
        Self::with_config(SynthesisConfig::default())
    }

    pub fn with_config(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn analyze_background(&self, background: &RgbImage) -> Result<BackgroundAnalysis> {
        let shadow = ShadowMaskExtractor::with_config(self.config.mask.clone()).extract(background)?;
        let light_direction =
            LightDirectionEstimator::with_min_area(self.config.min_light_contour_area)
                .infer(&shadow.mask);
        let hardness =
            ShadowHardnessClassifier::with_config(self.config.hardness.clone()).classify(background)?;

        Ok(BackgroundAnalysis {
            shadow,
            light_direction,
            hardness,
        })
    }

    pub fn build_polygon(
        &self,
        placement: &CutoutPlacement,
        light_pos: Vec2,
        sun_angle_degrees: f64,
    ) -> ShadowPolygon {
        build_shadow_polygon(
            placement.feet(),
            light_pos,
            placement.width,
            placement.height,
            sun_angle_degrees,
        )
    }

    /// Perspective-warped shadow layer for the cutout; the caller
    /// composites it onto the background.
    pub fn cast_shadow(
        &self,
        cutout: &RgbaImage,
        placement: &CutoutPlacement,
        light_pos: Vec2,
        sun_angle_degrees: f64,
        canvas_width: u32,
        canvas_height: u32,
    ) -> RgbaImage {
        let polygon = self.build_polygon(placement, light_pos, sun_angle_degrees);
        PerspectiveShadowRenderer::with_config(self.config.perspective.clone()).render(
            cutout,
            Some(&polygon),
            canvas_width,
            canvas_height,
        )
    }

    /// Direct polygon-fill shadow layer, ignoring the cutout silhouette.
    pub fn cast_polygon_shadow(
        &self,
        placement: &CutoutPlacement,
        light_pos: Vec2,
        sun_angle_degrees: f64,
        canvas_width: u32,
        canvas_height: u32,
    ) -> RgbaImage {
        let polygon = self.build_polygon(placement, light_pos, sun_angle_degrees);
        PolygonShadowRenderer::with_config(self.config.polygon_fill.clone()).render(
            Some(&polygon),
            canvas_width,
            canvas_height,
        )
    }
}

impl Default for ShadowSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn background_with_bar() -> RgbImage {
        let mut image = RgbImage::from_pixel(200, 200, Rgb([210, 210, 210]));
        for y in 90..110 {
            for x in 40..160 {
                image.put_pixel(x, y, Rgb([70, 70, 70]));
            }
        }
        image
    }

    #[test]
    fn default_config_carries_documented_values() {
        let config = SynthesisConfig::default();
        assert_eq!(config.mask.block_size, 51);
        assert_eq!(config.mask.c_value, 8);
        assert_eq!(config.hardness.gradient_threshold, 15.0);
        assert_eq!(config.min_light_contour_area, 500.0);
        assert_eq!(config.perspective.blur_kernel, 21);
        assert_eq!(config.perspective.max_opacity, 0.35);
        assert_eq!(config.perspective.shadow_color, [5, 45, 71]);
        assert_eq!(config.polygon_fill.blur_kernel, 55);
        assert_eq!(config.polygon_fill.max_opacity, 0.5);
    }

    #[test]
    fn config_survives_a_json_round_trip() {
        let mut config = SynthesisConfig::default();
        config.perspective.max_opacity = 0.42;
        config.mask.block_size = 31;

        let json = config.to_json().unwrap();
        let restored = SynthesisConfig::from_json(&json).unwrap();
        assert_eq!(restored.perspective.max_opacity, 0.42);
        assert_eq!(restored.mask.block_size, 31);
    }

    #[test]
    fn placement_feet_is_bottom_center() {
        let placement = CutoutPlacement::new(60.0, 20.0, 40.0, 80.0);
        assert_eq!(placement.feet(), Vec2::new(80.0, 100.0));
    }

    #[test]
    fn analyze_background_finds_bar_and_light_direction() {
        let analysis = ShadowSynthesizer::new()
            .analyze_background(&background_with_bar())
            .unwrap();

        assert!(!analysis.shadow.contours.is_empty());
        let light = analysis.light_direction.expect("bar is large enough");
        assert!((light.norm() - 1.0).abs() < 1e-9);
        assert!(light.x.abs() > 0.9, "horizontal bar, got ({}, {})", light.x, light.y);
    }

    #[test]
    fn analyze_background_without_shadows_reports_absence() {
        let image = RgbImage::from_pixel(120, 120, Rgb([210, 210, 210]));
        let analysis = ShadowSynthesizer::new().analyze_background(&image).unwrap();
        assert!(analysis.light_direction.is_none());
        assert!(analysis.shadow.contours.is_empty());
    }

    #[test]
    fn summary_serializes_to_json() {
        let analysis = ShadowSynthesizer::new()
            .analyze_background(&background_with_bar())
            .unwrap();

        let json = analysis.summary().to_json().unwrap();
        assert!(json.contains("light_direction"));
        assert!(json.contains("shadow_contour_count"));
    }

    #[test]
    fn cast_shadow_produces_a_shadow_below_the_cutout() {
        let cutout = RgbaImage::from_pixel(40, 80, Rgba([120, 90, 60, 255]));
        let placement = CutoutPlacement::new(80.0, 20.0, 40.0, 80.0);

        let layer = ShadowSynthesizer::new().cast_shadow(
            &cutout,
            &placement,
            Vec2::new(100.0, 20.0),
            45.0,
            200,
            200,
        );

        assert_eq!(layer.dimensions(), (200, 200));
        assert!(layer.get_pixel(100, 140)[3] > 40);
        assert_eq!(layer.get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn cast_polygon_shadow_fills_the_footprint() {
        let placement = CutoutPlacement::new(80.0, 20.0, 40.0, 80.0);

        let layer = ShadowSynthesizer::new().cast_polygon_shadow(
            &placement,
            Vec2::new(100.0, 20.0),
            45.0,
            200,
            200,
        );

        assert!(layer.get_pixel(100, 140)[3] > 0);
        let pixel = layer.get_pixel(100, 140);
        assert_eq!((pixel[0], pixel[1], pixel[2]), (0, 0, 0));
    }

    #[test]
    fn shadow_layer_survives_a_png_round_trip() {
        let cutout = RgbaImage::from_pixel(40, 80, Rgba([120, 90, 60, 255]));
        let placement = CutoutPlacement::new(80.0, 20.0, 40.0, 80.0);
        let layer = ShadowSynthesizer::new().cast_shadow(
            &cutout,
            &placement,
            Vec2::new(100.0, 20.0),
            45.0,
            200,
            200,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shadow_layer.png");
        layer.save(&path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), layer.dimensions());
        assert_eq!(
            reloaded.get_pixel(100, 140)[3],
            layer.get_pixel(100, 140)[3]
        );
    }
}
