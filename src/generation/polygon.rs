use crate::geometry::{ShadowPolygon, Vec2};

/// Fraction of the cutout width used for the polygon's base edge.
pub const BASE_WIDTH_RATIO: f64 = 0.8;

/// Elevation floor applied before the shadow-length computation.
pub const MIN_SUN_ANGLE_DEGREES: f64 = 1.0;

/// Cast-shadow quadrilateral for a cutout standing at `feet`, lit from
/// `light_pos` at the given elevation.
///
/// The shadow stretches away from the light; its length is
/// `cutout_height / tan(elevation)`, so low sun gives a long shadow.
pub fn build_shadow_polygon(
    feet: Vec2,
    light_pos: Vec2,
    cutout_width: f64,
    cutout_height: f64,
    sun_angle_degrees: f64,
) -> ShadowPolygon {
    let mut direction = feet - light_pos;
    if direction.norm() == 0.0 {
        // Light exactly at the feet point: fall back to casting downward.
        direction = Vec2::new(0.0, 1.0);
    }
    let unit_dir = direction * (1.0 / direction.norm());
    let perp = unit_dir.perp();

    let base_width = BASE_WIDTH_RATIO * cutout_width;
    let base_left = feet - perp * (base_width / 2.0);
    let base_right = feet + perp * (base_width / 2.0);

    let elevation = sun_angle_degrees.max(MIN_SUN_ANGLE_DEGREES);
    let shadow_length = cutout_height / elevation.to_radians().tan();
    log::debug!("shadow length {shadow_length:.1} at {elevation:.1} degrees elevation");

    let tip_left = base_left + unit_dir * shadow_length;
    let tip_right = base_right + unit_dir * shadow_length;

    ShadowPolygon::new([base_left, base_right, tip_right, tip_left])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual.x - expected.x).abs() < 1e-6 && (actual.y - expected.y).abs() < 1e-6,
            "expected ({}, {}), got ({}, {})",
            expected.x,
            expected.y,
            actual.x,
            actual.y
        );
    }

    #[test]
    fn overhead_light_casts_straight_down() {
        let polygon = build_shadow_polygon(
            Vec2::new(500.0, 800.0),
            Vec2::new(500.0, 0.0),
            100.0,
            200.0,
            45.0,
        );

        assert_close(polygon.base_left(), Vec2::new(540.0, 800.0));
        assert_close(polygon.base_right(), Vec2::new(460.0, 800.0));
        assert_close(polygon.tip_right(), Vec2::new(460.0, 1000.0));
        assert_close(polygon.tip_left(), Vec2::new(540.0, 1000.0));
    }

    #[test]
    fn zero_elevation_is_clamped_to_one_degree() {
        let polygon = build_shadow_polygon(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, -100.0),
            10.0,
            1.0,
            0.0,
        );

        let length = (polygon.tip_left() - polygon.base_left()).norm();
        assert!(length.is_finite());
        assert!(
            (length - 57.29).abs() < 0.01,
            "expected ~57.29, got {length}"
        );
    }

    #[test]
    fn noon_sun_collapses_the_shadow() {
        let polygon = build_shadow_polygon(
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
            40.0,
            80.0,
            90.0,
        );

        let length = (polygon.tip_left() - polygon.base_left()).norm();
        assert!(length.is_finite());
        assert!(length < 1e-9, "expected ~0, got {length}");
    }

    #[test]
    fn shadow_length_grows_as_the_sun_sets() {
        let length_at = |degrees: f64| {
            let polygon = build_shadow_polygon(
                Vec2::new(100.0, 100.0),
                Vec2::new(100.0, 0.0),
                40.0,
                80.0,
                degrees,
            );
            (polygon.tip_left() - polygon.base_left()).norm()
        };

        assert!(length_at(15.0) > length_at(30.0));
        assert!(length_at(30.0) > length_at(60.0));
        assert!(length_at(60.0) > length_at(85.0));
    }

    #[test]
    fn coincident_light_and_feet_cast_downward() {
        let feet = Vec2::new(50.0, 50.0);
        let polygon = build_shadow_polygon(feet, feet, 10.0, 10.0, 45.0);

        // Downward direction: tips sit below the base edge.
        assert!(polygon.tip_left().y > polygon.base_left().y);
        assert!((polygon.tip_left().x - polygon.base_left().x).abs() < 1e-9);
    }

    #[test]
    fn polygon_has_positive_area_for_sensible_inputs() {
        let polygon = build_shadow_polygon(
            Vec2::new(320.0, 400.0),
            Vec2::new(100.0, 50.0),
            60.0,
            120.0,
            35.0,
        );
        assert!(polygon.area() > 0.0);
    }
}
