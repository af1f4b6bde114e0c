use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point or direction in image coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Counter-clockwise perpendicular in image coordinates.
    pub const fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Unit vector approximating the dominant cast-shadow direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightVector {
    pub x: f64,
    pub y: f64,
}

impl LightVector {
    pub fn from_angle_degrees(degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self {
            x: rad.cos(),
            y: rad.sin(),
        }
    }

    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn angle_degrees(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }
}

/// Ordered boundary point sequence of one connected shadow region.
#[derive(Debug, Clone)]
pub struct Contour {
    points: Vec<(i32, i32)>,
}

impl Contour {
    pub fn new(points: Vec<(i32, i32)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area via the shoelace formula. The outer boundary of a
    /// ring-shaped region counts the hole, matching contour-area
    /// conventions elsewhere in the pipeline.
    pub fn area(&self) -> f64 {
        shoelace_area(&self.points)
    }

    /// Major-axis orientation of the boundary point set in degrees,
    /// undirected and range-limited to [0, 180). Computed from the
    /// second-order central moments, which is the principal axis of the
    /// best-fit ellipse. Returns `None` below 5 points.
    pub fn orientation_degrees(&self) -> Option<f64> {
        if self.points.len() < 5 {
            return None;
        }

        let n = self.points.len() as f64;
        let mut mean_x = 0.0;
        let mut mean_y = 0.0;
        for &(x, y) in &self.points {
            mean_x += x as f64;
            mean_y += y as f64;
        }
        mean_x /= n;
        mean_y /= n;

        let mut mu20 = 0.0;
        let mut mu02 = 0.0;
        let mut mu11 = 0.0;
        for &(x, y) in &self.points {
            let dx = x as f64 - mean_x;
            let dy = y as f64 - mean_y;
            mu20 += dx * dx;
            mu02 += dy * dy;
            mu11 += dx * dy;
        }
        mu20 /= n;
        mu02 /= n;
        mu11 /= n;

        let mut degrees = (0.5 * (2.0 * mu11).atan2(mu20 - mu02)).to_degrees();
        if degrees < 0.0 {
            degrees += 180.0;
        }

        Some(degrees)
    }
}

fn shoelace_area(points: &[(i32, i32)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].0 as f64 * points[j].1 as f64;
        twice_area -= points[j].0 as f64 * points[i].1 as f64;
    }

    twice_area.abs() / 2.0
}

/// Cast-shadow quadrilateral: `[base_left, base_right, tip_right, tip_left]`,
/// base edge near the object, tip edge far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolygon {
    corners: [Vec2; 4],
}

impl ShadowPolygon {
    pub const fn new(corners: [Vec2; 4]) -> Self {
        Self { corners }
    }

    pub const fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }

    pub const fn base_left(&self) -> Vec2 {
        self.corners[0]
    }

    pub const fn base_right(&self) -> Vec2 {
        self.corners[1]
    }

    pub const fn tip_right(&self) -> Vec2 {
        self.corners[2]
    }

    pub const fn tip_left(&self) -> Vec2 {
        self.corners[3]
    }

    pub fn area(&self) -> f64 {
        let mut twice_area = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            twice_area += self.corners[i].x * self.corners[j].y;
            twice_area -= self.corners[j].x * self.corners[i].y;
        }

        twice_area.abs() / 2.0
    }
}
