use serde::{Deserialize, Serialize};

/// A point in the arena plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point reached by travelling `length` along `angle` (radians).
    #[must_use]
    pub fn offset(&self, angle: f64, length: f64) -> Point {
        Point {
            x: self.x + angle.cos() * length,
            y: self.y + angle.sin() * length,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A directed line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

/// A sensor ray, rebuilt every tick and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point,
    /// Heading in radians.
    pub direction: f64,
    pub max_length: f64,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Point, direction: f64, max_length: f64) -> Self {
        Self {
            origin,
            direction,
            max_length,
        }
    }

    /// The finite segment covered by the ray.
    #[must_use]
    pub fn to_segment(&self) -> Segment {
        Segment {
            start: self.origin,
            end: self.origin.offset(self.direction, self.max_length),
        }
    }
}
