//! Segment intersection and nearest-obstacle search for ray sensors.
//!
//! Everything here is pure and never fails. Parallel, collinear and
//! zero-length segments have a near-zero cross-product denominator and
//! never intersect.

use instar_data::{Obstacle, Point, Segment};
use std::f64::consts::{PI, TAU};

/// Largest `|sin|` of the angle between two segments still treated as
/// parallel.
pub const EPSILON: f64 = 1e-6;

/// Wraps an angle into `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a == -PI {
        PI
    } else {
        a
    }
}

/// Nearest obstacle struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleHit<'a> {
    pub distance: f64,
    /// Position of the obstacle in the searched slice.
    pub index: usize,
    pub obstacle: &'a Obstacle,
    pub point: Point,
}

/// Intersection point of two closed segments, if any.
///
/// `s` parameterizes `b` and `t` parameterizes `a`; the point is reported
/// as `a.start + t·(a.end - a.start)`.
#[must_use]
pub fn segments_intersection(a: &Segment, b: &Segment) -> Option<Point> {
    let s1 = (a.end.x - a.start.x, a.end.y - a.start.y);
    let s2 = (b.end.x - b.start.x, b.end.y - b.start.y);

    let den = -s2.0 * s1.1 + s1.0 * s2.1;
    if den.abs() <= EPSILON * s1.0.hypot(s1.1) * s2.0.hypot(s2.1) {
        return None;
    }

    let dx = a.start.x - b.start.x;
    let dy = a.start.y - b.start.y;
    let s = (-s1.1 * dx + s1.0 * dy) / den;
    let t = (s2.0 * dy - s2.1 * dx) / den;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(Point::new(a.start.x + t * s1.0, a.start.y + t * s1.1))
    } else {
        None
    }
}

/// Closest intersection of `ray` with any edge of `obstacles`, measured
/// from `origin`.
///
/// Only a strictly smaller distance replaces the current best, so ties go to
/// the obstacle (and edge) met first.
#[must_use]
pub fn nearest_obstacle<'a>(
    obstacles: &'a [Obstacle],
    ray: &Segment,
    origin: Point,
) -> Option<ObstacleHit<'a>> {
    let mut best: Option<ObstacleHit<'a>> = None;
    for (index, obstacle) in obstacles.iter().enumerate() {
        for edge in &obstacle.edges {
            let Some(point) = segments_intersection(ray, edge) else {
                continue;
            };
            let distance = origin.distance(&point);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(ObstacleHit {
                    distance,
                    index,
                    obstacle,
                    point,
                });
            }
        }
    }
    best
}
