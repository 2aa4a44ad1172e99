use super::geometry::{Point, Segment};
use serde::{Deserialize, Serialize};

/// Shape family an obstacle was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Single straight edge.
    Wall,
    /// Axis-aligned square centred on its anchor.
    Square,
    /// Open polyline, typically the arena border.
    Border,
    /// Arbitrary closed polygon.
    Polygon,
    /// Point emitter without edges; seen by light sensors only.
    LightSource,
}

/// An obstacle in the arena.
///
/// Obstacles are built once by the environment and only read by sensors.
/// Edges are kept in construction order, which is also the tie-break order
/// of the nearest-obstacle search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub edges: Vec<Segment>,
    /// `true` for polygons, `false` for open polylines.
    pub closed: bool,
    /// Reference position (centre for squares and lights, first vertex otherwise).
    pub anchor: Point,
    pub emitting_power: Option<f64>,
}

impl Obstacle {
    #[must_use]
    pub fn wall(start: Point, end: Point) -> Self {
        Self {
            kind: ObstacleKind::Wall,
            edges: vec![Segment::new(start, end)],
            closed: false,
            anchor: start,
            emitting_power: None,
        }
    }

    /// Square of side `size` centred at `center`.
    #[must_use]
    pub fn square(center: Point, size: f64) -> Self {
        let h = size / 2.0;
        let v1 = Point::new(center.x - h, center.y - h);
        let v2 = Point::new(center.x + h, center.y - h);
        let v3 = Point::new(center.x + h, center.y + h);
        let v4 = Point::new(center.x - h, center.y + h);
        Self {
            kind: ObstacleKind::Square,
            edges: vec![
                Segment::new(v1, v2),
                Segment::new(v2, v3),
                Segment::new(v3, v4),
                Segment::new(v4, v1),
            ],
            closed: true,
            anchor: center,
            emitting_power: None,
        }
    }

    /// Open polyline through `vertices` (consecutive pairs become edges).
    #[must_use]
    pub fn border(vertices: &[Point]) -> Self {
        Self {
            kind: ObstacleKind::Border,
            edges: vertices
                .windows(2)
                .map(|w| Segment::new(w[0], w[1]))
                .collect(),
            closed: false,
            anchor: vertices.first().copied().unwrap_or_default(),
            emitting_power: None,
        }
    }

    /// Closed polygon through `vertices`; the last vertex joins the first.
    #[must_use]
    pub fn polygon(vertices: &[Point]) -> Self {
        let mut edges: Vec<Segment> = vertices
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect();
        if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            if vertices.len() > 2 {
                edges.push(Segment::new(*last, *first));
            }
        }
        Self {
            kind: ObstacleKind::Polygon,
            edges,
            closed: true,
            anchor: vertices.first().copied().unwrap_or_default(),
            emitting_power: None,
        }
    }

    #[must_use]
    pub fn light_source(position: Point, emitting_power: f64) -> Self {
        Self {
            kind: ObstacleKind::LightSource,
            edges: Vec::new(),
            closed: false,
            anchor: position,
            emitting_power: Some(emitting_power),
        }
    }

    #[must_use]
    pub fn is_emitter(&self) -> bool {
        self.emitting_power.is_some()
    }
}
