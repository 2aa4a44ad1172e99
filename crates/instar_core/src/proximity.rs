//! Ray-cast proximity sensing with collision detection, and cosine-weighted
//! light sensing.

use crate::config::{LightConfig, ProximityConfig, RayMount};
use crate::error::Collision;
use crate::geometry::{nearest_obstacle, wrap_angle};
use crate::noise::normal;
use instar_data::{Obstacle, Point, Ray};
use rand::Rng;

/// Heading of a sensor mounted at `offset` on a body facing `direction`.
#[inline]
#[must_use]
pub fn sensor_heading(direction: f64, offset: f64) -> f64 {
    direction - offset
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximitySensor {
    pub name: String,
    pub offset: f64,
    pub max_distance: f64,
    pub collision_distance: f64,
    pub saturation_value: f64,
    /// Fractional standard deviation of the measured distance.
    pub error: f64,
}

impl ProximitySensor {
    #[must_use]
    pub fn new(mount: &RayMount, config: &ProximityConfig) -> Self {
        Self {
            name: mount.name.clone(),
            offset: mount.offset,
            max_distance: config.max_distance,
            collision_distance: config.collision_distance,
            saturation_value: config.saturation_value,
            error: config.error,
        }
    }

    /// Inverse distance to the nearest obstacle along the sensor ray.
    ///
    /// Returns 0 when nothing lies within `max_distance`. A hit closer than
    /// `collision_distance` is a [`Collision`]; a hit exactly at that
    /// distance is still a reading.
    pub fn get_value<R: Rng + ?Sized>(
        &self,
        position: Point,
        direction: f64,
        obstacles: &[Obstacle],
        rng: &mut R,
    ) -> Result<f64, Collision> {
        let ray = Ray::new(
            position,
            sensor_heading(direction, self.offset),
            self.max_distance,
        );
        let Some(hit) = nearest_obstacle(obstacles, &ray.to_segment(), position) else {
            return Ok(0.0);
        };

        if hit.distance < self.collision_distance {
            return Err(Collision {
                distance: hit.distance,
                threshold: self.collision_distance,
                obstacle_index: hit.index,
            });
        }

        let measured = normal(rng, hit.distance, self.error * hit.distance);
        if measured <= 0.0 {
            return Ok(self.saturation_value);
        }
        let value = 1.0 / measured;
        if value > self.saturation_value {
            Ok(self.saturation_value)
        } else {
            Ok(value)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSensor {
    pub name: String,
    pub offset: f64,
    pub saturation_value: f64,
    pub error: f64,
}

impl LightSensor {
    #[must_use]
    pub fn new(mount: &RayMount, config: &LightConfig) -> Self {
        Self {
            name: mount.name.clone(),
            offset: mount.offset,
            saturation_value: config.saturation_value,
            error: config.error,
        }
    }

    /// Summed `cos(angle)·power` of the emitters in front of the sensor.
    pub fn get_value<R: Rng + ?Sized>(
        &self,
        position: Point,
        direction: f64,
        obstacles: &[Obstacle],
        rng: &mut R,
    ) -> f64 {
        let heading = sensor_heading(direction, self.offset);
        let total: f64 = obstacles
            .iter()
            .filter(|o| o.is_emitter())
            .map(|o| {
                let bearing = (o.anchor.y - position.y).atan2(o.anchor.x - position.x);
                wrap_angle(heading - bearing).cos() * o.emitting_power.unwrap_or(0.0)
            })
            .filter(|v| *v > 0.0)
            .sum();

        if total > self.saturation_value {
            return self.saturation_value;
        }
        normal(rng, total, self.error * total).clamp(0.0, self.saturation_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    fn sensor(collision: f64) -> ProximitySensor {
        ProximitySensor {
            name: "front".into(),
            offset: 0.0,
            max_distance: 1.0,
            collision_distance: collision,
            saturation_value: 1000.0,
            error: 0.0,
        }
    }

    fn wall_at(x: f64) -> Vec<Obstacle> {
        vec![Obstacle::wall(Point::new(x, -1.0), Point::new(x, 1.0))]
    }

    #[test]
    fn test_nothing_in_range_reads_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let v = sensor(0.1)
            .get_value(Point::default(), 0.0, &wall_at(2.0), &mut rng)
            .unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_inverse_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let v = sensor(0.1)
            .get_value(Point::default(), 0.0, &wall_at(0.5), &mut rng)
            .unwrap();
        assert!((v - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_collision_is_strict() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = sensor(0.5)
            .get_value(Point::default(), 0.0, &wall_at(0.25), &mut rng)
            .unwrap_err();
        assert_eq!(err.obstacle_index, 0);
        assert!((err.distance - 0.25).abs() < 1e-12);

        let at_threshold = sensor(0.25).get_value(Point::default(), 0.0, &wall_at(0.25), &mut rng);
        assert!(at_threshold.is_ok());
    }

    #[test]
    fn test_saturation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut s = sensor(0.0);
        s.saturation_value = 5.0;
        let v = s
            .get_value(Point::default(), 0.0, &wall_at(0.01), &mut rng)
            .unwrap();
        assert_eq!(v, 5.0);
    }

    #[test]
    fn test_offset_turns_ray_away() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut s = sensor(0.0);
        s.offset = PI / 2.0;
        let v = s
            .get_value(Point::default(), 0.0, &wall_at(0.5), &mut rng)
            .unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_collinear_edges_read_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let s = sensor(0.001);
        let ahead = vec![Obstacle::wall(Point::new(5.0, 0.0), Point::new(6.0, 0.0))];
        let behind = vec![Obstacle::wall(Point::new(-6.0, 0.0), Point::new(-5.0, 0.0))];
        let overlapping = vec![Obstacle::wall(Point::new(-0.5, 0.0), Point::new(0.5, 0.0))];
        for obstacles in [ahead, behind, overlapping] {
            let v = s.get_value(Point::default(), 0.0, &obstacles, &mut rng);
            assert_eq!(v, Ok(0.0));
        }
    }

    #[test]
    fn test_light_facing_and_behind() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let light = LightSensor {
            name: "front".into(),
            offset: 0.0,
            saturation_value: 200.0,
            error: 0.0,
        };
        let sources = vec![
            Obstacle::light_source(Point::new(1.0, 0.0), 10.0),
            Obstacle::light_source(Point::new(-1.0, 0.0), 50.0),
        ];
        let v = light.get_value(Point::default(), 0.0, &sources, &mut rng);
        assert!((v - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_light_saturates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let light = LightSensor {
            name: "front".into(),
            offset: 0.0,
            saturation_value: 5.0,
            error: 0.5,
        };
        let sources = vec![Obstacle::light_source(Point::new(1.0, 0.0), 10.0)];
        assert_eq!(light.get_value(Point::default(), 0.0, &sources, &mut rng), 5.0);
    }

    #[test]
    fn test_light_noise_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let light = LightSensor {
            name: "front".into(),
            offset: 0.0,
            saturation_value: 12.0,
            error: 1.0,
        };
        let sources = vec![Obstacle::light_source(Point::new(1.0, 0.0), 10.0)];
        for _ in 0..1000 {
            let v = light.get_value(Point::default(), 0.0, &sources, &mut rng);
            assert!((0.0..=12.0).contains(&v));
        }
    }
}
