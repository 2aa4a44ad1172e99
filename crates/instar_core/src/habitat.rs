//! Environment queries available to the sensory modalities.

use crate::error::Unavailable;
use crate::sensor::Reading;
use instar_data::{Obstacle, Point, ThermalReading};
use serde::{Deserialize, Serialize};

/// Read-only view of the arena around an agent.
///
/// Every query may answer [`Unavailable`] when the arena has no such field;
/// the brain treats that as zero drive for the modality.
pub trait Habitat {
    /// Odor concentration per odor id.
    fn odor_field(&self, _position: Point) -> Result<Reading, Unavailable> {
        Err(Unavailable("odor field"))
    }

    /// Whether a disc of `radius` around `position` touches food.
    fn food_contact(&self, _position: Point, _radius: f64) -> Result<bool, Unavailable> {
        Err(Unavailable("food grid"))
    }

    fn wind(&self, _position: Point) -> Result<f64, Unavailable> {
        Err(Unavailable("windscape"))
    }

    fn thermal(&self, _position: Point) -> Result<ThermalReading, Unavailable> {
        Err(Unavailable("thermoscape"))
    }

    fn obstacles(&self) -> &[Obstacle] {
        &[]
    }
}

/// Gaussian odor peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdorSource {
    pub id: String,
    pub position: Point,
    pub intensity: f64,
    /// Standard deviation of the plume, metres.
    pub spread: f64,
}

impl OdorSource {
    #[must_use]
    pub fn concentration(&self, at: Point) -> f64 {
        if self.spread <= 0.0 {
            return 0.0;
        }
        let d = self.position.distance(&at);
        self.intensity * (-(d * d) / (2.0 * self.spread * self.spread)).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodPatch {
    pub position: Point,
    pub radius: f64,
}

/// Temperature changing linearly along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalGradient {
    /// Point of neutral temperature.
    pub origin: Point,
    /// Direction of warming, radians.
    pub direction: f64,
    /// Change per metre.
    pub slope: f64,
}

impl ThermalGradient {
    #[must_use]
    pub fn reading(&self, at: Point) -> ThermalReading {
        let along = (at.x - self.origin.x) * self.direction.cos()
            + (at.y - self.origin.y) * self.direction.sin();
        let v = along * self.slope;
        ThermalReading {
            cool: (-v).max(0.0),
            warm: v.max(0.0),
        }
    }
}

/// A fixed arena assembled up front. Fields left empty answer
/// [`Unavailable`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticHabitat {
    pub odor_sources: Vec<OdorSource>,
    pub food: Vec<FoodPatch>,
    pub wind_speed: Option<f64>,
    pub thermal: Option<ThermalGradient>,
    pub obstacles: Vec<Obstacle>,
}

impl StaticHabitat {
    #[must_use]
    pub fn with_odor(mut self, source: OdorSource) -> Self {
        self.odor_sources.push(source);
        self
    }

    #[must_use]
    pub fn with_food(mut self, position: Point, radius: f64) -> Self {
        self.food.push(FoodPatch { position, radius });
        self
    }

    #[must_use]
    pub fn with_wind(mut self, speed: f64) -> Self {
        self.wind_speed = Some(speed);
        self
    }

    #[must_use]
    pub fn with_thermal(mut self, gradient: ThermalGradient) -> Self {
        self.thermal = Some(gradient);
        self
    }

    #[must_use]
    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }
}

impl Habitat for StaticHabitat {
    fn odor_field(&self, position: Point) -> Result<Reading, Unavailable> {
        if self.odor_sources.is_empty() {
            return Err(Unavailable("odor field"));
        }
        let mut field = Reading::new();
        for source in &self.odor_sources {
            *field.entry(source.id.clone()).or_insert(0.0) += source.concentration(position);
        }
        Ok(field)
    }

    fn food_contact(&self, position: Point, radius: f64) -> Result<bool, Unavailable> {
        if self.food.is_empty() {
            return Err(Unavailable("food grid"));
        }
        Ok(self
            .food
            .iter()
            .any(|patch| patch.position.distance(&position) <= patch.radius + radius))
    }

    fn wind(&self, _position: Point) -> Result<f64, Unavailable> {
        self.wind_speed.ok_or(Unavailable("windscape"))
    }

    fn thermal(&self, position: Point) -> Result<ThermalReading, Unavailable> {
        self.thermal
            .map(|g| g.reading(position))
            .ok_or(Unavailable("thermoscape"))
    }

    fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}
