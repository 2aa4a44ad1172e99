pub mod macros;

use instar_lib::model::config::{AgentConfig, ProximityConfig, RayMount, SensorConfig};
use instar_lib::model::geometry::{Obstacle, Point};
use instar_lib::model::habitat::{OdorSource, StaticHabitat};
use instar_lib::model::locomotor::IntermittencyState;
use instar_lib::model::simulation::{Agent, Placement};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

type ConfigMod = Box<dyn FnOnce(&mut AgentConfig)>;

#[allow(dead_code)]
pub struct AgentBuilder {
    config: AgentConfig,
    habitat: StaticHabitat,
    placement: Placement,
    seed: u64,
    hold: Option<IntermittencyState>,
    config_mods: Vec<ConfigMod>,
}

#[allow(dead_code)]
impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            config: AgentConfig::default(),
            habitat: StaticHabitat::default(),
            placement: Placement::default(),
            seed: 42,
            hold: None,
            config_mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AgentConfig) + 'static,
    {
        self.config_mods.push(Box::new(modifier));
        self
    }

    pub fn at(mut self, x: f64, y: f64, orientation: f64) -> Self {
        self.placement = Placement {
            position: Point::new(x, y),
            orientation,
        };
        self
    }

    /// Single forward-facing proximity ray.
    pub fn with_proximity(self, max_distance: f64, collision_distance: f64) -> Self {
        self.with_config(move |c| {
            c.sensors.proximity = Some(ProximityConfig {
                rays: vec![RayMount {
                    name: "front".into(),
                    offset: 0.0,
                }],
                max_distance,
                collision_distance,
                ..Default::default()
            });
        })
    }

    pub fn with_olfaction(self, initial_gain: f64) -> Self {
        self.with_config(move |c| {
            c.sensors.olfactor = Some(SensorConfig {
                initial_gain,
                ..Default::default()
            });
        })
    }

    pub fn with_odor(mut self, id: &str, x: f64, y: f64, spread: f64) -> Self {
        self.habitat = self.habitat.with_odor(OdorSource {
            id: id.to_string(),
            position: Point::new(x, y),
            intensity: 1.0,
            spread,
        });
        self
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.habitat = self.habitat.with_obstacle(obstacle);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64, radius: f64) -> Self {
        self.habitat = self.habitat.with_food(Point::new(x, y), radius);
        self
    }

    pub fn paused(mut self) -> Self {
        self.hold = Some(IntermittencyState::Pause);
        self
    }

    /// Resolved config, habitat, placement and seed.
    pub fn into_parts(self) -> (AgentConfig, StaticHabitat, Placement, u64) {
        let mut config = self.config;
        for modifier in self.config_mods {
            modifier(&mut config);
        }
        config
            .validate()
            .expect("Invalid agent config in test builder");
        (config, self.habitat, self.placement, self.seed)
    }

    pub fn build(self) -> (Agent, StaticHabitat, ChaCha8Rng) {
        let hold = self.hold;
        let (config, habitat, placement, seed) = self.into_parts();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut agent = Agent::new(&config, placement, &mut rng);
        if let Some(state) = hold {
            agent.brain.locomotor.hold(state);
        }
        (agent, habitat, rng)
    }
}
