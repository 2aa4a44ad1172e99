mod common;

use common::AgentBuilder;
use instar_lib::model::geometry::{Obstacle, Point};
use instar_lib::model::simulation::{
    init_logging, simulate_agent, simulate_agents, Metrics, Placement,
};

fn arena() -> AgentBuilder {
    AgentBuilder::new()
        .with_olfaction(20.0)
        .with_odor("amyl_acetate", 0.03, 0.01, 0.02)
        .with_proximity(0.02, 0.0002)
        .with_obstacle(Obstacle::border(&[
            Point::new(-0.1, -0.1),
            Point::new(0.1, -0.1),
            Point::new(0.1, 0.1),
            Point::new(-0.1, 0.1),
            Point::new(-0.1, -0.1),
        ]))
}

#[test]
fn test_same_seed_same_trajectory() {
    let (config, habitat, start, seed) = arena().with_seed(1234).into_parts();
    let metrics = Metrics::new();
    let a = simulate_agent(&config, start, &habitat, 600, seed, &metrics);
    let b = simulate_agent(&config, start, &habitat, 600, seed, &metrics);
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn test_different_seeds_diverge() {
    let (config, habitat, start, _) = arena().into_parts();
    let metrics = Metrics::new();
    let a = simulate_agent(&config, start, &habitat, 300, 1, &metrics);
    let b = simulate_agent(&config, start, &habitat, 300, 2, &metrics);
    assert_ne!(a.agent_id, b.agent_id);
    assert_ne!(a.samples, b.samples);
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn test_batch_matches_individual_runs() {
    let (config, habitat, _, _) = arena().into_parts();
    let agents: Vec<_> = (0..6)
        .map(|i| {
            let start = Placement {
                position: Point::new(-0.05 + 0.02 * i as f64, 0.0),
                orientation: 0.5 * i as f64,
            };
            (config.clone(), start)
        })
        .collect();

    let metrics = Metrics::new();
    let batch = simulate_agents(&agents, &habitat, 200, 77, &metrics);
    assert_eq!(batch.len(), agents.len());
    for (i, ((config, start), run)) in agents.iter().zip(&batch).enumerate() {
        let solo = simulate_agent(config, *start, &habitat, 200, 77 + i as u64, &Metrics::new());
        assert_eq!(run, &solo, "agent {i} differs between batch and solo runs");
    }
}

#[test]
fn test_configured_seed_overrides_base_seed() {
    let (config, habitat, start, seed) = arena().with_seed(9).into_parts();
    let metrics = Metrics::new();
    let batch = simulate_agents(&[(config.clone(), start)], &habitat, 100, 1000, &metrics);
    let solo = simulate_agent(&config, start, &habitat, 100, seed, &metrics);
    assert_eq!(batch[0], solo);
}

#[test]
fn test_tick_counts_are_recorded() {
    init_logging();
    let (config, habitat, start, seed) = arena().with_seed(5).into_parts();
    let metrics = Metrics::new();
    let run = simulate_agent(&config, start, &habitat, 250, seed, &metrics);
    assert_eq!(metrics.tick_count(), run.samples.len() as u64);
    assert_eq!(
        metrics.counter("runs_completed") + metrics.counter("runs_collided"),
        1
    );
    for (i, sample) in run.samples.iter().enumerate() {
        assert_eq!(sample.tick, i as u64);
    }
}
