use instar_lib::model::brain::{Brain, Modality};
use instar_lib::model::config::{
    AgentConfig, DurationDistribution, IntermitterMode, InterferenceWindow, Perception,
};
use instar_lib::model::effector::PhaseFactor;
use instar_lib::{load_config, try_load_config};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

const AGENT_TOML: &str = r#"
dt = 0.05
seed = 7
warmup_ticks = 0

[crawler]
freq = 1.2

[crawler.phase_factor]
kind = "sinusoidal"

[intermitter]
feed_bouts = false

[intermitter.mode]
kind = "branch"
continuation_probability = 0.6

[intermitter.bout]
kind = "fixed"
duration = 0.5

[interference.window]
kind = "cosine"

[sensors.olfactor]
perception = "linear"
initial_gain = 40.0

[sensors.olfactor.gains]
amyl_acetate = 12.0

[memory]
modality = "olfaction"
learning_rate = 0.2
"#;

/// Writes `content` to a per-test file in the system temp directory.
fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("instar_{}_{}.toml", name, std::process::id()));
    std::fs::write(&path, content).expect("Failed to write temp config");
    path
}

#[test]
fn test_load_full_config() {
    let path = temp_config("full", AGENT_TOML);
    let config = try_load_config(&path).expect("Config must load");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.dt, 0.05);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.crawler.freq, 1.2);
    assert_eq!(config.crawler.phase_factor, PhaseFactor::Sinusoidal);

    let intermitter = config.intermitter.as_ref().expect("Intermitter section");
    assert!(!intermitter.feed_bouts);
    assert_eq!(
        intermitter.mode,
        IntermitterMode::Branch {
            continuation_probability: 0.6
        }
    );
    assert_eq!(intermitter.bout, DurationDistribution::Fixed { duration: 0.5 });
    assert!(matches!(intermitter.pause, DurationDistribution::PowerLaw { .. }));
    assert_eq!(config.interference.window, InterferenceWindow::Cosine);

    let olfactor = config.sensors.olfactor.as_ref().expect("Olfactor section");
    assert_eq!(olfactor.perception, Perception::Linear);
    assert_eq!(olfactor.gains["amyl_acetate"], 12.0);
    assert!(config.sensors.proximity.is_none());

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let brain = Brain::new(&config, &mut rng);
    let record = brain.modality(Modality::Olfaction).expect("Olfaction enabled");
    assert!(record.memory.is_some());
    assert_eq!(record.sensor.gains["amyl_acetate"], 12.0);
}

#[test]
fn test_invalid_values_are_rejected() {
    let path = temp_config("invalid", "dt = -0.1\n");
    let err = try_load_config(&path).expect_err("Negative dt must fail");
    let _ = std::fs::remove_file(&path);
    let message = format!("{err:#}");
    assert!(message.contains("Tick duration must be positive"), "{message}");
}

#[test]
fn test_unknown_mode_tag_is_rejected() {
    let path = temp_config("tag", "[intermitter.bout]\nkind = \"gamma\"\nshape = 2.0\n");
    let result = try_load_config(&path);
    let _ = std::fs::remove_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let path = std::env::temp_dir().join("instar_does_not_exist.toml");
    let err = try_load_config(&path).expect_err("Missing file must fail");
    assert!(format!("{err:#}").contains("Failed to read"));
}

#[test]
fn test_fallback_to_default() {
    let config = load_config("/nonexistent/instar/agent.toml");
    assert_eq!(config, AgentConfig::default());
}

#[test]
fn test_empty_file_is_default() {
    let path = temp_config("empty", "");
    let config = try_load_config(&path).expect("Empty config is valid");
    let _ = std::fs::remove_file(&path);
    assert_eq!(config, AgentConfig::default());
    assert_eq!(config.fingerprint(), AgentConfig::default().fingerprint());
}
