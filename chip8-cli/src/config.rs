//! Run configuration.
use std::{fs, path::Path};

use chip8_vm::{prelude::Chip8Conf, Hz, KeyCode};
use serde::Deserialize;

use crate::error::AppError;

/// Default clock speed of the run loop.
pub const DEFAULT_FREQUENCY: Hz = Hz(500);

/// Settings for a single `run` session.
///
/// Every key is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Steps per second. Zero runs as fast as possible.
    pub clock_frequency: Hz,
    /// Stop after this many steps. Runs until blocked or faulted when unset.
    pub max_steps: Option<u64>,
    /// Print every n-th presented frame. Zero only prints the final frame.
    pub render_every: u64,
    pub vm: Chip8Conf,
    /// Scripted keyboard input.
    pub input: Vec<InputEvent>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            clock_frequency: DEFAULT_FREQUENCY,
            max_steps: None,
            render_every: 0,
            vm: Chip8Conf::default(),
            input: Vec::new(),
        }
    }
}

/// Key state change delivered before the step with the given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InputEvent {
    pub step: u64,
    pub key: KeyCode,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
}

fn default_pressed() -> bool {
    true
}

impl RunConfig {
    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self, AppError> {
        let source = fs::read_to_string(filepath.as_ref())?;
        let config = Self::from_yaml(&source)?;
        log::debug!("loaded run configuration: {:#?}", config);
        Ok(config)
    }

    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        let mut config: RunConfig = serde_yaml::from_str(source)?;
        // Stable sort keeps the file order of events on the same step.
        config.input.sort_by_key(|ev| ev.step);
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_empty_config() {
        let config = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.clock_frequency, Hz(500));
        assert!(!config.vm.tick_timers_while_waiting);
    }

    #[test]
    fn test_full_config() {
        let source = r#"
clock_frequency: 60
max_steps: 1000
render_every: 4
vm:
  seed: 42
  tick_timers_while_waiting: true
input:
  - step: 20
    key: 10
    pressed: false
  - step: 10
    key: 10
"#;
        let config = RunConfig::from_yaml(source).unwrap();

        assert_eq!(config.clock_frequency, Hz(60));
        assert_eq!(config.max_steps, Some(1000));
        assert_eq!(config.render_every, 4);
        assert_eq!(config.vm.seed, Some(42));
        assert!(config.vm.tick_timers_while_waiting);
        assert_eq!(
            config.input,
            vec![
                InputEvent {
                    step: 10,
                    key: KeyCode::KeyA,
                    pressed: true
                },
                InputEvent {
                    step: 20,
                    key: KeyCode::KeyA,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn test_invalid_key() {
        let source = "input:\n  - step: 0\n    key: 16\n";
        let err = RunConfig::from_yaml(source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }
}
