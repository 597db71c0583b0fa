use crate::beam::spawner::SpawnerSettings;
use crate::beam::BeamSettings;
use crate::error::BreathError;
use crate::rhythm::RhythmSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to set up a session. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    pub rhythm: RhythmSettings,
    pub beam: BeamSettings,
    pub spawner: SpawnerSettings,
    /// Named breath pattern, overriding the movement patterns in `rhythm`
    pub pattern: Option<String>,
}

impl BreathConfig {
    pub fn from_json(json: &str) -> Result<Self, BreathError> {
        serde_json::from_str(json).map_err(|error| BreathError::ConfigMalformed(error.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BreathError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|error| {
            BreathError::ConfigUnreadable(format!("{}: {error}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, BreathError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| BreathError::ConfigMalformed(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::MovementPattern;
    use crate::units::{MetersPerSecond, Seconds};

    #[test]
    fn test_partial_config() {
        let config = BreathConfig::from_json(
            r#"{
                "rhythm": { "inhale": 5.0, "target_cycles": 3, "inhale_pattern": "CircleInhale" },
                "beam": { "flow_speed": 3.0 },
                "pattern": "horizontal"
            }"#,
        )
        .unwrap();
        assert_eq!(config.rhythm.inhale, Seconds(5.0));
        assert_eq!(config.rhythm.exhale, Seconds(6.0));
        assert_eq!(config.rhythm.target_cycles, Some(3));
        assert_eq!(config.rhythm.inhale_pattern, MovementPattern::CircleInhale);
        assert_eq!(config.beam.flow_speed, MetersPerSecond(3.0));
        assert_eq!(config.beam.fly_away_speed, BeamSettings::default().fly_away_speed);
        assert_eq!(config.spawner, SpawnerSettings::default());
        assert_eq!(config.pattern.as_deref(), Some("horizontal"));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(BreathConfig::from_json("{}").unwrap(), BreathConfig::default());
    }

    #[test]
    fn test_survives_export() {
        let mut config = BreathConfig::default();
        config.rhythm.target_cycles = Some(7);
        let json = config.to_json().unwrap();
        assert_eq!(BreathConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            BreathConfig::from_json("{ \"rhythm\": 4 }"),
            Err(BreathError::ConfigMalformed(_))
        ));
        assert!(matches!(
            BreathConfig::load("/nonexistent/breath.json"),
            Err(BreathError::ConfigUnreadable(_))
        ));
    }
}
