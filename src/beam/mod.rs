//! Guide beams: the moving curves a user follows with their hands

use crate::units::{MetersPerSecond, Seconds};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

pub mod proximity;
pub mod segment;
pub mod spawner;

new_key_type! {
    pub struct SegmentKey;
}

/// Tuning of a single beam, shared by every segment spawned from the same template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSettings {
    /// Cruise speed toward the user
    pub flow_speed: MetersPerSecond,
    /// How fast the leading point runs along its path, relative to the phase
    pub cp2_path_speed: f32,
    /// Trailing point aims at this fraction of the leading point's progress
    pub cp1_follow_ratio: f32,
    pub cp1_smooth_time: Seconds,
    /// Share of the travel distance the leading point moves forward
    pub cp2_forward_factor: f32,
    pub fly_away_speed: MetersPerSecond,
    pub fly_away_duration: Seconds,
    pub extra_lifetime: Seconds,
    /// Progress at which the beam counts as followed and flies off
    pub auto_complete_at: f32,
    pub haptic_amplitude: f32,
    pub haptic_interval: Seconds,
    pub detection_radius: f32,
    pub detection_samples: usize,
    pub detection_interval: Seconds,
    /// Lift of the curve's middle for horizontal patterns
    pub horizontal_lift: f32,
    pub hit_cue: String,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            flow_speed: MetersPerSecond(2.0),
            cp2_path_speed: 1.0,
            cp1_follow_ratio: 0.8,
            cp1_smooth_time: Seconds(0.08),
            cp2_forward_factor: 0.2,
            fly_away_speed: MetersPerSecond(6.0),
            fly_away_duration: Seconds(1.2),
            extra_lifetime: Seconds(1.0),
            auto_complete_at: 0.9,
            haptic_amplitude: 0.5,
            haptic_interval: Seconds(0.1),
            detection_radius: 0.15,
            detection_samples: 10,
            detection_interval: Seconds(0.05),
            horizontal_lift: 0.1,
            hit_cue: "breath_hit".to_string(),
        }
    }
}
