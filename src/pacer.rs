//! The breath pacer: a growing and shrinking circle that tells the user what to do.
//!
//! Only the visual state is modelled here, drawing it is up to the host.

use crate::events::{BreathEvent, BreathObserver};
use crate::path::smooth_step;
use crate::units::{Seconds, MIN_BEAM_PHASE};

const MIN_SCALE: f32 = 0.3;
const MAX_SCALE: f32 = 1.0;
const INHALE_COLOR: [f32; 3] = [0.3, 0.8, 1.0];
const EXHALE_COLOR: [f32; 3] = [1.0, 0.6, 0.3];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacerVisual {
    pub scale: f32,
    pub fill_color: [f32; 3],
    pub instruction: &'static str,
    pub instruction_color: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct BreathPacer {
    inhaling: bool,
    progress: f32,
    duration: Seconds,
}

impl Default for BreathPacer {
    fn default() -> Self {
        Self {
            inhaling: true,
            progress: 0.0,
            duration: Seconds(4.0),
        }
    }
}

impl BreathPacer {
    pub fn set_breath_duration(&mut self, duration: Seconds) {
        self.duration = duration.at_least(MIN_BEAM_PHASE);
    }

    pub fn set_phase(&mut self, inhaling: bool, progress: f32) {
        self.inhaling = inhaling;
        self.progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn visual(&self) -> PacerVisual {
        let eased = smooth_step(self.progress);
        if self.inhaling {
            PacerVisual {
                scale: lerp(MIN_SCALE, MAX_SCALE, eased),
                fill_color: mix(EXHALE_COLOR, INHALE_COLOR, eased),
                instruction: "Breathe In",
                instruction_color: mix(WHITE, INHALE_COLOR, eased),
            }
        } else {
            PacerVisual {
                scale: lerp(MAX_SCALE, MIN_SCALE, eased),
                fill_color: mix(INHALE_COLOR, EXHALE_COLOR, eased),
                instruction: "Breathe Out",
                instruction_color: mix(WHITE, EXHALE_COLOR, eased),
            }
        }
    }
}

impl BreathObserver for BreathPacer {
    fn observe(&mut self, event: &BreathEvent) {
        match *event {
            BreathEvent::PhaseChanged { inhaling, duration } => {
                self.set_breath_duration(duration);
                self.set_phase(inhaling, 0.0);
            }
            BreathEvent::ProgressUpdated(progress) => {
                self.set_phase(self.inhaling, progress);
            }
            _ => {}
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn mix(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp(from[0], to[0], t),
        lerp(from[1], to[1], t),
        lerp(from[2], to[2], t),
    ]
}
