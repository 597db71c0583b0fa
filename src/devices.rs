//! The engine's view of the outside world: tracked hands and an audio player.

use crate::units::Seconds;
use crate::HandSide;
use glam::Vec3;
use log::info;

/// Source of hand positions and sink for haptic pulses
pub trait HandTracking {
    /// Current position of a hand, if the device is tracked right now
    fn try_hand_position(&self, side: HandSide) -> Option<Vec3>;

    fn trigger_haptic(&mut self, side: HandSide, amplitude: f32, duration: Seconds);
}

/// Fire-and-forget named audio cues
pub trait AudioCues {
    fn play_cue(&mut self, name: &str);
}

/// A haptic request waiting for the hardware layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub side: HandSide,
    pub amplitude: f32,
    pub duration: Seconds,
}

/// Hand state as last reported by the controller hardware.
///
/// The driver pushes positions in every frame with [`HandTracker::update`] and
/// drains the haptic pulses the engine asked for.
#[derive(Debug, Clone, Default)]
pub struct HandTracker {
    left: Option<Vec3>,
    right: Option<Vec3>,
    pulses: Vec<HapticPulse>,
}

impl HandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means the device lost tracking this frame
    pub fn update(&mut self, side: HandSide, position: Option<Vec3>) {
        match side {
            HandSide::Left => self.left = position,
            HandSide::Right => self.right = position,
        }
    }

    pub fn drain_haptics(&mut self) -> Vec<HapticPulse> {
        std::mem::take(&mut self.pulses)
    }

    pub fn pending_haptics(&self) -> &[HapticPulse] {
        &self.pulses
    }

    /// Drops pulses nobody collected
    pub fn clear_haptics(&mut self) {
        self.pulses.clear();
    }
}

impl HandTracking for HandTracker {
    fn try_hand_position(&self, side: HandSide) -> Option<Vec3> {
        match side {
            HandSide::Left => self.left,
            HandSide::Right => self.right,
        }
    }

    fn trigger_haptic(&mut self, side: HandSide, amplitude: f32, duration: Seconds) {
        if self.try_hand_position(side).is_none() {
            return;
        }
        self.pulses.push(HapticPulse {
            side,
            amplitude: amplitude.clamp(0.0, 1.0),
            duration,
        });
    }
}

/// Audio sink for headless runs: cues only show up in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggedAudio;

impl AudioCues for LoggedAudio {
    fn play_cue(&mut self, name: &str) {
        info!("cue {name}");
    }
}
