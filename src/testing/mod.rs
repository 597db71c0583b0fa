//! Stand-ins for the hardware, for tests and scripted runs

use crate::devices::{AudioCues, HandTracking, HapticPulse};
use crate::events::{BreathEvent, BreathObserver};
use crate::units::Seconds;
use crate::HandSide;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// Hands that are wherever the script puts them, and remember every haptic request
#[derive(Debug, Clone, Default)]
pub struct ScriptedHands {
    left: Option<Vec3>,
    right: Option<Vec3>,
    haptics: Vec<HapticPulse>,
}

impl ScriptedHands {
    pub fn place(&mut self, side: HandSide, position: Option<Vec3>) {
        match side {
            HandSide::Left => self.left = position,
            HandSide::Right => self.right = position,
        }
    }

    pub fn haptics(&self) -> &[HapticPulse] {
        &self.haptics
    }
}

impl HandTracking for ScriptedHands {
    fn try_hand_position(&self, side: HandSide) -> Option<Vec3> {
        match side {
            HandSide::Left => self.left,
            HandSide::Right => self.right,
        }
    }

    fn trigger_haptic(&mut self, side: HandSide, amplitude: f32, duration: Seconds) {
        self.haptics.push(HapticPulse {
            side,
            amplitude,
            duration,
        });
    }
}

/// Remembers the cues instead of playing them. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    played: Rc<RefCell<Vec<String>>>,
}

impl RecordingAudio {
    pub fn cues(&self) -> Vec<String> {
        self.played.borrow().clone()
    }
}

impl AudioCues for RecordingAudio {
    fn play_cue(&mut self, name: &str) {
        self.played.borrow_mut().push(name.to_string());
    }
}

/// Observer that keeps every event it sees
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<BreathEvent>,
}

impl EventLog {
    pub fn shared() -> Rc<RefCell<EventLog>> {
        Rc::new(RefCell::new(EventLog::default()))
    }

    pub fn count(&self, predicate: impl Fn(&BreathEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    pub fn phase_changes(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BreathEvent::PhaseChanged { inhaling, .. } => Some(*inhaling),
                _ => None,
            })
            .collect()
    }

    /// Events other than the per-tick progress reports
    pub fn milestones(&self) -> Vec<BreathEvent> {
        self.events
            .iter()
            .filter(|event| !matches!(event, BreathEvent::ProgressUpdated(_)))
            .copied()
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BreathObserver for EventLog {
    fn observe(&mut self, event: &BreathEvent) {
        self.events.push(*event);
    }
}
