use crate::beam::segment::{BeamParams, BeamSegment};
use crate::beam::{BeamSettings, SegmentKey};
use crate::devices::{AudioCues, HandTracking};
use crate::events::BreathEvent;
use crate::path::{path_point, MovementPattern, RingGeometry};
use crate::units::{Seconds, MIN_BEAM_PHASE};
use crate::HandSide;
use glam::Vec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Where beams come from and which way they fly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnAnchor {
    pub position: Vec3,
    pub forward: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    pub anchor: Option<SpawnAnchor>,
    pub ring_radius: f32,
    pub ring_right: Vec3,
    pub chest_inner_ratio: f32,
    pub spawn_left: bool,
    pub spawn_right: bool,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            anchor: Some(SpawnAnchor {
                position: Vec3::new(0.0, 1.3, 4.0),
                forward: Vec3::NEG_Z,
            }),
            ring_radius: 0.35,
            ring_right: Vec3::X,
            chest_inner_ratio: 0.1,
            spawn_left: true,
            spawn_right: true,
        }
    }
}

/// Owns the live beam segments, one per enabled hand per phase
#[derive(Debug)]
pub struct BeamSpawner {
    settings: SpawnerSettings,
    left_template: Option<BeamSettings>,
    right_template: Option<BeamSettings>,
    pattern: MovementPattern,
    phase_duration: Seconds,
    segments: SlotMap<SegmentKey, BeamSegment>,
}

impl BeamSpawner {
    pub fn new(settings: SpawnerSettings, template: BeamSettings) -> Self {
        Self {
            settings,
            left_template: Some(template.clone()),
            right_template: Some(template),
            pattern: MovementPattern::VerticalUp,
            phase_duration: Seconds(4.0),
            segments: SlotMap::with_key(),
        }
    }

    pub fn set_anchor(&mut self, anchor: Option<SpawnAnchor>) {
        self.settings.anchor = anchor;
    }

    pub fn anchor(&self) -> Option<SpawnAnchor> {
        self.settings.anchor
    }

    pub fn set_template(&mut self, side: HandSide, template: Option<BeamSettings>) {
        match side {
            HandSide::Left => self.left_template = template,
            HandSide::Right => self.right_template = template,
        }
    }

    pub fn template(&self, side: HandSide) -> Option<&BeamSettings> {
        match side {
            HandSide::Left => self.left_template.as_ref(),
            HandSide::Right => self.right_template.as_ref(),
        }
    }

    pub fn set_hand_enabled(&mut self, side: HandSide, enabled: bool) {
        match side {
            HandSide::Left => self.settings.spawn_left = enabled,
            HandSide::Right => self.settings.spawn_right = enabled,
        }
    }

    pub fn hand_enabled(&self, side: HandSide) -> bool {
        match side {
            HandSide::Left => self.settings.spawn_left,
            HandSide::Right => self.settings.spawn_right,
        }
    }

    pub fn set_phase_duration(&mut self, duration: Seconds) {
        self.phase_duration = duration.at_least(MIN_BEAM_PHASE);
    }

    pub fn phase_duration(&self) -> Seconds {
        self.phase_duration
    }

    pub fn set_movement_pattern(&mut self, pattern: MovementPattern) {
        self.pattern = pattern;
    }

    pub fn movement_pattern(&self) -> MovementPattern {
        self.pattern
    }

    /// The ring around the spawn anchor, if there is one
    pub fn ring(&self) -> Option<RingGeometry> {
        self.settings.anchor.map(|anchor| {
            RingGeometry::new(
                anchor.position,
                self.settings.ring_radius,
                self.settings.ring_right,
                self.settings.chest_inner_ratio,
            )
        })
    }

    pub fn spawn_beams(&mut self) -> Vec<SegmentKey> {
        let (Some(anchor), Some(ring)) = (self.settings.anchor, self.ring()) else {
            warn!("No spawn anchor, not spawning {} beams", self.pattern);
            return Vec::new();
        };
        let mut spawned = Vec::new();
        for side in [HandSide::Left, HandSide::Right] {
            if !self.hand_enabled(side) {
                continue;
            }
            let Some(template) = self.template(side).cloned() else {
                warn!("No beam template for the {side} hand, skipping its beam");
                continue;
            };
            let start = path_point(self.pattern, &ring, side, 0.0);
            let params = BeamParams {
                forward: anchor.forward,
                pattern: self.pattern,
                ring,
                side,
                phase_duration: self.phase_duration,
            };
            let key = self
                .segments
                .insert_with_key(|key| BeamSegment::new(key, params, template));
            debug!(
                "Spawned {side} {} beam at {start} for {}",
                self.pattern, self.phase_duration
            );
            spawned.push(key);
        }
        spawned
    }

    /// Advance every live beam and let go of the ones that are done
    pub fn tick(
        &mut self,
        dt: Seconds,
        hands: &mut dyn HandTracking,
        audio: &mut dyn AudioCues,
        events: &mut Vec<BreathEvent>,
    ) {
        for (_, segment) in self.segments.iter_mut() {
            segment.tick(dt, hands, audio, events);
        }
        self.segments.retain(|_, segment| !segment.is_destroyed());
    }

    pub fn clear_all(&mut self) {
        if !self.segments.is_empty() {
            debug!("Clearing {} beams", self.segments.len());
        }
        for (_, segment) in self.segments.iter_mut() {
            segment.destroy();
        }
        self.segments.clear();
    }

    pub fn active_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, key: SegmentKey) -> Option<&BeamSegment> {
        self.segments.get(key)
    }

    pub fn segments(&self) -> impl Iterator<Item = &BeamSegment> {
        self.segments.values()
    }
}
