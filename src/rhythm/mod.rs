//! The breathing clock
//!
//! Alternates inhale and exhale phases and spawns the beams for each phase
//! early enough that they reach the user just as the phase begins. The
//! phase clock itself only starts once the very first beam has arrived.

use crate::beam::spawner::BeamSpawner;
use crate::devices::{AudioCues, HandTracking};
use crate::events::{BreathEvent, BreathObserver, ObserverId, Observers};
use crate::path::MovementPattern;
use crate::rhythm::deferred::Deferred;
use crate::units::{Meters, MetersPerSecond, Seconds, IMMEDIATE, MIN_PHASE, STANDSTILL};
use crate::HandSide;
use glam::Vec3;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub mod deferred;

/// Beam speed assumed when there is no template to ask
pub const DEFAULT_BEAM_SPEED: MetersPerSecond = MetersPerSecond(2.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmSettings {
    pub inhale: Seconds,
    pub exhale: Seconds,
    pub inhale_pattern: MovementPattern,
    pub exhale_pattern: MovementPattern,
    /// Full breaths after which the rhythm stops by itself
    pub target_cycles: Option<u32>,
    /// Where the beams should arrive
    pub user_position: Option<Vec3>,
    /// How often a spawn that fell due during a pause is retried
    pub pause_repoll: Seconds,
}

impl Default for RhythmSettings {
    fn default() -> Self {
        Self {
            inhale: Seconds(4.0),
            exhale: Seconds(6.0),
            inhale_pattern: MovementPattern::VerticalUp,
            exhale_pattern: MovementPattern::VerticalDown,
            target_cycles: None,
            user_position: Some(Vec3::new(0.0, 1.3, 0.0)),
            pause_repoll: Seconds(0.1),
        }
    }
}

#[derive(Debug)]
pub struct BreathRhythmController {
    settings: RhythmSettings,
    beams: BeamSpawner,
    observers: Observers,
    outbox: Vec<BreathEvent>,
    first_arrival: Deferred,
    next_spawn: Deferred,
    running: bool,
    paused: bool,
    waiting_for_first_beam: bool,
    inhaling: bool,
    elapsed: Seconds,
    duration: Seconds,
    beam_travel_time: Seconds,
    full_breaths: u32,
    breaths_started: u32,
}

impl BreathRhythmController {
    pub fn new(settings: RhythmSettings, beams: BeamSpawner) -> Self {
        let mut controller = Self {
            duration: settings.inhale.at_least(MIN_PHASE),
            settings,
            beams,
            observers: Observers::default(),
            outbox: Vec::new(),
            first_arrival: Deferred::default(),
            next_spawn: Deferred::default(),
            running: false,
            paused: false,
            waiting_for_first_beam: false,
            inhaling: true,
            elapsed: IMMEDIATE,
            beam_travel_time: IMMEDIATE,
            full_breaths: 0,
            breaths_started: 0,
        };
        if let Some(target) = controller.settings.target_cycles {
            controller.set_target_cycles(target);
        }
        controller.calculate_timing();
        controller
    }

    pub fn subscribe(&mut self, observer: Box<dyn BreathObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn start_cycle(&mut self) {
        if self.running {
            return;
        }
        self.first_arrival.cancel();
        self.next_spawn.cancel();

        self.running = true;
        self.paused = false;
        self.waiting_for_first_beam = true;
        self.inhaling = true;
        self.elapsed = IMMEDIATE;
        self.duration = self.phase_duration(true);
        self.full_breaths = 0;
        self.breaths_started = 0;

        self.calculate_timing();
        self.spawn(true);
        self.first_arrival.arm(self.beam_travel_time);
        info!(
            "Breathing starts, first beam arrives in {}",
            self.beam_travel_time
        );
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.waiting_for_first_beam = false;
        self.first_arrival.cancel();
        self.next_spawn.cancel();
        self.elapsed = IMMEDIATE;
    }

    /// Freezes the phase clock. Spawns falling due meanwhile wait for the resume.
    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn tick(&mut self, dt: Seconds) {
        let dt = dt.clamp_non_negative();
        let arrived = self.first_arrival.advance(dt);
        let spawn_due = self.next_spawn.advance(dt);
        if arrived {
            self.on_first_beam_arrival();
        }
        if spawn_due {
            self.spawn_next_beam();
        }
        if !arrived {
            self.advance_phase(dt);
        }
        self.flush();
    }

    /// Moves the beams along and reports what the hands did to them
    pub fn tick_beams(
        &mut self,
        dt: Seconds,
        hands: &mut dyn HandTracking,
        audio: &mut dyn AudioCues,
    ) {
        self.beams.tick(dt, hands, audio, &mut self.outbox);
        self.flush();
    }

    fn advance_phase(&mut self, dt: Seconds) {
        if !self.running || self.paused || self.waiting_for_first_beam {
            return;
        }
        self.elapsed += dt;
        self.outbox.push(BreathEvent::ProgressUpdated(self.progress()));
        if self.elapsed >= self.duration {
            self.switch_phase();
        }
    }

    fn on_first_beam_arrival(&mut self) {
        if !self.running {
            return;
        }
        self.waiting_for_first_beam = false;
        self.inhaling = true;
        self.elapsed = IMMEDIATE;
        self.duration = self.phase_duration(true);
        self.breaths_started = 1;
        self.outbox.push(BreathEvent::FullBreathStarted(1));
        self.schedule_next_spawn();
        self.outbox.push(BreathEvent::PhaseChanged {
            inhaling: true,
            duration: self.duration,
        });
    }

    fn switch_phase(&mut self) {
        self.inhaling = !self.inhaling;
        self.elapsed = IMMEDIATE;
        self.duration = self.phase_duration(self.inhaling);
        if self.inhaling {
            self.full_breaths += 1;
            self.breaths_started += 1;
            self.outbox
                .push(BreathEvent::FullBreathStarted(self.breaths_started));
            if self.target_reached() {
                info!("Target of {} full breaths reached", self.full_breaths);
                self.stop();
                self.outbox.push(BreathEvent::TargetCyclesReached);
                return;
            }
        }
        debug!(
            "{} for {}",
            if self.inhaling { "Inhale" } else { "Exhale" },
            self.duration
        );
        self.schedule_next_spawn();
        self.outbox.push(BreathEvent::PhaseChanged {
            inhaling: self.inhaling,
            duration: self.duration,
        });
    }

    fn schedule_next_spawn(&mut self) {
        self.next_spawn.arm(self.spawn_delay());
    }

    fn spawn_next_beam(&mut self) {
        if !self.running {
            return;
        }
        if self.paused {
            self.next_spawn.arm(self.settings.pause_repoll.at_least(MIN_PHASE));
            return;
        }
        let next_inhaling = !self.inhaling;
        // no beams for an inhale that will never come
        if next_inhaling {
            if let Some(target) = self.settings.target_cycles {
                if self.full_breaths + 1 >= target {
                    return;
                }
            }
        }
        self.spawn(next_inhaling);
    }

    fn spawn(&mut self, inhaling: bool) {
        let pattern = if inhaling {
            self.settings.inhale_pattern
        } else {
            self.settings.exhale_pattern
        };
        self.beams.set_movement_pattern(pattern);
        self.beams.set_phase_duration(self.phase_duration(inhaling));
        self.beams.spawn_beams();
    }

    fn calculate_timing(&mut self) {
        let distance = match (self.beams.anchor(), self.settings.user_position) {
            (Some(anchor), Some(user)) => Meters(anchor.position.distance(user)),
            _ => {
                warn!("Spawn point or user position missing, beams will not lead the phase");
                Meters(0.0)
            }
        };
        let speed = self
            .beams
            .template(HandSide::Left)
            .map(|template| template.flow_speed)
            .unwrap_or(DEFAULT_BEAM_SPEED);
        self.beam_travel_time = if speed <= STANDSTILL {
            IMMEDIATE
        } else {
            distance / speed
        };
    }

    fn flush(&mut self) {
        if self.observers.is_empty() {
            self.outbox.clear();
            return;
        }
        if self.outbox.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.outbox);
        self.observers.deliver(&events);
    }

    fn phase_duration(&self, inhaling: bool) -> Seconds {
        let duration = if inhaling {
            self.settings.inhale
        } else {
            self.settings.exhale
        };
        duration.at_least(MIN_PHASE)
    }

    fn progress(&self) -> f32 {
        (self.elapsed / self.duration.at_least(MIN_PHASE)).clamp(0.0, 1.0)
    }

    fn target_reached(&self) -> bool {
        matches!(self.settings.target_cycles, Some(target) if self.full_breaths >= target)
    }

    /// How long after a phase starts the beams for the next phase are launched
    pub fn spawn_delay(&self) -> Seconds {
        (self.duration - self.beam_travel_time).clamp_non_negative()
    }

    pub fn set_movement_patterns(&mut self, inhale: MovementPattern, exhale: MovementPattern) {
        self.settings.inhale_pattern = inhale;
        self.settings.exhale_pattern = exhale;
    }

    pub fn movement_patterns(&self) -> (MovementPattern, MovementPattern) {
        (self.settings.inhale_pattern, self.settings.exhale_pattern)
    }

    pub fn set_target_cycles(&mut self, cycles: u32) {
        self.settings.target_cycles = Some(cycles.max(1));
    }

    pub fn target_cycles(&self) -> Option<u32> {
        self.settings.target_cycles
    }

    /// Takes effect from the next phase on
    pub fn set_durations(&mut self, inhale: Seconds, exhale: Seconds) {
        self.settings.inhale = inhale.at_least(MIN_PHASE);
        self.settings.exhale = exhale.at_least(MIN_PHASE);
    }

    pub fn set_user_position(&mut self, position: Option<Vec3>) {
        self.settings.user_position = position;
        self.calculate_timing();
    }

    /// Whether inhaling, progress in [0, 1], and time left in the phase
    pub fn current_phase(&self) -> (bool, f32, Seconds) {
        if self.waiting_for_first_beam {
            return (true, 0.0, self.beam_travel_time);
        }
        let remaining = (self.duration - self.elapsed).clamp_non_negative();
        (self.inhaling, self.progress(), remaining)
    }

    pub fn beam_travel_time(&self) -> Seconds {
        self.beam_travel_time
    }

    pub fn full_breaths(&self) -> u32 {
        self.full_breaths
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_waiting_for_first_beam(&self) -> bool {
        self.waiting_for_first_beam
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.next_spawn.is_armed()
    }

    pub fn beams(&self) -> &BeamSpawner {
        &self.beams
    }

    pub fn beams_mut(&mut self) -> &mut BeamSpawner {
        &mut self.beams
    }
}
