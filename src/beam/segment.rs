use crate::beam::proximity::{BeamCurve, ProximityDetector};
use crate::beam::{BeamSettings, SegmentKey};
use crate::devices::{AudioCues, HandTracking};
use crate::events::BreathEvent;
use crate::path::{path_point, smooth_step, MovementPattern, RingGeometry};
use crate::units::{Meters, MetersPerSecond, Seconds, IMMEDIATE, MIN_PHASE};
use crate::HandSide;
use glam::Vec3;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifecycle {
    Traveling,
    /// Speeding off after the phase, since the given beam age
    FlyingAway { since: Seconds },
    Destroyed,
}

/// Everything a beam needs to know about the phase it guides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamParams {
    pub forward: Vec3,
    pub pattern: MovementPattern,
    pub ring: RingGeometry,
    pub side: HandSide,
    pub phase_duration: Seconds,
}

/// One guide beam, from spawn to fly-away
#[derive(Debug, Clone)]
pub struct BeamSegment {
    id: SegmentKey,
    settings: BeamSettings,
    side: HandSide,
    pattern: MovementPattern,
    ring: RingGeometry,
    forward: Vec3,
    duration: Seconds,
    cp1: Vec3,
    cp2: Vec3,
    cp1_velocity: Vec3,
    elapsed: Seconds,
    travel: Meters,
    proximity: ProximityDetector,
    touching: bool,
    ever_touched: bool,
    pulsing: bool,
    haptic_timer: Seconds,
    lifecycle: Lifecycle,
    completed: bool,
    warned_untracked: bool,
}

impl BeamSegment {
    pub fn new(id: SegmentKey, params: BeamParams, settings: BeamSettings) -> Self {
        let start = path_point(params.pattern, &params.ring, params.side, 0.0);
        let proximity = ProximityDetector::new(
            settings.detection_radius,
            settings.detection_samples,
            settings.detection_interval,
        );
        Self {
            id,
            side: params.side,
            pattern: params.pattern,
            ring: params.ring,
            forward: params.forward.normalize_or(Vec3::Z),
            duration: params.phase_duration.at_least(MIN_PHASE),
            cp1: start,
            cp2: start,
            cp1_velocity: Vec3::ZERO,
            elapsed: IMMEDIATE,
            travel: Meters(0.0),
            proximity,
            touching: false,
            ever_touched: false,
            pulsing: false,
            haptic_timer: IMMEDIATE,
            lifecycle: Lifecycle::Traveling,
            completed: false,
            warned_untracked: false,
            settings,
        }
    }

    pub fn tick(
        &mut self,
        dt: Seconds,
        hands: &mut dyn HandTracking,
        audio: &mut dyn AudioCues,
        events: &mut Vec<BreathEvent>,
    ) {
        if self.is_destroyed() {
            return;
        }
        let dt = dt.clamp_non_negative();
        self.elapsed += dt;
        self.advance_flow(dt);
        self.update_control_points(dt);
        if !self.completed {
            self.detect_hands(dt, hands, audio, events);
            self.touch_feedback(dt, hands);
        }
        self.check_auto_completion(events);
        self.manage_lifecycle();
    }

    fn advance_flow(&mut self, dt: Seconds) {
        let speed = match self.lifecycle {
            Lifecycle::FlyingAway { since } => {
                let fly_duration = self.settings.fly_away_duration.at_least(MIN_PHASE);
                let fly_t = ((self.elapsed - since) / fly_duration).clamp(0.0, 1.0);
                MetersPerSecond(
                    *self.settings.flow_speed
                        + (*self.settings.fly_away_speed - *self.settings.flow_speed) * fly_t,
                )
            }
            _ => self.settings.flow_speed,
        };
        self.travel = Meters(*self.travel + *(speed * dt));
    }

    fn update_control_points(&mut self, dt: Seconds) {
        let raw = (self.elapsed / self.duration * self.settings.cp2_path_speed).clamp(0.0, 1.0);
        let t = smooth_step(raw);
        let on_path = path_point(self.pattern, &self.ring, self.side, t);
        self.cp2 = on_path + self.forward * (*self.travel * self.settings.cp2_forward_factor);

        let t_lead = (t * self.settings.cp1_follow_ratio).clamp(0.0, 1.0);
        let lead = path_point(self.pattern, &self.ring, self.side, t_lead);
        let target = lead + self.forward * *self.travel;
        self.cp1 = smooth_damp(
            self.cp1,
            target,
            &mut self.cp1_velocity,
            self.settings.cp1_smooth_time,
            dt,
        );
    }

    fn detect_hands(
        &mut self,
        dt: Seconds,
        hands: &dyn HandTracking,
        audio: &mut dyn AudioCues,
        events: &mut Vec<BreathEvent>,
    ) {
        let curve = self.curve();
        let Some(detection) = self.proximity.poll(dt, &curve, hands) else {
            return;
        };
        if detection.hands_tracked == 0 && !self.warned_untracked {
            warn!("No tracked hands for the {} beam, skipping touch feedback", self.side);
            self.warned_untracked = true;
        }
        if detection.in_range && !self.touching {
            self.touching = true;
            self.haptic_timer = IMMEDIATE;
            self.pulsing = true;
            audio.play_cue(&self.settings.hit_cue);
            if !self.ever_touched {
                self.ever_touched = true;
                events.push(BreathEvent::BeamTouched(self.side));
            }
        } else if !detection.in_range && self.touching {
            self.touching = false;
            self.pulsing = false;
        }
    }

    fn touch_feedback(&mut self, dt: Seconds, hands: &mut dyn HandTracking) {
        if !self.touching {
            return;
        }
        self.haptic_timer += dt;
        if self.haptic_timer >= self.settings.haptic_interval {
            hands.trigger_haptic(
                self.side,
                self.settings.haptic_amplitude,
                self.settings.haptic_interval,
            );
            self.haptic_timer = IMMEDIATE;
        }
    }

    fn check_auto_completion(&mut self, events: &mut Vec<BreathEvent>) {
        if self.completed || self.progress() < self.settings.auto_complete_at {
            return;
        }
        self.completed = true;
        self.touching = false;
        self.pulsing = false;
        events.push(BreathEvent::BeamCompleted(self.side));
        if self.lifecycle == Lifecycle::Traveling {
            self.lifecycle = Lifecycle::FlyingAway {
                since: self.elapsed,
            };
        }
    }

    fn manage_lifecycle(&mut self) {
        if self.lifecycle == Lifecycle::Traveling && self.elapsed >= self.duration {
            self.lifecycle = Lifecycle::FlyingAway {
                since: self.elapsed,
            };
        }
        let lifetime =
            self.duration + self.settings.fly_away_duration + self.settings.extra_lifetime;
        if self.elapsed > lifetime {
            debug!("{} beam done after {}", self.side, self.elapsed);
            self.lifecycle = Lifecycle::Destroyed;
        }
    }

    pub fn id(&self) -> SegmentKey {
        self.id
    }

    pub fn side(&self) -> HandSide {
        self.side
    }

    pub fn pattern(&self) -> MovementPattern {
        self.pattern
    }

    pub fn ring(&self) -> &RingGeometry {
        &self.ring
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    pub fn travel_distance(&self) -> Meters {
        self.travel
    }

    /// Progress through the guided phase, in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Trailing point (the tip) and leading point (the tail)
    pub fn control_points(&self) -> (Vec3, Vec3) {
        (self.cp1, self.cp2)
    }

    pub fn curve(&self) -> BeamCurve {
        let lift = if self.pattern.is_horizontal() {
            self.ring.up() * self.settings.horizontal_lift
        } else {
            Vec3::ZERO
        };
        BeamCurve::between(self.cp2, self.cp1, lift)
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Whether the hit particles should be showing
    pub fn is_pulsing(&self) -> bool {
        self.pulsing
    }

    pub fn was_touched(&self) -> bool {
        self.ever_touched
    }

    pub fn has_completed(&self) -> bool {
        self.completed
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn destroy(&mut self) {
        self.touching = false;
        self.pulsing = false;
        self.lifecycle = Lifecycle::Destroyed;
    }
}

/// Critically damped spring toward `target`, never overshooting it
fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: Seconds,
    dt: Seconds,
) -> Vec3 {
    if *dt <= 0.0 {
        return current;
    }
    let omega = 2.0 / smooth_time.0.max(0.0001);
    let x = omega * *dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * *dt;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;
    if (target - current).dot(output - target) > 0.0 {
        *velocity = Vec3::ZERO;
        return target;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingAudio, ScriptedHands};
    use slotmap::SlotMap;

    const DT: Seconds = Seconds(0.01);

    fn params(pattern: MovementPattern, side: HandSide) -> BeamParams {
        BeamParams {
            forward: Vec3::NEG_Z,
            pattern,
            ring: RingGeometry::new(Vec3::new(0.0, 1.4, 0.0), 0.4, Vec3::X, 0.1),
            side,
            phase_duration: Seconds(4.0),
        }
    }

    fn segment(pattern: MovementPattern, side: HandSide) -> BeamSegment {
        let mut keys: SlotMap<SegmentKey, ()> = SlotMap::with_key();
        BeamSegment::new(keys.insert(()), params(pattern, side), BeamSettings::default())
    }

    fn run(
        segment: &mut BeamSegment,
        seconds: f32,
        hands: &mut ScriptedHands,
        audio: &mut RecordingAudio,
        events: &mut Vec<BreathEvent>,
    ) {
        let ticks = (seconds / *DT).round() as usize;
        for _ in 0..ticks {
            segment.tick(DT, hands, audio, events);
        }
    }

    #[test]
    fn test_starts_on_path() {
        let beam = segment(MovementPattern::VerticalUp, HandSide::Left);
        let start = path_point(beam.pattern, &beam.ring, HandSide::Left, 0.0);
        assert_eq!(beam.control_points(), (start, start));
        assert_eq!(beam.lifecycle(), Lifecycle::Traveling);
        assert!(!beam.has_completed());
        assert!(!beam.is_touching());
    }

    #[test]
    fn test_elapsed_never_decreases() {
        let mut beam = segment(MovementPattern::CircleInhale, HandSide::Right);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        let mut previous = beam.elapsed();
        for step in 0..800 {
            let dt = if step % 3 == 0 { Seconds(-0.02) } else { DT };
            beam.tick(dt, &mut hands, &mut audio, &mut events);
            if beam.is_destroyed() {
                break;
            }
            assert!(beam.elapsed() >= previous);
            assert!(*beam.travel_distance() >= 0.0);
            previous = beam.elapsed();
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut beam = segment(MovementPattern::VerticalUp, HandSide::Left);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        run(&mut beam, 3.5, &mut hands, &mut audio, &mut events);
        assert_eq!(beam.lifecycle(), Lifecycle::Traveling);
        assert!(events.is_empty());

        // 0.9 of a 4 second phase
        run(&mut beam, 0.2, &mut hands, &mut audio, &mut events);
        assert!(beam.has_completed());
        assert!(matches!(beam.lifecycle(), Lifecycle::FlyingAway { .. }));
        assert_eq!(events, vec![BreathEvent::BeamCompleted(HandSide::Left)]);

        // 4.0 + 1.2 + 1.0
        run(&mut beam, 2.4, &mut hands, &mut audio, &mut events);
        assert!(!beam.is_destroyed());
        run(&mut beam, 0.2, &mut hands, &mut audio, &mut events);
        assert!(beam.is_destroyed());
        assert_eq!(events.len(), 1);

        let frozen = beam.elapsed();
        beam.tick(DT, &mut hands, &mut audio, &mut events);
        assert_eq!(beam.elapsed(), frozen);
    }

    #[test]
    fn test_flies_away_faster() {
        let mut beam = segment(MovementPattern::HorizontalOpen, HandSide::Right);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        run(&mut beam, 1.0, &mut hands, &mut audio, &mut events);
        let cruise = *beam.travel_distance();
        assert!((cruise - 2.0).abs() < 0.05, "{cruise}");
        run(&mut beam, 3.0, &mut hands, &mut audio, &mut events);
        let before = *beam.travel_distance();
        run(&mut beam, 1.0, &mut hands, &mut audio, &mut events);
        assert!(*beam.travel_distance() - before > 2.5);
    }

    #[test]
    fn test_trailing_point_lags_behind() {
        let mut beam = segment(MovementPattern::VerticalUp, HandSide::Left);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        run(&mut beam, 2.0, &mut hands, &mut audio, &mut events);
        let (cp1, cp2) = beam.control_points();
        assert!(cp1.is_finite() && cp2.is_finite());
        // the tip runs ahead along the forward direction
        assert!(cp1.z < cp2.z);
        assert!(cp1.distance(cp2) > 0.0);
    }

    #[test]
    fn test_touch_triggers_feedback() {
        let mut beam = segment(MovementPattern::VerticalUp, HandSide::Left);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        for _ in 0..40 {
            let (_, cp2) = beam.control_points();
            hands.place(HandSide::Right, Some(cp2));
            beam.tick(DT, &mut hands, &mut audio, &mut events);
        }
        assert!(beam.is_touching());
        assert!(beam.is_pulsing());
        assert_eq!(audio.cues(), vec!["breath_hit".to_string()]);
        assert_eq!(events, vec![BreathEvent::BeamTouched(HandSide::Left)]);
        // haptics go to the beam's own hand
        assert!(!hands.haptics().is_empty());
        assert!(hands.haptics().iter().all(|pulse| pulse.side == HandSide::Left));

        hands.place(HandSide::Right, Some(Vec3::splat(50.0)));
        run(&mut beam, 0.1, &mut hands, &mut audio, &mut events);
        assert!(!beam.is_touching());
        assert!(!beam.is_pulsing());
    }

    #[test]
    fn test_haptic_pulses_do_not_accumulate() {
        let mut beam = segment(MovementPattern::HorizontalClose, HandSide::Right);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        // one second of touching at 100 frames per second
        for _ in 0..100 {
            let (_, cp2) = beam.control_points();
            hands.place(HandSide::Right, Some(cp2));
            beam.tick(DT, &mut hands, &mut audio, &mut events);
        }
        let pulses = hands.haptics().len();
        assert!((8..=10).contains(&pulses), "{pulses} pulses");
        assert_eq!(audio.cues().len(), 1);
    }

    #[test]
    fn test_completion_ends_touching() {
        let mut beam = segment(MovementPattern::VerticalDown, HandSide::Right);
        let mut hands = ScriptedHands::default();
        let mut audio = RecordingAudio::default();
        let mut events = Vec::new();
        for _ in 0..380 {
            let (_, cp2) = beam.control_points();
            hands.place(HandSide::Left, Some(cp2));
            beam.tick(DT, &mut hands, &mut audio, &mut events);
        }
        assert!(beam.has_completed());
        assert!(!beam.is_touching());
        let haptics = hands.haptics().len();
        run(&mut beam, 0.5, &mut hands, &mut audio, &mut events);
        assert_eq!(hands.haptics().len(), haptics);
        assert_eq!(
            events,
            vec![
                BreathEvent::BeamTouched(HandSide::Right),
                BreathEvent::BeamCompleted(HandSide::Right)
            ]
        );
    }

    #[test]
    fn test_smooth_damp_settles() {
        let mut velocity = Vec3::ZERO;
        let mut position = Vec3::ZERO;
        let target = Vec3::new(1.0, 2.0, 3.0);
        for _ in 0..200 {
            position = smooth_damp(position, target, &mut velocity, Seconds(0.08), DT);
        }
        assert!(position.distance(target) < 1e-3);
        assert_eq!(
            smooth_damp(position, target, &mut velocity, Seconds(0.08), IMMEDIATE),
            position
        );
    }
}
