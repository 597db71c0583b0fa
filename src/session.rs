//! A breathing session wires the rhythm to the devices and to its listeners.

use crate::beam::spawner::BeamSpawner;
use crate::config::BreathConfig;
use crate::devices::{AudioCues, HandTracker};
use crate::error::BreathError;
use crate::events::{BreathObserver, ObserverId};
use crate::pacer::{BreathPacer, PacerVisual};
use crate::patterns::{BreathPattern, PatternLibrary};
use crate::rhythm::BreathRhythmController;
use crate::stats::BreathStats;
use crate::units::Seconds;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;

pub struct BreathSession {
    controller: BreathRhythmController,
    hands: HandTracker,
    audio: Box<dyn AudioCues>,
    pacer: Rc<RefCell<BreathPacer>>,
    stats: Rc<RefCell<BreathStats>>,
    library: PatternLibrary,
}

impl BreathSession {
    pub fn new(config: BreathConfig, audio: Box<dyn AudioCues>) -> Result<Self, BreathError> {
        let BreathConfig {
            rhythm,
            beam,
            spawner,
            pattern,
        } = config;
        let inhale = rhythm.inhale;
        let beams = BeamSpawner::new(spawner, beam);
        let mut controller = BreathRhythmController::new(rhythm, beams);

        let pacer = Rc::new(RefCell::new(BreathPacer::default()));
        pacer.borrow_mut().set_breath_duration(inhale);
        let stats = Rc::new(RefCell::new(BreathStats::default()));
        controller.subscribe(Box::new(pacer.clone()));
        controller.subscribe(Box::new(stats.clone()));

        let mut session = Self {
            controller,
            hands: HandTracker::new(),
            audio,
            pacer,
            stats,
            library: PatternLibrary::default(),
        };
        if let Some(name) = pattern {
            session.use_pattern(&name)?;
        }
        Ok(session)
    }

    pub fn subscribe(&mut self, observer: Box<dyn BreathObserver>) -> ObserverId {
        self.controller.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.controller.unsubscribe(id)
    }

    /// Switch to a named breath pattern from the next spawn on.
    /// An unknown name leaves the current patterns in place.
    pub fn use_pattern(&mut self, name: &str) -> Result<BreathPattern, BreathError> {
        let Some(pattern) = self.library.get(name) else {
            warn!("No breath pattern named {name:?}, keeping the current one");
            return Err(BreathError::UnknownPattern(name.to_string()));
        };
        info!(
            "Breath pattern {name}: {} then {}",
            pattern.inhale, pattern.exhale
        );
        self.controller
            .set_movement_patterns(pattern.inhale, pattern.exhale);
        Ok(pattern)
    }

    pub fn start(&mut self) {
        self.stats.borrow_mut().reset();
        self.controller.start_cycle();
    }

    /// Advances the rhythm and the beams by one frame.
    ///
    /// Haptic pulses requested during the step wait in [`BreathSession::hands_mut`]
    /// until the next step begins, so the host drains them in between.
    pub fn step(&mut self, dt: Seconds) {
        self.hands.clear_haptics();
        self.controller.tick(dt);
        self.controller
            .tick_beams(dt, &mut self.hands, self.audio.as_mut());
    }

    /// Stops the rhythm and removes every beam
    pub fn teardown(&mut self) {
        self.controller.stop();
        self.controller.beams_mut().clear_all();
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn controller(&self) -> &BreathRhythmController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut BreathRhythmController {
        &mut self.controller
    }

    pub fn hands(&self) -> &HandTracker {
        &self.hands
    }

    pub fn hands_mut(&mut self) -> &mut HandTracker {
        &mut self.hands
    }

    pub fn pacer(&self) -> PacerVisual {
        self.pacer.borrow().visual()
    }

    pub fn stats(&self) -> BreathStats {
        self.stats.borrow().clone()
    }

    pub fn library_mut(&mut self) -> &mut PatternLibrary {
        &mut self.library
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::MovementPattern;
    use crate::testing::RecordingAudio;

    fn session(config: BreathConfig) -> BreathSession {
        BreathSession::new(config, Box::new(RecordingAudio::default())).unwrap()
    }

    #[test]
    fn test_named_pattern_from_config() {
        let config = BreathConfig {
            pattern: Some("circle".to_string()),
            ..BreathConfig::default()
        };
        let session = session(config);
        assert_eq!(
            session.controller().movement_patterns(),
            (MovementPattern::CircleInhale, MovementPattern::CircleExhale)
        );
    }

    #[test]
    fn test_unknown_pattern() {
        let config = BreathConfig {
            pattern: Some("spiral".to_string()),
            ..BreathConfig::default()
        };
        assert!(matches!(
            BreathSession::new(config, Box::new(RecordingAudio::default())),
            Err(BreathError::UnknownPattern(_))
        ));

        let mut session = session(BreathConfig::default());
        assert!(session.use_pattern("spiral").is_err());
        assert_eq!(
            session.controller().movement_patterns(),
            (MovementPattern::VerticalUp, MovementPattern::VerticalDown)
        );
    }

    #[test]
    fn test_pacer_follows_rhythm() {
        let mut session = session(BreathConfig::default());
        session.start();
        for _ in 0..300 {
            session.step(Seconds(0.01));
        }
        let visual = session.pacer();
        assert_eq!(visual.instruction, "Breathe In");
        assert!(visual.scale > 0.3);
        assert_eq!(session.stats().full_breaths, 1);
    }

    #[test]
    fn test_teardown() {
        let mut session = session(BreathConfig::default());
        session.start();
        session.step(Seconds(0.01));
        assert_eq!(session.controller().beams().active_count(), 2);
        session.teardown();
        assert!(!session.is_running());
        assert_eq!(session.controller().beams().active_count(), 0);
        assert!(!session.controller().has_pending_spawn());
    }
}
