use crate::events::{BreathEvent, BreathObserver};
use crate::HandSide;

/// Per-hand tally of beams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandTally {
    pub completed: u32,
    pub touched: u32,
}

/// How the user kept up with the beams during a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreathStats {
    pub full_breaths: u32,
    pub target_reached: bool,
    pub left: HandTally,
    pub right: HandTally,
}

impl BreathStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn hand(&self, side: HandSide) -> &HandTally {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, side: HandSide) -> &mut HandTally {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    pub fn beams_completed(&self) -> u32 {
        self.left.completed + self.right.completed
    }

    pub fn beams_touched(&self) -> u32 {
        self.left.touched + self.right.touched
    }

    /// Share of finished beams a hand reached at some point
    pub fn hit_rate(&self) -> f32 {
        match self.beams_completed() {
            0 => 0.0,
            completed => (self.beams_touched() as f32 / completed as f32).min(1.0),
        }
    }
}

impl BreathObserver for BreathStats {
    fn observe(&mut self, event: &BreathEvent) {
        match *event {
            BreathEvent::FullBreathStarted(count) => self.full_breaths = count,
            BreathEvent::TargetCyclesReached => {
                // the breath announced with the stop never runs
                self.full_breaths = self.full_breaths.saturating_sub(1);
                self.target_reached = true;
            }
            BreathEvent::BeamCompleted(side) => self.hand_mut(side).completed += 1,
            BreathEvent::BeamTouched(side) => self.hand_mut(side).touched += 1,
            BreathEvent::PhaseChanged { .. } | BreathEvent::ProgressUpdated(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let mut stats = BreathStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        for event in [
            BreathEvent::FullBreathStarted(1),
            BreathEvent::BeamTouched(HandSide::Left),
            BreathEvent::BeamCompleted(HandSide::Left),
            BreathEvent::BeamCompleted(HandSide::Right),
            BreathEvent::FullBreathStarted(2),
        ] {
            stats.observe(&event);
        }
        assert_eq!(stats.full_breaths, 2);
        assert_eq!(stats.hand(HandSide::Left).touched, 1);
        assert_eq!(stats.beams_completed(), 2);
        assert_eq!(stats.hit_rate(), 0.5);
        stats.reset();
        assert_eq!(stats, BreathStats::default());
    }

    #[test]
    fn test_breath_announced_at_target_is_not_counted() {
        let mut stats = BreathStats::default();
        for count in 1..=3 {
            stats.observe(&BreathEvent::FullBreathStarted(count));
        }
        stats.observe(&BreathEvent::TargetCyclesReached);
        assert!(stats.target_reached);
        assert_eq!(stats.full_breaths, 2);
    }
}
