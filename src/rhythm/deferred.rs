use crate::units::Seconds;

/// A cancellable one-shot callback slot, driven by simulated time.
///
/// Arming an armed slot replaces the pending delay, so there is never more
/// than one outstanding instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deferred {
    remaining: Option<Seconds>,
}

impl Deferred {
    pub fn arm(&mut self, delay: Seconds) {
        self.remaining = Some(delay.clamp_non_negative());
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<Seconds> {
        self.remaining
    }

    /// True exactly once, on the step in which the delay runs out
    pub fn advance(&mut self, dt: Seconds) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let left = remaining - dt;
        if *left <= 0.0 {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(left);
            false
        }
    }
}
