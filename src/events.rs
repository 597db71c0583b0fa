use crate::units::Seconds;
use crate::HandSide;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Everything the rhythm engine tells the outside world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreathEvent {
    PhaseChanged { inhaling: bool, duration: Seconds },
    /// Progress through the current phase, in [0, 1]
    ProgressUpdated(f32),
    FullBreathStarted(u32),
    TargetCyclesReached,
    BeamCompleted(HandSide),
    /// A hand reached a beam for the first time
    BeamTouched(HandSide),
}

pub trait BreathObserver {
    fn observe(&mut self, event: &BreathEvent);
}

/// Lets the owner keep a handle on an observer after subscribing it
impl<T: BreathObserver> BreathObserver for Rc<RefCell<T>> {
    fn observe(&mut self, event: &BreathEvent) {
        self.borrow_mut().observe(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Subscribed observers, notified in the order they subscribed
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribed: Vec<(ObserverId, Box<dyn BreathObserver>)>,
}

impl Debug for Observers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribed", &self.subscribed.len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, observer: Box<dyn BreathObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.subscribed.push((id, observer));
        id
    }

    /// False if nobody was subscribed under this id
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.subscribed.len();
        self.subscribed.retain(|(subscribed, _)| *subscribed != id);
        self.subscribed.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty()
    }

    /// Every event goes to every observer before the next event is delivered
    pub fn deliver(&mut self, events: &[BreathEvent]) {
        for event in events {
            for (_, observer) in self.subscribed.iter_mut() {
                observer.observe(event);
            }
        }
    }
}
