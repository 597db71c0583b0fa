use crate::path::MovementPattern;
use log::warn;
use serde::{Deserialize, Serialize};

/// The pair of movements that make up one full breath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathPattern {
    pub inhale: MovementPattern,
    pub exhale: MovementPattern,
}

/// Breath patterns by name, in the order they were registered
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<(String, BreathPattern)>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        use MovementPattern::*;
        let mut library = Self::empty();
        for (name, inhale, exhale) in [
            ("vertical", VerticalUp, VerticalDown),
            ("horizontal", HorizontalOpen, HorizontalClose),
            ("circle", CircleInhale, CircleExhale),
        ] {
            library.register(name, BreathPattern { inhale, exhale });
        }
        library
    }
}

impl PatternLibrary {
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// The first registration of a name wins
    pub fn register(&mut self, name: &str, pattern: BreathPattern) -> bool {
        let name = name.trim().to_lowercase();
        if self.get(&name).is_some() {
            warn!("Breath pattern {name:?} is already registered, keeping the first");
            return false;
        }
        self.patterns.push((name, pattern));
        true
    }

    pub fn get(&self, name: &str) -> Option<BreathPattern> {
        let name = name.trim().to_lowercase();
        self.patterns
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, pattern)| *pattern)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(name, _)| name.as_str())
    }
}
