/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

//! Units for the breath rhythm
//!
//! Type-safe wrappers for the few physical quantities the engine deals in,
//! so that travel time really is distance over speed.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Deref, Div, Mul, Sub};

/// Time in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(pub f32);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Meters(pub f32);

/// Speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct MetersPerSecond(pub f32);

pub const IMMEDIATE: Seconds = Seconds(0.0);

/// Shortest phase the rhythm will ever run
pub const MIN_PHASE: Seconds = Seconds(0.01);

/// Shortest phase a beam segment is ever given
pub const MIN_BEAM_PHASE: Seconds = Seconds(0.1);

/// Below this a beam is considered not to move at all
pub const STANDSTILL: MetersPerSecond = MetersPerSecond(0.001);

impl Deref for Seconds {
    type Target = f32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Meters {
    type Target = f32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for MetersPerSecond {
    type Target = f32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Seconds {
    /// Never below the given minimum, and never NaN
    pub fn at_least(self, minimum: Seconds) -> Seconds {
        if self.0.is_nan() {
            minimum
        } else {
            Seconds(self.0.max(minimum.0))
        }
    }

    pub fn clamp_non_negative(self) -> Seconds {
        self.at_least(IMMEDIATE)
    }
}

impl Add for Seconds {
    type Output = Seconds;

    fn add(self, other: Seconds) -> Seconds {
        Seconds(self.0 + other.0)
    }
}

impl AddAssign for Seconds {
    fn add_assign(&mut self, other: Seconds) {
        self.0 += other.0;
    }
}

impl Sub for Seconds {
    type Output = Seconds;

    fn sub(self, other: Seconds) -> Seconds {
        Seconds(self.0 - other.0)
    }
}

impl Div for Seconds {
    type Output = f32;

    fn div(self, other: Seconds) -> f32 {
        self.0 / other.0
    }
}

// Travel time: distance over speed
impl Div<MetersPerSecond> for Meters {
    type Output = Seconds;

    fn div(self, speed: MetersPerSecond) -> Seconds {
        Seconds(self.0 / speed.0)
    }
}

// Distance covered: speed times time
impl Mul<Seconds> for MetersPerSecond {
    type Output = Meters;

    fn mul(self, time: Seconds) -> Meters {
        Meters(self.0 * time.0)
    }
}

impl std::fmt::Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

impl std::fmt::Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}m", self.0)
    }
}

impl std::fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}m/s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_time() {
        let time = Meters(3.0) / MetersPerSecond(2.0);
        assert_eq!(time, Seconds(1.5));
        let covered = MetersPerSecond(2.0) * time;
        assert!((*covered - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_at_least() {
        assert_eq!(Seconds(0.0).at_least(MIN_PHASE), MIN_PHASE);
        assert_eq!(Seconds(-4.0).clamp_non_negative(), IMMEDIATE);
        assert_eq!(Seconds(f32::NAN).at_least(MIN_BEAM_PHASE), MIN_BEAM_PHASE);
        assert_eq!(Seconds(4.0).at_least(MIN_PHASE), Seconds(4.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Seconds(4.0)), "4.00s");
        assert_eq!(format!("{}", Meters(1.5)), "1.500m");
    }
}
