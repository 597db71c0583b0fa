/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

//! Closed-form paths for the guide beams
//!
//! Everything here is a pure function of the movement pattern, the ring,
//! the hand side and a normalized progress.

use crate::HandSide;
use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// The meditative movement a beam traces during one phase
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum MovementPattern {
    /// Hands rise (inhale)
    VerticalUp,
    /// Hands sink (exhale)
    VerticalDown,
    /// Hands spread apart (inhale)
    HorizontalOpen,
    /// Hands come together (exhale)
    HorizontalClose,
    /// Hands sweep out along the sides of the ring (inhale)
    CircleInhale,
    /// Hands sweep back (exhale)
    CircleExhale,
}

impl MovementPattern {
    pub fn is_horizontal(self) -> bool {
        matches!(
            self,
            MovementPattern::HorizontalOpen | MovementPattern::HorizontalClose
        )
    }
}

const LEFT_TOP: f32 = 135.0;
const LEFT_BOTTOM: f32 = 225.0;
const RIGHT_TOP: f32 = 45.0;
const RIGHT_BOTTOM: f32 = 315.0;

/// The circle that hand guidance points live on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingGeometry {
    pub center: Vec3,
    pub radius: f32,
    /// Unit vector pointing to the user's left-hand side of the ring
    pub right: Vec3,
    /// Where the chest expansion starts, as a fraction of the radius
    pub chest_inner_ratio: f32,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 1.0,
            right: Vec3::X,
            chest_inner_ratio: 0.1,
        }
    }
}

impl RingGeometry {
    pub fn new(center: Vec3, radius: f32, right: Vec3, chest_inner_ratio: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            right: right.normalize_or(Vec3::X),
            chest_inner_ratio: chest_inner_ratio.clamp(0.0, 1.0),
        }
    }

    /// Up axis of the ring plane, perpendicular to the right axis
    pub fn up(&self) -> Vec3 {
        let right = self.right.normalize_or(Vec3::X);
        (Vec3::Y - right * Vec3::Y.dot(right)).normalize_or(Vec3::Z)
    }
}

/// Position along a quadratic bezier curve at `t`
pub fn quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// Point on the ring at an angle in degrees, zero along the right axis
pub fn point_on_ring(ring: &RingGeometry, angle_deg: f32) -> Vec3 {
    let radians = angle_deg.to_radians();
    let right = ring.right.normalize_or(Vec3::X);
    ring.center + ring.radius * (radians.cos() * right + radians.sin() * ring.up())
}

/// Shortest signed difference between two angles in degrees, in (-180, 180]
pub fn delta_angle(from_deg: f32, to_deg: f32) -> f32 {
    let delta = (to_deg - from_deg).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Hermite ease with zero slope at both ends
pub fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Where the leading control point of a beam should be at progress `t`
pub fn path_point(pattern: MovementPattern, ring: &RingGeometry, side: HandSide, t: f32) -> Vec3 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let left = side.is_left();
    match pattern {
        MovementPattern::VerticalUp | MovementPattern::VerticalDown => {
            let down = pattern == MovementPattern::VerticalDown;
            let start = if down { 90.0 } else { 270.0 };
            // the two hands sweep mirrored half circles
            let delta = match (left, down) {
                (true, false) | (false, true) => 180.0,
                (true, true) | (false, false) => -180.0,
            };
            point_on_ring(ring, start + delta * t)
        }
        MovementPattern::HorizontalOpen | MovementPattern::HorizontalClose => {
            let right = ring.right.normalize_or(Vec3::X);
            let outward = if left { right } else { -right };
            let outer = ring.center + outward * ring.radius;
            let inner = ring
                .center
                .lerp(outer, ring.chest_inner_ratio.clamp(0.0, 1.0));
            let (from, to) = if pattern == MovementPattern::HorizontalOpen {
                (inner, outer)
            } else {
                (outer, inner)
            };
            from.lerp(to, t)
        }
        MovementPattern::CircleInhale | MovementPattern::CircleExhale => {
            let inhale = pattern == MovementPattern::CircleInhale;
            // the left hand traces the right-hand arc of the ring, and vice versa
            let on_left_arc = !left;
            let (start, end) = match (inhale, on_left_arc) {
                (true, true) => (LEFT_TOP, LEFT_BOTTOM),
                (true, false) => (RIGHT_BOTTOM, RIGHT_TOP),
                (false, true) => (LEFT_BOTTOM, LEFT_TOP),
                (false, false) => (RIGHT_TOP, RIGHT_BOTTOM),
            };
            point_on_ring(ring, start + delta_angle(start, end) * t)
        }
    }
}

/// Like [`path_point`], for a pattern known only by name. Unknown names stay at the center.
pub fn path_point_named(name: &str, ring: &RingGeometry, side: HandSide, t: f32) -> Vec3 {
    match MovementPattern::from_str(name) {
        Ok(pattern) => path_point(pattern, ring, side, t),
        Err(_) => {
            warn!("Unknown movement pattern {name:?}, staying at the ring center");
            ring.center
        }
    }
}
