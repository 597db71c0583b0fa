use crate::devices::HandTracking;
use crate::path::quadratic_bezier;
use crate::units::{Seconds, IMMEDIATE};
use crate::HandSide;
use glam::Vec3;
use strum::IntoEnumIterator;

/// The rendered shape of a beam: a quadratic bezier from the leading point to the trailing one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamCurve {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl BeamCurve {
    /// Control point halfway between the two ends, optionally lifted
    pub fn between(start: Vec3, end: Vec3, lift: Vec3) -> Self {
        Self {
            start,
            control: (start + end) * 0.5 + lift,
            end,
        }
    }

    pub fn point(&self, t: f32) -> Vec3 {
        quadratic_bezier(self.start, self.control, self.end, t.clamp(0.0, 1.0))
    }

    /// `count` evenly spaced points including both ends
    pub fn samples(&self, count: usize) -> impl Iterator<Item = Vec3> + '_ {
        let count = count.max(2);
        (0..count).map(move |index| self.point(index as f32 / (count - 1) as f32))
    }
}

/// Decides, a few times per second, whether any hand is on the beam
#[derive(Debug, Clone)]
pub struct ProximityDetector {
    radius: f32,
    samples: usize,
    interval: Seconds,
    timer: Seconds,
}

/// What a detection pass found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub in_range: bool,
    pub hands_tracked: usize,
}

impl ProximityDetector {
    pub fn new(radius: f32, samples: usize, interval: Seconds) -> Self {
        Self {
            radius: radius.max(0.0),
            samples: samples.max(2),
            interval: interval.clamp_non_negative(),
            timer: IMMEDIATE,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Closest sampled point of the curve to a position
    pub fn min_distance(&self, curve: &BeamCurve, position: Vec3) -> f32 {
        curve
            .samples(self.samples)
            .map(|point| point.distance(position))
            .fold(f32::MAX, f32::min)
    }

    pub fn is_near(&self, curve: &BeamCurve, position: Vec3) -> bool {
        self.min_distance(curve, position) <= self.radius
    }

    /// Only answers once per interval, otherwise `None`
    pub fn poll(
        &mut self,
        dt: Seconds,
        curve: &BeamCurve,
        hands: &dyn HandTracking,
    ) -> Option<Detection> {
        self.timer += dt;
        if self.timer < self.interval {
            return None;
        }
        self.timer = IMMEDIATE;
        let positions: Vec<Vec3> = HandSide::iter()
            .filter_map(|side| hands.try_hand_position(side))
            .collect();
        Some(Detection {
            in_range: positions.iter().any(|&hand| self.is_near(curve, hand)),
            hands_tracked: positions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::HandTracker;

    fn straight_curve() -> BeamCurve {
        BeamCurve::between(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO)
    }

    #[test]
    fn test_samples_include_both_ends() {
        let curve = straight_curve();
        let points: Vec<Vec3> = curve.samples(10).collect();
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], curve.start);
        assert_eq!(points[9], curve.end);
        assert_eq!(curve.samples(0).count(), 2);
    }

    #[test]
    fn test_radius_boundary() {
        let detector = ProximityDetector::new(0.15, 10, Seconds(0.05));
        let curve = straight_curve();
        assert!(detector.is_near(&curve, Vec3::new(0.0, 0.14, 0.0)));
        assert!(!detector.is_near(&curve, Vec3::new(0.0, 0.16, 0.0)));
        // exactly on the radius still counts
        assert!(detector.is_near(&curve, Vec3::new(0.0, 0.15, 0.0)));
        assert!(!detector.is_near(&curve, Vec3::new(0.0, 0.1501, 0.0)));
        assert!(detector.is_near(&curve, Vec3::new(1.0, 0.0, 0.1)));
        assert!((detector.min_distance(&curve, Vec3::new(0.0, 0.5, 0.0)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_poll_is_decimated() {
        let mut detector = ProximityDetector::new(0.15, 10, Seconds(0.05));
        let mut hands = HandTracker::new();
        hands.update(HandSide::Right, Some(Vec3::new(0.5, 0.05, 0.0)));
        let curve = straight_curve();
        let mut decisions = Vec::new();
        for _ in 0..20 {
            if let Some(detection) = detector.poll(Seconds(0.01), &curve, &hands) {
                decisions.push(detection);
            }
        }
        // 0.2 seconds at one decision per 0.05 seconds, give or take rounding
        assert!((3..=4).contains(&decisions.len()), "{decisions:?}");
        assert!(decisions.iter().all(|detection| detection.in_range));
        assert!(decisions.iter().all(|detection| detection.hands_tracked == 1));
    }

    #[test]
    fn test_no_hands_never_in_range() {
        let mut detector = ProximityDetector::new(10.0, 10, Seconds(0.0));
        let hands = HandTracker::new();
        let detection = detector.poll(Seconds(0.01), &straight_curve(), &hands);
        assert_eq!(
            detection,
            Some(Detection {
                in_range: false,
                hands_tracked: 0
            })
        );
    }
}
