//! The axis-aligned box the compute kernel evaluates.

use glam::Vec3;

/// An axis-aligned bounding volume described by two opposite corners.
///
/// The corners are stored exactly as given; callers are responsible for
/// supplying a box whose `corner_min` is per-axis below `corner_max`. The
/// trace kernel orders the slabs itself, so an inverted box still renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volume {
    pub corner_min: Vec3,
    pub corner_max: Vec3,
}

impl Volume {
    pub fn new(corner_min: Vec3, corner_max: Vec3) -> Self {
        Self {
            corner_min,
            corner_max,
        }
    }

    /// Midpoint of the two corners.
    pub fn center(&self) -> Vec3 {
        (self.corner_min + self.corner_max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_corner_midpoint() {
        let v = Volume::new(Vec3::new(-10.0, -2.0, -10.0), Vec3::new(10.0, 6.0, 10.0));
        assert_eq!(v.center(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn corners_are_stored_as_given() {
        // The permissive contract: an inverted box is not rejected.
        let v = Volume::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(v.corner_min, Vec3::ONE);
        assert_eq!(v.corner_max, Vec3::ZERO);
    }
}
