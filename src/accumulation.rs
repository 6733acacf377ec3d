//! Progressive-sampling state: decides when accumulated samples reset.

use glam::Mat4;

/// Tracks the running sample count and the camera pose it is valid for.
///
/// The comparison against the previous frame's model matrix is exact: any
/// component that changes, by however little, invalidates the accumulated
/// image and restarts at sample 1. The trace kernel treats sample 1 as
/// "overwrite" rather than "blend", so nothing ever clears the image
/// explicitly.
pub struct Accumulator {
    sample_count: u32,
    prev_model: Mat4,
}

impl Accumulator {
    /// Starts at sample 1 with the given pose as the baseline snapshot.
    pub fn new(model: Mat4) -> Self {
        Self {
            sample_count: 1,
            prev_model: model,
        }
    }

    /// Compares the current pose against the snapshot and returns the sample
    /// number to render this frame. A differing pose resets the count to 1
    /// and replaces the snapshot.
    pub fn begin_frame(&mut self, model: Mat4) -> u32 {
        if model != self.prev_model {
            self.sample_count = 1;
            self.prev_model = model;
        }
        self.sample_count
    }

    /// Advances to the next sample; called after the frame's draw completes.
    pub fn end_frame(&mut self) {
        self.sample_count += 1;
    }

    /// Forces a restart at sample 1, e.g. after the accumulation image is
    /// reallocated on resize.
    pub fn reset(&mut self) {
        self.sample_count = 1;
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn stationary_frames_count_up() {
        let pose = Mat4::IDENTITY;
        let mut acc = Accumulator::new(pose);

        for expected in 1..=3 {
            assert_eq!(acc.begin_frame(pose), expected);
            acc.end_frame();
        }
    }

    #[test]
    fn pose_change_resets_to_one() {
        let pose = Mat4::IDENTITY;
        let mut acc = Accumulator::new(pose);

        for _ in 0..3 {
            acc.begin_frame(pose);
            acc.end_frame();
        }

        let moved = Mat4::from_translation(Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(acc.begin_frame(moved), 1);
        acc.end_frame();

        // Holding the new pose resumes counting.
        assert_eq!(acc.begin_frame(moved), 2);
    }

    #[test]
    fn one_ulp_difference_is_a_reset() {
        let pose = Mat4::IDENTITY;
        let mut acc = Accumulator::new(pose);
        acc.begin_frame(pose);
        acc.end_frame();

        let mut cols = pose.to_cols_array();
        cols[12] = f32::from_bits(cols[12].to_bits() + 1);
        let nudged = Mat4::from_cols_array(&cols);

        assert_eq!(acc.begin_frame(nudged), 1);
    }

    #[test]
    fn reset_restarts_regardless_of_pose() {
        let pose = Mat4::IDENTITY;
        let mut acc = Accumulator::new(pose);
        acc.begin_frame(pose);
        acc.end_frame();
        acc.begin_frame(pose);
        acc.end_frame();

        acc.reset();
        assert_eq!(acc.begin_frame(pose), 1);
    }
}
