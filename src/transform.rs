//! Composable 3D pose shared by every posable object in the scene.
//!
//! [`Transform`] keeps translation, scale, and rotation as three independent
//! matrices rather than one fused model matrix. Local-space mutations need to
//! read back the current rotation and scale components on their own, so the
//! triple is never collapsed; the effective model matrix is recomposed on
//! every call.

use glam::{Mat3, Mat4, Vec3};

/// Selects the frame a mutation is expressed in.
///
/// `Local` interprets the given vector or axis in the object's current
/// rotated frame; `Global` interprets it in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    Local,
    Global,
}

/// Position, non-uniform scale, and orientation of a scene object.
///
/// Starts as the identity pose and is mutated only through
/// [`translate`](Transform::translate), [`scale`](Transform::scale), and
/// [`rotate`](Transform::rotate).
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    translation: Mat4,
    scale: Mat4,
    rotation: Mat4,
    position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Mat4::IDENTITY,
            scale: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Creates an identity pose at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the object by `translation`.
    ///
    /// A `Local` translation is first rotated into world space by the current
    /// orientation, so translating along local −Z always moves "forward"
    /// regardless of how the object is turned.
    pub fn translate(&mut self, mut translation: Vec3, space: Space) {
        if space == Space::Local {
            translation = Mat3::from_mat4(self.rotation) * translation;
        }
        self.position += translation;
        self.translation *= Mat4::from_translation(translation);
    }

    /// Scales the object by `factor` per axis.
    ///
    /// A `Local` factor is transformed by the current scale matrix first.
    pub fn scale(&mut self, mut factor: Vec3, space: Space) {
        if space == Space::Local {
            factor = Mat3::from_mat4(self.scale) * factor;
        }
        self.scale *= Mat4::from_scale(factor);
    }

    /// Rotates the object by `angle_degrees` about `axis`.
    ///
    /// The stored composition always rotates about locally-expressed axes:
    /// a `Global` axis is mapped into the object's frame via the inverse of
    /// the current rotation (and normalized) before composing. Composing a
    /// locally-expressed axis on the right is equivalent to left-multiplying
    /// the world-axis rotation.
    pub fn rotate(&mut self, angle_degrees: f32, mut axis: Vec3, space: Space) {
        if space == Space::Global {
            axis = (self.rotation.inverse() * axis.extend(0.0))
                .truncate()
                .normalize();
        }
        self.rotation *= Mat4::from_axis_angle(axis, angle_degrees.to_radians());
    }

    /// World-space position, updated incrementally by each translation.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The effective model matrix, `translation * scale * rotation`.
    ///
    /// Recomposed on every call so callers always observe the latest
    /// mutation; nothing is cached.
    pub fn model_matrix(&self) -> Mat4 {
        self.translation * self.scale * self.rotation
    }

    /// Transpose of the inverse of the model matrix, for transforming
    /// normals under non-uniform scale.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_matrix().inverse().transpose())
    }

    /// The world-space X basis vector of the current orientation.
    pub fn x_axis(&self) -> Vec3 {
        self.rotated_axis(Vec3::X)
    }

    /// The world-space Y basis vector of the current orientation.
    pub fn y_axis(&self) -> Vec3 {
        self.rotated_axis(Vec3::Y)
    }

    /// The world-space Z basis vector of the current orientation.
    pub fn z_axis(&self) -> Vec3 {
        self.rotated_axis(Vec3::Z)
    }

    fn rotated_axis(&self, axis: Vec3) -> Vec3 {
        (self.rotation * axis.extend(0.0)).truncate().normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn mat4_close(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < EPS)
    }

    #[test]
    fn global_translations_sum_into_position() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 2.0, 3.0), Space::Global);
        t.rotate(37.0, Vec3::Y, Space::Global);
        t.scale(Vec3::new(2.0, 1.0, 0.5), Space::Global);
        t.translate(Vec3::new(-4.0, 0.5, 1.0), Space::Global);

        assert!((t.position() - Vec3::new(-3.0, 2.5, 4.0)).length() < EPS);
    }

    #[test]
    fn translate_round_trip_restores_model_matrix() {
        let mut t = Transform::new();
        t.rotate(20.0, Vec3::Y, Space::Global);
        let before = t.model_matrix();

        let v = Vec3::new(3.0, -1.0, 7.5);
        t.translate(v, Space::Local);
        t.translate(-v, Space::Local);

        assert!(mat4_close(t.model_matrix(), before));
    }

    #[test]
    fn local_axis_matches_coincident_global_axis() {
        // After yawing, the object's local X axis points along some world
        // vector; rotating about local X must equal rotating about that
        // world vector in global space.
        let mut a = Transform::new();
        a.rotate(30.0, Vec3::Y, Space::Global);
        let mut b = a;

        let world_x = a.x_axis();
        a.rotate(25.0, Vec3::X, Space::Local);
        b.rotate(25.0, world_x, Space::Global);

        assert!(mat4_close(a.model_matrix(), b.model_matrix()));
    }

    #[test]
    fn local_translation_follows_orientation() {
        let mut t = Transform::new();
        t.rotate(90.0, Vec3::Y, Space::Global);
        // Local -Z now points along world -X.
        t.translate(Vec3::new(0.0, 0.0, -1.0), Space::Local);

        assert!((t.position() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn model_matrix_composes_translation_scale_rotation() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 0.0, 0.0), Space::Global);
        t.scale(Vec3::splat(2.0), Space::Global);

        // Point at local origin lands at the translation.
        let p = t.model_matrix() * Vec3::ZERO.extend(1.0);
        assert!((p.truncate() - Vec3::new(1.0, 0.0, 0.0)).length() < EPS);

        // A unit offset is scaled then translated.
        let q = t.model_matrix() * Vec3::X.extend(1.0);
        assert!((q.truncate() - Vec3::new(3.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn axes_stay_unit_length_under_scale() {
        let mut t = Transform::new();
        t.scale(Vec3::new(5.0, 0.25, 3.0), Space::Global);
        t.rotate(45.0, Vec3::new(0.0, 1.0, 0.0), Space::Global);

        assert!((t.x_axis().length() - 1.0).abs() < EPS);
        assert!((t.y_axis().length() - 1.0).abs() < EPS);
        assert!((t.z_axis().length() - 1.0).abs() < EPS);
    }
}
