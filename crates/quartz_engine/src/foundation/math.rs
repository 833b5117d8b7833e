//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics and game development.
//! The renderer uses a right-handed view space (camera looks down -z) and
//! projections that map depth to [0, 1].

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing translation, Euler rotation, and scale
///
/// Rotation is stored as Euler angles in radians: `rotation.x` pitches
/// about x, `rotation.y` yaws about y, `rotation.z` rolls about z. The
/// world matrix applies scale first, then roll, pitch, yaw, then
/// translation. It is composed on demand and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation in world space
    pub translation: Vec3,

    /// Euler rotation angles in radians
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a transform from translation, Euler rotation, and scale
    #[must_use]
    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose the world matrix: translation * yaw * pitch * roll * scale
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        let rotation = Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_z(self.rotation.z);

        Mat4::new_translation(&self.translation)
            * rotation
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Compose the world matrix with a model axis correction
    ///
    /// The correction sits between scale and the instance rotation, for
    /// models authored with a different up axis.
    #[must_use]
    pub fn to_matrix_with_axis(&self, axis_correction: &Mat4) -> Mat4 {
        let rotation = Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_z(self.rotation.z);

        Mat4::new_translation(&self.translation)
            * rotation
            * axis_correction
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    #[must_use]
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a right-handed perspective projection with depth in [0, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed off-center orthographic projection with depth in [0, 1]
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Inverse transpose with translation removed, for normal transforms
    fn inverse_transpose(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let focal = 1.0 / (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = focal / aspect;
        result[(1, 1)] = focal;
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = (near * far) / (near - far);
        result[(3, 2)] = -1.0;
        result
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / (right - left);
        result[(0, 3)] = -(right + left) / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(1, 3)] = -(top + bottom) / (top - bottom);
        result[(2, 2)] = -1.0 / (far - near);
        result[(2, 3)] = -near / (far - near);
        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new_translation(&-eye);

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn inverse_transpose(&self) -> Mat4 {
        // Translation does not affect normals, so it is removed before the
        // inverse to keep the result well conditioned for affine worlds.
        let mut linear = *self;
        linear[(0, 3)] = 0.0;
        linear[(1, 3)] = 0.0;
        linear[(2, 3)] = 0.0;

        linear
            .try_inverse()
            .map_or_else(Mat4::identity, |inverse| inverse.transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_identity_matrix() {
        let transform = Transform::identity();
        assert_relative_eq!(transform.to_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_composition_order() {
        // Scale must apply before rotation: a unit x offset scaled by 2 and
        // yawed a quarter turn lands on -z at distance 2.
        let transform = Transform::new(
            Vec3::zeros(),
            Vec3::new(0.0, constants::HALF_PI, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
        );
        let point = transform.transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(point.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(point.y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(point.z, -2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_transform_translation_applies_last() {
        let transform = Transform::new(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, constants::HALF_PI, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let point = transform.transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(point.x, 5.0, epsilon = EPSILON);
        assert_relative_eq!(point.z, -1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_axis_correction_applies_before_instance_rotation() {
        // A model authored z-up corrected by a -90 degree pitch: its +z
        // vertex must end up on +y before the instance yaw runs.
        let correction = Mat4::rotation_x(-constants::HALF_PI);
        let transform = Transform::new(
            Vec3::zeros(),
            Vec3::new(0.0, constants::HALF_PI, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        let world = transform.to_matrix_with_axis(&correction);
        let point = world.transform_point(&Point3::new(0.0, 0.0, 1.0));

        assert_relative_eq!(point.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(point.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(point.z, 0.0, epsilon = EPSILON);

        let identity = transform.to_matrix_with_axis(&Mat4::identity());
        assert_relative_eq!(identity, transform.to_matrix(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_centers_target_on_view_axis() {
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let target = view.transform_point(&Point3::new(0.0, 0.0, 0.0));

        // Target sits straight ahead, 10 units down -z in view space
        assert_relative_eq!(target.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(target.y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(target.z, -10.0, epsilon = EPSILON);
    }

    #[test]
    fn test_orthographic_depth_range() {
        let projection = Mat4::orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 3.0);

        let near = projection.transform_point(&Point3::new(0.0, 0.0, -1.0));
        let far = projection.transform_point(&Point3::new(0.0, 0.0, -3.0));

        assert_relative_eq!(near.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(far.z, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_perspective_depth_range() {
        let projection = Mat4::perspective(0.5, 1.0, 0.1, 100.0);

        let near = projection.transform_point(&Point3::new(0.0, 0.0, -0.1));
        let far = projection.transform_point(&Point3::new(0.0, 0.0, -100.0));

        assert_relative_eq!(near.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_inverse_transpose_ignores_translation() {
        let world = Transform::new(
            Vec3::new(7.0, -3.0, 2.0),
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
        )
        .to_matrix();

        assert_relative_eq!(world.inverse_transpose(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_transpose_corrects_nonuniform_scale() {
        // A normal on a plane scaled 2x along x must stay perpendicular
        // after transforming with the inverse transpose.
        let world = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
        let wit = world.inverse_transpose();

        let normal = wit.transform_vector(&Vec3::new(1.0, 1.0, 0.0).normalize());
        let surface = world.transform_vector(&Vec3::new(-1.0, 1.0, 0.0));

        assert_relative_eq!(normal.dot(&surface), 0.0, epsilon = EPSILON);
    }
}
