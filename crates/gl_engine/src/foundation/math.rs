//! Math utilities and types
//!
//! Provides the small set of math types the renderer needs: vectors,
//! matrices and a position/rotation/scale transform.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform placed at `eye` and oriented towards `target`
    ///
    /// The resulting transform is the camera-to-world transform; its matrix
    /// inverse is the usual right-handed view matrix.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let eye_point = Point3::from(eye);
        let target_point = Point3::from(target);
        let view = nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, &up);
        let world = view.inverse();

        Self {
            position: world.translation.vector,
            rotation: world.rotation,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Rotate by Euler angles (radians) applied on top of the current rotation
    pub fn rotate_euler(&mut self, roll: f32, pitch: f32, yaw: f32) {
        let delta = Quat::from_euler_angles(roll, pitch, yaw);
        self.rotation = delta * self.rotation;
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create an OpenGL perspective projection matrix (clip depth in [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Inverse transpose used to transform normals, identity if singular
    fn normal_matrix(&self) -> Mat4;

    /// Column-major element array suitable for uniform upload
    fn to_column_array(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn normal_matrix(&self) -> Mat4 {
        self.try_inverse()
            .map_or_else(Mat4::identity, |inverse| inverse.transpose())
    }

    fn to_column_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.as_slice());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform_matrix() {
        let transform = Transform::identity();
        assert_relative_eq!(transform.to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_look_at_places_target_in_front() {
        let transform = Transform::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(transform.position, Vec3::new(0.0, 0.0, 5.0), epsilon = 1e-5);

        // Right-handed view space looks down -Z
        let view = transform.to_matrix().try_inverse().unwrap();
        let origin = view.transform_point(&Point3::origin());
        assert_relative_eq!(origin.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale() {
        let matrix = Mat4::new_scaling(2.0);
        let normal = matrix.normal_matrix();
        assert_relative_eq!(normal[(0, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(normal[(3, 3)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_column_array_layout() {
        let matrix = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let columns = matrix.to_column_array();
        assert_eq!(&columns[12..15], &[1.0, 2.0, 3.0]);
    }
}
