//! # 3D Camera
//!
//! Perspective camera positioned by a [`Transform`]. The transform is the
//! camera-to-world placement; the view matrix is its inverse.

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Transform, Vec3};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Placement in world space
    pub transform: Transform,
    field_of_view: f32,
    near_plane: f32,
    far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(45.0, 0.01, 100.0)
    }
}

impl Camera {
    /// Create a camera at the origin
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn new(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            transform: Transform::identity(),
            field_of_view: fov_degrees,
            near_plane: near,
            far_plane: far,
        }
    }

    /// Build a camera from its configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.fov_degrees, config.near, config.far);
        camera.look_at(
            Vec3::from(config.eye),
            Vec3::from(config.target),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera
    }

    /// Place the camera at `eye` looking towards `target`
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.transform = Transform::look_at(eye, target, up);
    }

    /// Vertical field of view in degrees
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Set the vertical field of view in degrees
    pub fn set_field_of_view(&mut self, fov_degrees: f32) {
        self.field_of_view = fov_degrees;
    }

    /// Near clipping distance
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    /// Set the near clipping distance
    pub fn set_near_plane(&mut self, distance: f32) {
        self.near_plane = distance;
    }

    /// Far clipping distance
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Set the far clipping distance
    pub fn set_far_plane(&mut self, distance: f32) {
        self.far_plane = distance;
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.transform
            .to_matrix()
            .try_inverse()
            .unwrap_or_else(Mat4::identity)
    }

    /// Perspective projection for a target of the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(
            utils::deg_to_rad(self.field_of_view),
            aspect,
            self.near_plane,
            self.far_plane,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_camera_sees_origin() {
        let camera = Camera::from_config(&CameraConfig::default());
        let origin = camera.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(origin.z, -5.0, epsilon = 1e-5);
        assert_eq!(camera.field_of_view(), 45.0);
    }

    #[test]
    fn test_projection_maps_near_plane_to_minus_one() {
        let camera = Camera::new(45.0, 0.5, 100.0);
        let projection = camera.projection_matrix(1.0);
        let clip = projection * nalgebra::Vector4::new(0.0, 0.0, -0.5, 1.0);
        assert_relative_eq!(clip.z / clip.w, -1.0, epsilon = 1e-4);
    }
}
