//! Scene objects
//!
//! Objects are a closed set of kinds: cameras and model-bearing objects.

use crate::foundation::math::{Transform, Vec3};
use crate::render::{Camera, ModelHandle};

/// Identity assigned to an object when it is added to a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

/// What an object is
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// A viewpoint; its transform is the camera placement
    Camera(Camera),
    /// A model owned by the resource manager, placed by `transform`
    Model {
        /// Model to draw
        model: ModelHandle,
        /// Model-to-world placement
        transform: Transform,
    },
}

/// An entry in a [`Scene`](super::Scene)
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ObjectId,
    tag: String,
    enabled: bool,
    kind: ObjectKind,
    spin: Vec3,
    previous_transform: Option<Transform>,
}

impl SceneObject {
    /// Create an enabled object
    pub fn new(tag: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::default(),
            tag: tag.into(),
            enabled: true,
            kind,
            spin: Vec3::zeros(),
            previous_transform: None,
        }
    }

    /// Object holding a camera
    pub fn camera(tag: impl Into<String>, camera: Camera) -> Self {
        Self::new(tag, ObjectKind::Camera(camera))
    }

    /// Object placing a model at the origin
    pub fn model(tag: impl Into<String>, model: ModelHandle) -> Self {
        Self::new(
            tag,
            ObjectKind::Model {
                model,
                transform: Transform::identity(),
            },
        )
    }

    /// Set the spin in radians per second around each axis
    #[must_use]
    pub fn with_spin(mut self, spin: Vec3) -> Self {
        self.spin = spin;
        self
    }

    /// Identity within the owning scene
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// Free-form label
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the object takes part in ticking and rendering
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the object
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Object kind
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Mutable object kind
    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Model handle, for model objects
    pub fn model_handle(&self) -> Option<ModelHandle> {
        match &self.kind {
            ObjectKind::Model { model, .. } => Some(*model),
            ObjectKind::Camera(_) => None,
        }
    }

    /// Placement in world space
    pub fn transform(&self) -> &Transform {
        match &self.kind {
            ObjectKind::Camera(camera) => &camera.transform,
            ObjectKind::Model { transform, .. } => transform,
        }
    }

    /// Mutable placement in world space
    pub fn transform_mut(&mut self) -> &mut Transform {
        match &mut self.kind {
            ObjectKind::Camera(camera) => &mut camera.transform,
            ObjectKind::Model { transform, .. } => transform,
        }
    }

    /// Spin in radians per second
    pub fn spin(&self) -> Vec3 {
        self.spin
    }

    /// Transform as it was before the current tick
    pub fn previous_transform(&self) -> Option<&Transform> {
        self.previous_transform.as_ref()
    }

    /// Snapshot the transform before the frame's update
    pub fn pre_tick(&mut self) {
        self.previous_transform = Some(self.transform().clone());
    }

    /// Advance the object by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let spin = self.spin * dt;
        if spin != Vec3::zeros() {
            self.transform_mut().rotate_euler(spin.x, spin.y, spin.z);
        }
    }

    /// Settle the transform after the frame's update
    pub fn post_tick(&mut self) {
        let transform = self.transform_mut();
        transform.rotation.renormalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn handle() -> ModelHandle {
        let mut models: SlotMap<ModelHandle, ()> = SlotMap::with_key();
        models.insert(())
    }

    #[test]
    fn test_spin_rotates_model_objects() {
        let mut object = SceneObject::model("box", handle()).with_spin(Vec3::new(0.0, 1.0, 0.0));

        object.pre_tick();
        object.tick(0.5);
        object.post_tick();

        let expected = Quat::from_euler_angles(0.0, 0.5, 0.0);
        assert_relative_eq!(object.transform().rotation, expected, epsilon = 1e-6);
        assert_eq!(object.previous_transform(), Some(&Transform::identity()));
    }

    #[test]
    fn test_camera_object_exposes_camera_transform() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        let object = SceneObject::camera("main", camera);

        assert_relative_eq!(object.transform().position, Vec3::new(0.0, 0.0, 5.0), epsilon = 1e-5);
        assert_eq!(object.model_handle(), None);
    }
}
