//! Scene management
//!
//! A scene is a flat, ordered list of objects. There is no hierarchy.

pub mod object;

pub use object::{ObjectId, ObjectKind, SceneObject};

use crate::render::Camera;

/// Flat list of scene objects
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, returning the identity assigned to it
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        object.set_id(id);
        log::debug!("Scene: added '{}' as {:?}", object.tag(), id);
        self.objects.push(object);
        id
    }

    /// Remove an object, keeping the order of the rest
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.id() == id)?;
        Some(self.objects.remove(index))
    }

    /// Look up an object
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    /// Look up an object mutably
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Mutable objects in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    /// First object with the given tag
    pub fn find_by_tag(&self, tag: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.tag() == tag)
    }

    /// First enabled camera
    pub fn camera(&self) -> Option<&Camera> {
        self.objects
            .iter()
            .filter(|object| object.is_enabled())
            .find_map(|object| match object.kind() {
                ObjectKind::Camera(camera) => Some(camera),
                ObjectKind::Model { .. } => None,
            })
    }

    /// Run one update over every enabled object
    pub fn tick(&mut self, dt: f32) {
        for object in self.objects.iter_mut().filter(|object| object.is_enabled()) {
            object.pre_tick();
        }
        for object in self.objects.iter_mut().filter(|object| object.is_enabled()) {
            object.tick(dt);
        }
        for object in self.objects.iter_mut().filter(|object| object.is_enabled()) {
            object.post_tick();
        }
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
