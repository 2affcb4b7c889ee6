use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::scene_graph::assets::{GeometryId, MaterialId, Shape};
use crate::scene_graph::transform::Transform;

new_key_type! {
    pub struct EntityId;
}

/// Who holds exclusive ownership of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Entity(EntityId),
    Anchor,
}

pub struct SceneEntity {
    pub name: String,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    pub(crate) transform: Transform,
    pub(crate) owner: Option<Owner>,
    pub(crate) child_ids: Vec<EntityId>,
}

impl SceneEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visuals(mut self, geometry: GeometryId, material: MaterialId) -> Self {
        self.geometry = Some(geometry);
        self.material = Some(material);
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    pub fn parent_id(&self) -> Option<EntityId> {
        match self.owner {
            Some(Owner::Entity(parent)) => Some(parent),
            _ => None,
        }
    }

    pub fn child_ids(&self) -> &[EntityId] {
        &self.child_ids
    }

    /// Unowned, childless copy sharing the same geometry, material and local transform.
    pub fn shallow_copy(&self) -> SceneEntity {
        SceneEntity {
            name: self.name.clone(),
            geometry: self.geometry,
            material: self.material,
            transform: self.transform,
            owner: None,
            child_ids: Vec::new(),
        }
    }
}

impl Default for SceneEntity {
    fn default() -> Self {
        Self {
            name: String::new(),
            geometry: None,
            material: None,
            transform: Transform::IDENTITY,
            owner: None,
            child_ids: Vec::new(),
        }
    }
}

/// Construction-time description of an entity placed under the anchor on every reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityBlueprint {
    pub name: String,
    pub shape: Shape,
    pub texture: String,
    /// Design-time offset relative to the anchor.
    pub offset: Vec3,
}

impl EntityBlueprint {
    pub fn sphere(name: impl Into<String>, radius: f32, texture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Sphere { radius },
            texture: texture.into(),
            offset: Vec3::ZERO,
        }
    }

    pub fn cuboid(
        name: impl Into<String>,
        width: f32,
        height: f32,
        depth: f32,
        texture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Box {
                width,
                height,
                depth,
            },
            texture: texture.into(),
            offset: Vec3::ZERO,
        }
    }

    pub fn at(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }
}
