use std::collections::HashMap;

use id_arena::{Arena, Id};
use serde::{Deserialize, Serialize};

/// Primitive shape of an entity. Dimensions are passed through to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Sphere { radius: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

pub struct Geometry {
    pub name: String,
    pub shape: Shape,
}

pub struct Material {
    /// Image reference, resolved by the asset loader outside this crate.
    pub texture: String,
}

pub type GeometryId = Id<Geometry>;
pub type MaterialId = Id<Material>;

/// Shared descriptors referenced (never owned) by scene entities.
pub struct AssetLibrary {
    geometries: Arena<Geometry>,
    materials: Arena<Material>,
    materials_by_texture: HashMap<String, MaterialId>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self {
            geometries: Arena::new(),
            materials: Arena::new(),
            materials_by_texture: HashMap::new(),
        }
    }

    pub fn add_geometry(&mut self, name: impl Into<String>, shape: Shape) -> GeometryId {
        self.geometries.alloc(Geometry {
            name: name.into(),
            shape,
        })
    }

    /// Returns the material for `texture`, registering it on first use.
    pub fn material_for_texture(&mut self, texture: &str) -> MaterialId {
        if let Some(id) = self.materials_by_texture.get(texture) {
            return *id;
        }

        let id = self.materials.alloc(Material {
            texture: texture.to_string(),
        });
        self.materials_by_texture.insert(texture.to_string(), id);
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materials_are_shared_per_texture() {
        let mut assets = AssetLibrary::new();

        let a = assets.material_for_texture("checker.png");
        let b = assets.material_for_texture("checker.png");
        let c = assets.material_for_texture("wood.png");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(assets.material_count(), 2);
        assert_eq!(assets.material(c).map(|m| m.texture.as_str()), Some("wood.png"));
    }

    #[test]
    fn geometry_keeps_dimensions() {
        let mut assets = AssetLibrary::new();
        let id = assets.add_geometry(
            "box",
            Shape::Box {
                width: 0.2,
                height: 0.3,
                depth: 0.4,
            },
        );

        let geometry = assets.geometry(id).unwrap();
        assert_eq!(geometry.name, "box");
        assert_eq!(
            geometry.shape,
            Shape::Box {
                width: 0.2,
                height: 0.3,
                depth: 0.4
            }
        );
    }
}
