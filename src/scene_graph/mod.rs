pub mod assets;
pub mod entity;
pub mod scene;
pub mod transform;

// Re-export main types for convenience
pub use assets::{AssetLibrary, GeometryId, MaterialId, Shape};
pub use entity::{EntityBlueprint, EntityId, Owner, SceneEntity};
pub use scene::{DrawItem, Scene};
pub use transform::Transform;
