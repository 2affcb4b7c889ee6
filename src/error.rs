use crate::scene_graph::EntityId;

/// Failures of scene-graph, anchor and rebuild operations.
///
/// All of these are returned to the immediate caller; none are retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// `reset` was requested before the tracking session reported a horizontal surface.
    #[error("no horizontal surface has been detected yet")]
    NoSurfaceAvailable,

    /// An attach or position operation ran while no anchor is live.
    #[error("no anchor is live")]
    NotAnchored,

    /// The entity already has a parent entity or is an anchor root.
    #[error("entity {name:?} already has an owner")]
    AlreadyOwned { entity: EntityId, name: String },

    /// The id refers to an entity that has been destroyed.
    #[error("entity {0:?} no longer exists")]
    StaleEntity(EntityId),

    /// The child is the parent itself or one of its ancestors.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: EntityId, child: EntityId },
}

pub type SceneResult<T> = Result<T, SceneError>;
