//! Surface-anchored scene graph driven by a scalar control and a reset signal.
//!
//! A [`ReactiveController`] owns the [`Scene`], the [`AnchorManager`] and the
//! staircase [`ProceduralTreeBuilder`]. It is fed detected surfaces from a
//! [`SessionAdapter`] and input from a [`ControlState`] subscription, and hands
//! a draw list to whatever renders the frame.

pub mod anchor;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod scene_graph;
pub mod session;
pub mod staircase;

pub use anchor::{Anchor, AnchorManager, AnchorState};
pub use config::StageConfig;
pub use control::{ControlState, ControlSubscription, UiSignal};
pub use controller::{ReactiveController, StageLayout};
pub use error::{SceneError, SceneResult};
pub use scene_graph::{DrawItem, EntityBlueprint, EntityId, Scene, SceneEntity, Transform};
pub use session::{SessionAdapter, SurfaceFact, TrackingBackend};
pub use staircase::{chain_length, ProceduralTreeBuilder};
