use crate::error::{SceneError, SceneResult};
use crate::scene_graph::{DrawItem, EntityId, Scene, Transform};

/// Reference frame fixed to a detected surface, owning a set of root entities.
#[derive(Debug)]
pub struct Anchor {
    transform: Transform,
    roots: Vec<EntityId>,
    generation: u64,
}

impl Anchor {
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Increments on every reset; tells successive anchors apart.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    Unanchored,
    Anchored,
}

/// Holds at most one live anchor.
#[derive(Debug, Default)]
pub struct AnchorManager {
    current: Option<Anchor>,
    generation: u64,
}

impl AnchorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnchorState {
        match self.current {
            Some(_) => AnchorState::Anchored,
            None => AnchorState::Unanchored,
        }
    }

    pub fn current_anchor(&self) -> Option<&Anchor> {
        self.current.as_ref()
    }

    /// Replaces the live anchor with a fresh one at `surface`, destroying the
    /// previous anchor's entities. Without a surface nothing is touched.
    pub fn reset(&mut self, scene: &mut Scene, surface: Option<Transform>) -> SceneResult<&Anchor> {
        let Some(surface) = surface else {
            log::warn!("Anchor reset requested before any horizontal surface was detected");
            return Err(SceneError::NoSurfaceAvailable);
        };

        self.teardown(scene);

        self.generation += 1;
        log::info!(
            "Anchor #{} created at {:?}",
            self.generation,
            surface.translation()
        );

        Ok(self.current.insert(Anchor {
            transform: surface,
            roots: Vec::new(),
            generation: self.generation,
        }))
    }

    pub fn attach_root(&mut self, scene: &mut Scene, entity: EntityId) -> SceneResult<()> {
        let anchor = self.current.as_mut().ok_or(SceneError::NotAnchored)?;

        scene.claim_anchor_root(entity)?;
        anchor.roots.push(entity);

        Ok(())
    }

    /// Destroys the live anchor and every entity it owns. Returns whether one existed.
    pub fn teardown(&mut self, scene: &mut Scene) -> bool {
        let Some(anchor) = self.current.take() else {
            return false;
        };

        let mut destroyed = 0;
        for &root in &anchor.roots {
            match scene.destroy_anchor_root(root) {
                Ok(count) => destroyed += count,
                Err(err) => log::warn!("Anchor #{} root {:?} not destroyed: {}", anchor.generation, root, err),
            }
        }

        log::info!(
            "Anchor #{} destroyed along with {} entities",
            anchor.generation,
            destroyed
        );

        true
    }

    /// Transform of `entity` in session space, through the live anchor.
    pub fn world_transform(&self, scene: &Scene, entity: EntityId) -> SceneResult<Transform> {
        let anchor = self.current.as_ref().ok_or(SceneError::NotAnchored)?;
        let local = scene.world_transform(entity)?;

        Ok(anchor.transform.compose(&local))
    }

    /// Everything under the live anchor, ready to draw. Empty when unanchored.
    pub fn draw_list(&self, scene: &Scene) -> Vec<DrawItem> {
        match &self.current {
            Some(anchor) => scene.draw_list(&anchor.roots, &anchor.transform),
            None => Vec::new(),
        }
    }
}
