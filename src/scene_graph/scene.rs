use slotmap::SlotMap;

use crate::error::{SceneError, SceneResult};
use crate::scene_graph::assets::{AssetLibrary, GeometryId, MaterialId};
use crate::scene_graph::entity::{EntityBlueprint, EntityId, Owner, SceneEntity};
use crate::scene_graph::transform::Transform;

/// One node as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub entity: EntityId,
    pub name: String,
    pub world: Transform,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
}

/// Entity store. Every entity is either unowned, the child of exactly one
/// entity, or a root held by the anchor; the parent links never form a cycle.
pub struct Scene {
    entities: SlotMap<EntityId, SceneEntity>,
    pub assets: AssetLibrary,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            assets: AssetLibrary::new(),
        }
    }

    /// Inserts `entity` as a new unowned, childless node.
    pub fn add_entity(&mut self, mut entity: SceneEntity) -> EntityId {
        entity.owner = None;
        entity.child_ids.clear();
        self.entities.insert(entity)
    }

    pub fn spawn_blueprint(&mut self, blueprint: &EntityBlueprint) -> EntityId {
        let geometry = self.assets.add_geometry(&blueprint.name, blueprint.shape);
        let material = self.assets.material_for_texture(&blueprint.texture);

        let entity = SceneEntity::new(&blueprint.name)
            .with_visuals(geometry, material)
            .with_transform(Transform::from_translation(blueprint.offset));

        self.add_entity(entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    pub fn entity(&self, id: EntityId) -> SceneResult<&SceneEntity> {
        self.entities.get(id).ok_or(SceneError::StaleEntity(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> SceneResult<&mut SceneEntity> {
        self.entities.get_mut(id).ok_or(SceneError::StaleEntity(id))
    }

    /// Appends `child` to `parent`'s children. Nothing changes on failure.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        self.entity(parent)?;
        let child_entity = self.entity(child)?;

        if child_entity.owner.is_some() {
            return Err(SceneError::AlreadyOwned {
                entity: child,
                name: child_entity.name.clone(),
            });
        }

        if self.is_self_or_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        self.entity_mut(child)?.owner = Some(Owner::Entity(parent));
        self.entity_mut(parent)?.child_ids.push(child);

        Ok(())
    }

    /// Marks an unowned entity as held by the anchor.
    pub(crate) fn claim_anchor_root(&mut self, id: EntityId) -> SceneResult<()> {
        let entity = self.entity_mut(id)?;

        if entity.owner.is_some() {
            return Err(SceneError::AlreadyOwned {
                entity: id,
                name: entity.name.clone(),
            });
        }

        entity.owner = Some(Owner::Anchor);
        Ok(())
    }

    fn is_self_or_ancestor(&self, candidate: EntityId, node: EntityId) -> bool {
        let mut current = Some(node);

        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.entities.get(id).and_then(SceneEntity::parent_id);
        }

        false
    }

    /// Destroys every subtree under `parent` and returns how many entities were removed.
    pub fn remove_all_children(&mut self, parent: EntityId) -> SceneResult<usize> {
        let child_ids = std::mem::take(&mut self.entity_mut(parent)?.child_ids);

        let mut doomed = Vec::new();
        for child_id in child_ids {
            self.collect_post_order(child_id, &mut doomed);
        }

        for id in &doomed {
            self.entities.remove(*id);
        }

        Ok(doomed.len())
    }

    /// Destroys `id` and its whole subtree, unlinking it from its parent entity.
    /// Anchor roots are refused; they go away with their anchor.
    pub fn destroy(&mut self, id: EntityId) -> SceneResult<usize> {
        let entity = self.entity(id)?;
        let owner = entity.owner;

        match owner {
            Some(Owner::Anchor) => {
                return Err(SceneError::AlreadyOwned {
                    entity: id,
                    name: entity.name.clone(),
                })
            }
            Some(Owner::Entity(parent_id)) => {
                if let Some(parent) = self.entities.get_mut(parent_id) {
                    parent.child_ids.retain(|&child_id| child_id != id);
                }
            }
            None => {}
        }

        Ok(self.destroy_subtree(id))
    }

    /// Destroys an entity the anchor holds as a root, along with its subtree.
    pub(crate) fn destroy_anchor_root(&mut self, id: EntityId) -> SceneResult<usize> {
        let owner = self.entity(id)?.owner;

        match owner {
            Some(Owner::Anchor) => Ok(self.destroy_subtree(id)),
            _ => Err(SceneError::NotAnchored),
        }
    }

    fn destroy_subtree(&mut self, id: EntityId) -> usize {
        let mut doomed = Vec::new();
        self.collect_post_order(id, &mut doomed);

        for doomed_id in &doomed {
            self.entities.remove(*doomed_id);
        }

        doomed.len()
    }

    /// Children before parents, siblings in insertion order.
    fn collect_post_order(&self, id: EntityId, out: &mut Vec<EntityId>) {
        if let Some(entity) = self.entities.get(id) {
            for &child_id in &entity.child_ids {
                self.collect_post_order(child_id, out);
            }
            out.push(id);
        }
    }

    /// Creates a new unowned copy of `id`. With `recursive` the whole subtree is copied.
    pub fn clone_entity(&mut self, id: EntityId, recursive: bool) -> SceneResult<EntityId> {
        let source = self.entity(id)?;
        let copy = source.shallow_copy();
        let child_ids = if recursive {
            source.child_ids.clone()
        } else {
            Vec::new()
        };

        let copy_id = self.add_entity(copy);

        for child_id in child_ids {
            let child_copy = self.clone_entity(child_id, true)?;
            self.add_child(copy_id, child_copy)?;
        }

        Ok(copy_id)
    }

    pub fn set_local_transform(&mut self, id: EntityId, transform: Transform) -> SceneResult<()> {
        self.entity_mut(id)?.transform = transform;
        Ok(())
    }

    pub fn set_uniform_scale(&mut self, id: EntityId, scale: f32) -> SceneResult<()> {
        self.entity_mut(id)?.transform.set_uniform_scale(scale);
        Ok(())
    }

    /// Transform of `id` relative to the root of its tree: the composition of
    /// every ancestor's local transform, root first.
    pub fn world_transform(&self, id: EntityId) -> SceneResult<Transform> {
        let mut chain = vec![self.entity(id)?.transform];
        let mut current = self.entity(id)?.parent_id();

        while let Some(parent_id) = current {
            let parent = self.entity(parent_id)?;
            chain.push(parent.transform);
            current = parent.parent_id();
        }

        Ok(chain
            .iter()
            .rev()
            .fold(Transform::IDENTITY, |world, local| world.compose(local)))
    }

    /// Depth-first draw list of the trees under `roots`, placed inside `base`.
    pub fn draw_list(&self, roots: &[EntityId], base: &Transform) -> Vec<DrawItem> {
        let mut items = Vec::new();

        for &root_id in roots {
            self.collect_draw_items(root_id, base, &mut items);
        }

        items
    }

    fn collect_draw_items(&self, id: EntityId, parent_world: &Transform, out: &mut Vec<DrawItem>) {
        if let Some(entity) = self.entities.get(id) {
            let world = parent_world.compose(&entity.transform);

            out.push(DrawItem {
                entity: id,
                name: entity.name.clone(),
                world,
                geometry: entity.geometry,
                material: entity.material,
            });

            for &child_id in &entity.child_ids {
                self.collect_draw_items(child_id, &world, out);
            }
        }
    }

    /// Number of entities below `id`.
    pub fn descendant_count(&self, id: EntityId) -> usize {
        let mut subtree = Vec::new();
        self.collect_post_order(id, &mut subtree);
        subtree.len().saturating_sub(1)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
