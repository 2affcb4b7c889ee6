use glam::{Quat, Vec3};

use crate::error::SceneResult;
use crate::scene_graph::{EntityId, Scene};

pub const MAX_CHAIN_LENGTH: usize = 10;

/// Number of staircase links for a scalar control value: `floor(value * 10)`
/// clamped to `0..=10`.
pub fn chain_length(value: f32) -> usize {
    // Also catches NaN
    if !(value > 0.0) {
        return 0;
    }

    let links = (value * MAX_CHAIN_LENGTH as f32).floor();
    (links as usize).min(MAX_CHAIN_LENGTH)
}

/// Per-link placement relative to the previous link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStyle {
    pub offset: Vec3,
    pub rotation: Quat,
}

impl StepStyle {
    pub fn new(offset: Vec3, angle_degrees: f32) -> Self {
        Self {
            offset,
            rotation: Quat::from_rotation_y(angle_degrees.to_radians()),
        }
    }
}

impl Default for StepStyle {
    fn default() -> Self {
        Self::new(Vec3::new(0.1, 0.1, 0.0), 45.0)
    }
}

/// Builds the spiral staircase: a linear chain of template clones, each one
/// the single child of the previous link.
#[derive(Debug, Clone, Default)]
pub struct ProceduralTreeBuilder {
    style: StepStyle,
}

impl ProceduralTreeBuilder {
    pub fn new(style: StepStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StepStyle {
        &self.style
    }

    /// Tears down everything under `root` and grows a fresh chain of
    /// `chain_length(value)` links cloned from `template`. Without a template
    /// only the teardown happens.
    ///
    /// Ids are validated before anything is destroyed, so a failed call
    /// leaves the scene as it was. Returns the new links, root side first.
    pub fn rebuild(
        &self,
        scene: &mut Scene,
        root: EntityId,
        template: Option<EntityId>,
        value: f32,
    ) -> SceneResult<Vec<EntityId>> {
        scene.entity(root)?;
        // The template may live inside the subtree about to be destroyed
        let prototype = match template {
            Some(template) => Some(scene.entity(template)?.shallow_copy()),
            None => None,
        };

        let removed = scene.remove_all_children(root)?;

        let Some(prototype) = prototype else {
            log::debug!("Staircase cleared ({} entities removed), no template", removed);
            return Ok(Vec::new());
        };

        let length = chain_length(value);
        let mut links = Vec::with_capacity(length);
        let mut last = root;

        for step in 0..length {
            let mut link = prototype.shallow_copy();
            link.name = format!("{}.step{}", prototype.name, step);

            let mut transform = *link.transform();
            transform.set_translation(self.style.offset);
            transform.set_rotation(self.style.rotation);

            let link_id = scene.add_entity(link.with_transform(transform));
            scene.add_child(last, link_id)?;

            links.push(link_id);
            last = link_id;
        }

        log::debug!(
            "Staircase rebuilt at {:.3}: {} removed, {} links",
            value,
            removed,
            links.len()
        );

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::{SceneEntity, Transform};
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_4;

    fn scene_with_box() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let root = scene.add_entity(
            SceneEntity::new("box").with_transform(Transform::from_translation(Vec3::new(0.2, 0.1, 0.0))),
        );
        (scene, root)
    }

    #[test]
    fn chain_length_follows_floor() {
        assert_eq!(chain_length(0.0), 0);
        assert_eq!(chain_length(0.09), 0);
        assert_eq!(chain_length(0.35), 3);
        assert_eq!(chain_length(0.5), 5);
        assert_eq!(chain_length(0.99), 9);
        assert_eq!(chain_length(1.0), 10);
    }

    #[test]
    fn chain_length_clamps_out_of_range() {
        assert_eq!(chain_length(-0.5), 0);
        assert_eq!(chain_length(1.7), 10);
        assert_eq!(chain_length(f32::NAN), 0);
        assert_eq!(chain_length(f32::INFINITY), 10);
    }

    #[test]
    fn chain_length_is_monotonic() {
        let table = [
            (0.0, 0),
            (0.05, 0),
            (0.099, 0),
            (0.1, 1),
            (0.15, 1),
            (0.25, 2),
            (0.35, 3),
            (0.5, 5),
            (0.65, 6),
            (0.75, 7),
            (0.99, 9),
            (1.0, 10),
        ];

        for (value, expected) in table {
            assert_eq!(chain_length(value), expected, "chain_length({})", value);
        }

        let lengths: Vec<_> = (0..=1000).map(|i| chain_length(i as f32 / 1000.0)).collect();
        assert!(lengths.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(lengths.first(), Some(&0));
        assert_eq!(lengths.last(), Some(&MAX_CHAIN_LENGTH));
    }

    #[test]
    fn rebuild_grows_linear_chain() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();

        let links = builder.rebuild(&mut scene, root, Some(root), 0.35).unwrap();

        assert_eq!(links.len(), 3);
        assert_eq!(scene.entity(root).unwrap().child_ids(), &[links[0]]);
        assert_eq!(scene.entity(links[0]).unwrap().child_ids(), &[links[1]]);
        assert_eq!(scene.entity(links[1]).unwrap().child_ids(), &[links[2]]);
        assert!(scene.entity(links[2]).unwrap().child_ids().is_empty());
        assert_eq!(scene.entity(links[1]).unwrap().name, "box.step1");
    }

    #[test]
    fn links_step_relative_to_parent() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();

        let links = builder.rebuild(&mut scene, root, Some(root), 1.0).unwrap();
        assert_eq!(links.len(), MAX_CHAIN_LENGTH);

        let mut expected = *scene.entity(root).unwrap().transform();
        for &link in &links {
            let local = scene.entity(link).unwrap().transform();
            assert_eq!(local.translation(), Vec3::new(0.1, 0.1, 0.0));
            assert_abs_diff_eq!(local.rotation(), Quat::from_rotation_y(FRAC_PI_4), epsilon = 1e-6);

            expected = expected.compose(local);
            let world = scene.world_transform(link).unwrap();
            assert_abs_diff_eq!(world.translation(), expected.translation(), epsilon = 1e-5);
            assert_abs_diff_eq!(world.rotation(), expected.rotation(), epsilon = 1e-5);
        }
    }

    #[test]
    fn rebuild_is_structurally_idempotent() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();

        let first = builder.rebuild(&mut scene, root, Some(root), 0.62).unwrap();
        let first_transforms: Vec<_> = first
            .iter()
            .map(|&id| *scene.entity(id).unwrap().transform())
            .collect();

        let second = builder.rebuild(&mut scene, root, Some(root), 0.62).unwrap();
        let second_transforms: Vec<_> = second
            .iter()
            .map(|&id| *scene.entity(id).unwrap().transform())
            .collect();

        assert_eq!(first.len(), second.len());
        assert_eq!(first_transforms, second_transforms);
        assert!(first.iter().all(|&id| !scene.contains(id)));
        assert_eq!(scene.len(), 1 + second.len());
    }

    #[test]
    fn zero_value_leaves_root_childless() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();
        builder.rebuild(&mut scene, root, Some(root), 0.8).unwrap();

        let links = builder.rebuild(&mut scene, root, Some(root), 0.0).unwrap();

        assert!(links.is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn missing_template_only_tears_down() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();
        builder.rebuild(&mut scene, root, Some(root), 0.5).unwrap();

        let links = builder.rebuild(&mut scene, root, None, 0.5).unwrap();

        assert!(links.is_empty());
        assert!(scene.entity(root).unwrap().child_ids().is_empty());
    }

    #[test]
    fn stale_template_fails_before_teardown() {
        let (mut scene, root) = scene_with_box();
        let builder = ProceduralTreeBuilder::default();
        let links = builder.rebuild(&mut scene, root, Some(root), 0.3).unwrap();
        let gone = scene.add_entity(SceneEntity::new("gone"));
        scene.destroy(gone).unwrap();

        assert!(builder.rebuild(&mut scene, root, Some(gone), 0.9).is_err());
        assert!(links.iter().all(|&id| scene.contains(id)));
    }
}
