use crate::anchor::AnchorManager;
use crate::config::StageConfig;
use crate::control::{ControlSubscription, UiSignal, DEFAULT_SCALAR};
use crate::error::SceneResult;
use crate::scene_graph::{DrawItem, EntityBlueprint, EntityId, Scene, Transform};
use crate::session::SurfaceFact;
use crate::staircase::{ProceduralTreeBuilder, StepStyle};

/// The entities placed under every fresh anchor and how the scalar drives them.
#[derive(Debug, Clone)]
pub struct StageLayout {
    pub primary: EntityBlueprint,
    pub staircase_root: EntityBlueprint,
    /// Without a staircase the root box is placed but never grows links.
    pub staircase_enabled: bool,
    pub scale_factor: f32,
}

impl Default for StageLayout {
    fn default() -> Self {
        let config = StageConfig::default();
        Self {
            primary: config.primary,
            staircase_root: config.staircase_root,
            staircase_enabled: config.staircase.enabled,
            scale_factor: config.scale_factor,
        }
    }
}

/// Keeps the scene consistent with the control channels and the tracked surface.
///
/// Everything runs on the caller's thread; each handler finishes its scene
/// mutation before returning.
pub struct ReactiveController {
    scene: Scene,
    anchors: AnchorManager,
    builder: ProceduralTreeBuilder,
    layout: StageLayout,
    surface: Option<Transform>,
    scalar: f32,
    primary: Option<EntityId>,
    staircase_root: Option<EntityId>,
}

impl ReactiveController {
    pub fn new(layout: StageLayout, builder: ProceduralTreeBuilder) -> Self {
        Self {
            scene: Scene::new(),
            anchors: AnchorManager::new(),
            builder,
            layout,
            surface: None,
            scalar: DEFAULT_SCALAR,
            primary: None,
            staircase_root: None,
        }
    }

    pub fn from_config(config: &StageConfig) -> Self {
        let layout = StageLayout {
            primary: config.primary.clone(),
            staircase_root: config.staircase_root.clone(),
            staircase_enabled: config.staircase.enabled,
            scale_factor: config.scale_factor,
        };
        let style = StepStyle::new(config.staircase.link_offset, config.staircase.link_angle_degrees);

        let mut controller = Self::new(layout, ProceduralTreeBuilder::new(style));
        controller.scalar = config.control.default_scalar;
        controller
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn anchors(&self) -> &AnchorManager {
        &self.anchors
    }

    /// Last scalar value processed.
    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    pub fn primary(&self) -> Option<EntityId> {
        self.primary
    }

    pub fn staircase_root(&self) -> Option<EntityId> {
        self.staircase_root
    }

    /// Current staircase links, root side first.
    pub fn staircase_links(&self) -> Vec<EntityId> {
        let mut links = Vec::new();
        let mut current = self.staircase_root;

        while let Some(id) = current {
            current = self
                .scene
                .get_entity(id)
                .and_then(|entity| entity.child_ids().first().copied());
            if let Some(link) = current {
                links.push(link);
            }
        }

        links
    }

    pub fn surface(&self) -> Option<&Transform> {
        self.surface.as_ref()
    }

    pub fn observe(&mut self, fact: SurfaceFact) {
        match fact {
            SurfaceFact::SurfaceAvailable(transform) => self.surface = Some(transform),
            SurfaceFact::SessionEnded => self.session_ended(),
        }
    }

    fn session_ended(&mut self) {
        self.anchors.teardown(&mut self.scene);
        self.surface = None;
        self.primary = None;
        self.staircase_root = None;
    }

    /// Drains both channels, scalar emissions first. Stops at the first
    /// failure; unprocessed emissions stay queued. Returns how many emissions
    /// were handled.
    pub fn pump(&mut self, subscription: &mut ControlSubscription) -> SceneResult<usize> {
        let mut handled = 0;

        while let Some(value) = subscription.next_scalar() {
            self.handle_scalar(value)?;
            handled += 1;
        }

        while let Some(signal) = subscription.next_signal() {
            self.handle_signal(signal)?;
            handled += 1;
        }

        Ok(handled)
    }

    /// Rescales the primary entity and rebuilds the staircase for `value`.
    pub fn handle_scalar(&mut self, value: f32) -> SceneResult<()> {
        self.scalar = value;
        self.apply_scalar()
    }

    pub fn handle_signal(&mut self, signal: UiSignal) -> SceneResult<()> {
        match signal {
            UiSignal::Reset => self.reset(),
        }
    }

    fn reset(&mut self) -> SceneResult<()> {
        self.anchors.reset(&mut self.scene, self.surface)?;

        let StageLayout {
            primary,
            staircase_root,
            ..
        } = self.layout.clone();
        self.primary = Some(self.place(&primary)?);
        self.staircase_root = Some(self.place(&staircase_root)?);

        self.apply_scalar()
    }

    fn place(&mut self, blueprint: &EntityBlueprint) -> SceneResult<EntityId> {
        let id = self.scene.spawn_blueprint(blueprint);
        self.anchors.attach_root(&mut self.scene, id)?;
        Ok(id)
    }

    fn apply_scalar(&mut self) -> SceneResult<()> {
        let value = self.scalar;

        let Some(primary) = self.primary else {
            log::trace!("Scalar {:.3} recorded, nothing anchored yet", value);
            return Ok(());
        };
        self.scene
            .set_uniform_scale(primary, self.layout.scale_factor * value)?;

        if let Some(root) = self.staircase_root {
            let template = self.layout.staircase_enabled.then_some(root);
            self.builder.rebuild(&mut self.scene, root, template, value)?;
        }

        Ok(())
    }

    pub fn draw_list(&self) -> Vec<DrawItem> {
        self.anchors.draw_list(&self.scene)
    }
}
