use std::collections::VecDeque;

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::scene_graph::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
}

/// Settings handed to the tracking backend when the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfiguration {
    pub plane_detection: Vec<PlaneAlignment>,
    pub environment_texturing: bool,
}

impl Default for TrackingConfiguration {
    fn default() -> Self {
        Self {
            plane_detection: vec![PlaneAlignment::Horizontal],
            environment_texturing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPlane {
    pub id: u64,
    pub alignment: PlaneAlignment,
    pub transform: Transform,
    pub extent: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PlaneDetected(DetectedPlane),
    PlaneUpdated(DetectedPlane),
    Ended,
}

/// What the rest of the stage needs to know from the tracking session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceFact {
    SurfaceAvailable(Transform),
    SessionEnded,
}

/// Camera tracking and plane detection engine.
pub trait TrackingBackend {
    fn run(&mut self, configuration: &TrackingConfiguration) -> anyhow::Result<()>;

    /// Events delivered since the last poll, oldest first.
    fn poll_events(&mut self) -> Vec<SessionEvent>;
}

/// Thin shim between a tracking backend and the stage: starts tracking and
/// turns backend events into horizontal-surface facts.
pub struct SessionAdapter {
    backend: Box<dyn TrackingBackend>,
    configuration: TrackingConfiguration,
    running: bool,
    current_surface: Option<DetectedPlane>,
}

impl SessionAdapter {
    pub fn new(backend: Box<dyn TrackingBackend>, configuration: TrackingConfiguration) -> Self {
        Self {
            backend,
            configuration,
            running: false,
            current_surface: None,
        }
    }

    pub fn start(&mut self) -> anyhow::Result<()> {
        self.backend
            .run(&self.configuration)
            .context("Failed to start tracking session")?;
        self.running = true;

        log::info!(
            "Tracking session started (planes: {:?}, environment texturing: {})",
            self.configuration.plane_detection,
            self.configuration.environment_texturing
        );

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Most recently reported horizontal plane.
    pub fn current_surface(&self) -> Option<&DetectedPlane> {
        self.current_surface.as_ref()
    }

    pub fn poll(&mut self) -> Vec<SurfaceFact> {
        if !self.running {
            return Vec::new();
        }

        let mut facts = Vec::new();

        for event in self.backend.poll_events() {
            match event {
                SessionEvent::PlaneDetected(plane) | SessionEvent::PlaneUpdated(plane) => {
                    if plane.alignment != PlaneAlignment::Horizontal {
                        log::trace!("Ignoring {:?} plane {}", plane.alignment, plane.id);
                        continue;
                    }

                    log::debug!(
                        "Horizontal plane {} at {:?}",
                        plane.id,
                        plane.transform.translation()
                    );
                    facts.push(SurfaceFact::SurfaceAvailable(plane.transform));
                    self.current_surface = Some(plane);
                }
                SessionEvent::Ended => {
                    log::info!("Tracking session ended");
                    self.running = false;
                    self.current_surface = None;
                    facts.push(SurfaceFact::SessionEnded);
                    break;
                }
            }
        }

        facts
    }
}

/// Scripted backend: hands out queued events in order. Used by the demo
/// driver and in tests in place of a device tracking engine.
#[derive(Debug, Default)]
pub struct SimulatedSession {
    configuration: Option<TrackingConfiguration>,
    pending: VecDeque<SessionEvent>,
}

impl SimulatedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.pending.push_back(event);
    }

    pub fn configuration(&self) -> Option<&TrackingConfiguration> {
        self.configuration.as_ref()
    }
}

impl TrackingBackend for SimulatedSession {
    fn run(&mut self, configuration: &TrackingConfiguration) -> anyhow::Result<()> {
        if configuration.plane_detection.is_empty() {
            anyhow::bail!("Plane detection must be enabled for at least one alignment");
        }

        self.configuration = Some(configuration.clone());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SessionEvent> {
        let configuration = self.configuration.as_ref();

        self.pending
            .drain(..)
            .filter(|event| match event {
                SessionEvent::PlaneDetected(plane) | SessionEvent::PlaneUpdated(plane) => {
                    configuration.is_some_and(|c| c.plane_detection.contains(&plane.alignment))
                }
                SessionEvent::Ended => true,
            })
            .collect()
    }
}

/// A backend the adapter can share with the code feeding it events.
impl<T: TrackingBackend> TrackingBackend for std::rc::Rc<std::cell::RefCell<T>> {
    fn run(&mut self, configuration: &TrackingConfiguration) -> anyhow::Result<()> {
        self.borrow_mut().run(configuration)
    }

    fn poll_events(&mut self) -> Vec<SessionEvent> {
        self.borrow_mut().poll_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn plane(id: u64, alignment: PlaneAlignment, height: f32) -> DetectedPlane {
        DetectedPlane {
            id,
            alignment,
            transform: Transform::from_translation(Vec3::new(0.0, height, -1.0)),
            extent: Vec2::new(1.0, 1.0),
        }
    }

    fn started_adapter() -> (Rc<RefCell<SimulatedSession>>, SessionAdapter) {
        let backend = Rc::new(RefCell::new(SimulatedSession::new()));
        let mut adapter = SessionAdapter::new(Box::new(backend.clone()), TrackingConfiguration::default());
        adapter.start().unwrap();
        (backend, adapter)
    }

    #[test]
    fn start_hands_configuration_to_backend() {
        let (backend, adapter) = started_adapter();

        assert!(adapter.is_running());
        assert_eq!(
            backend.borrow().configuration().map(|c| c.plane_detection.clone()),
            Some(vec![PlaneAlignment::Horizontal])
        );
    }

    #[test]
    fn start_fails_without_plane_detection() {
        let configuration = TrackingConfiguration {
            plane_detection: Vec::new(),
            environment_texturing: false,
        };
        let mut adapter = SessionAdapter::new(Box::new(SimulatedSession::new()), configuration);

        assert!(adapter.start().is_err());
        assert!(!adapter.is_running());
    }

    #[test]
    fn only_horizontal_planes_become_surfaces() {
        let (backend, mut adapter) = started_adapter();
        backend.borrow_mut().push(SessionEvent::PlaneDetected(plane(1, PlaneAlignment::Vertical, 0.0)));
        backend.borrow_mut().push(SessionEvent::PlaneDetected(plane(2, PlaneAlignment::Horizontal, -1.0)));
        backend.borrow_mut().push(SessionEvent::PlaneUpdated(plane(2, PlaneAlignment::Horizontal, -1.1)));

        let facts = adapter.poll();

        assert_eq!(facts.len(), 2);
        assert_eq!(adapter.current_surface().map(|p| p.transform.translation().y), Some(-1.1));
    }

    #[test]
    fn ended_session_stops_reporting() {
        let (backend, mut adapter) = started_adapter();
        backend.borrow_mut().push(SessionEvent::PlaneDetected(plane(1, PlaneAlignment::Horizontal, -1.0)));
        backend.borrow_mut().push(SessionEvent::Ended);

        let facts = adapter.poll();

        assert_eq!(facts.last(), Some(&SurfaceFact::SessionEnded));
        assert!(!adapter.is_running());
        assert!(adapter.current_surface().is_none());

        backend.borrow_mut().push(SessionEvent::PlaneDetected(plane(3, PlaneAlignment::Horizontal, -1.0)));
        assert!(adapter.poll().is_empty());
    }
}
