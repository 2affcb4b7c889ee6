use std::cell::RefCell;
use std::rc::Rc;

use anchorstage::session::{DetectedPlane, PlaneAlignment, SessionEvent, SimulatedSession};
use anchorstage::{ControlState, ControlSubscription, ReactiveController, SessionAdapter, StageConfig, Transform, UiSignal};
use glam::{Vec2, Vec3};
use rand::Rng;

pub const FRAME_COUNT: u32 = 24;

/// Plays a scripted session: a premature reset, plane detection, a slider
/// sweep, some random slider jitter, a re-anchor on a moved plane, then the
/// session ends.
pub struct DemoState {
    pub control: ControlState,
    pub subscription: ControlSubscription,
    pub controller: ReactiveController,
    pub session: SessionAdapter,
    tracking: Rc<RefCell<SimulatedSession>>,
    pub frame: u32,
}

impl DemoState {
    pub fn new(config: &StageConfig) -> anyhow::Result<Self> {
        let mut control = ControlState::new(config.control.default_scalar);
        let subscription = control.subscribe();
        let controller = ReactiveController::from_config(config);

        let tracking = Rc::new(RefCell::new(SimulatedSession::new()));
        let mut session = SessionAdapter::new(Box::new(tracking.clone()), config.session.clone());
        session.start()?;

        Ok(Self {
            control,
            subscription,
            controller,
            session,
            tracking,
            frame: 0,
        })
    }

    pub fn finished(&self) -> bool {
        self.frame >= FRAME_COUNT
    }

    /// Feeds this frame's UI input and tracking events.
    pub fn update(&mut self) {
        match self.frame {
            0 | 3 => self.control.send(UiSignal::Reset),
            2 => {
                self.detect(1, PlaneAlignment::Vertical, Vec3::new(0.0, 0.0, -2.0));
                self.detect(2, PlaneAlignment::Horizontal, Vec3::new(0.0, -1.2, -0.8));
            }
            4..=14 => self.control.set_scalar((self.frame - 4) as f32 / 10.0),
            15..=19 => {
                let value = rand::thread_rng().gen_range(0.0..=1.0);
                self.control.set_scalar(value);
            }
            20 => {
                let moved = plane(2, PlaneAlignment::Horizontal, Vec3::new(0.1, -1.25, -0.9));
                self.tracking.borrow_mut().push(SessionEvent::PlaneUpdated(moved));
                self.control.send(UiSignal::Reset);
            }
            22 => self.tracking.borrow_mut().push(SessionEvent::Ended),
            _ => {}
        }

        self.frame += 1;
    }

    fn detect(&mut self, id: u64, alignment: PlaneAlignment, position: Vec3) {
        self.tracking
            .borrow_mut()
            .push(SessionEvent::PlaneDetected(plane(id, alignment, position)));
    }
}

fn plane(id: u64, alignment: PlaneAlignment, position: Vec3) -> DetectedPlane {
    DetectedPlane {
        id,
        alignment,
        transform: Transform::from_translation(position),
        extent: Vec2::new(0.8, 0.6),
    }
}
