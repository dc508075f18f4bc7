//! The marker drop: the popup starts a few pixels above the clicked point and
//! falls onto it in fixed latitude steps, one step per frame.

use std::rc::Rc;
use std::time::Duration;

use crate::geo::{LatLng, Point};
use crate::scheduler::{CancelToken, Scheduler};

/// How far above the clicked point the drop starts, in container pixels.
pub const DROP_OFFSET_PX: f64 = 8.0;
pub const DROP_FRAMES: u32 = 12;
pub const FRAME_INTERVAL: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropState {
    Priming,
    Stepping { lat: f64, frame: u32 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Intermediate position.
    Move(LatLng),
    /// Final position, exactly the target. Emitted once.
    Land(LatLng),
}

#[derive(Debug, Clone)]
pub struct DropAnimation {
    target: LatLng,
    start_lat: f64,
    step: f64,
    state: DropState,
}

impl DropAnimation {
    pub fn new(start_lat: f64, target: LatLng) -> Self {
        Self {
            target,
            start_lat,
            step: (start_lat - target.lat) / DROP_FRAMES as f64,
            state: DropState::Priming,
        }
    }

    /// Derive the start latitude by projecting `point` raised by
    /// `DROP_OFFSET_PX`.
    pub fn from_point(point: Point, target: LatLng, project: impl Fn(Point) -> LatLng) -> Self {
        let start = project(point.offset(0.0, -DROP_OFFSET_PX));
        Self::new(start.lat, target)
    }

    pub fn start(&self) -> LatLng {
        LatLng::new(self.start_lat, self.target.lng)
    }

    pub fn target(&self) -> LatLng {
        self.target
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn state(&self) -> DropState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == DropState::Done
    }

    /// Nothing to animate: the pointer is already on the target, or the
    /// projection produced something unusable.
    pub fn is_stationary(&self) -> bool {
        self.step == 0.0 || !self.step.is_finite()
    }

    /// Advance one frame. Returns `None` once landed.
    pub fn tick(&mut self) -> Option<Frame> {
        let (lat, frame) = match self.state {
            DropState::Priming => (self.start_lat, 0),
            DropState::Stepping { lat, frame } => (lat, frame),
            DropState::Done => return None,
        };

        let next = lat - self.step;
        let frame = frame + 1;
        // Reached or passed the target, in whichever direction we travel.
        let arrived = self.is_stationary()
            || (next - self.target.lat) * self.step.signum() <= 0.0
            || frame >= DROP_FRAMES;

        if arrived {
            self.state = DropState::Done;
            Some(Frame::Land(self.target))
        } else {
            self.state = DropState::Stepping { lat: next, frame };
            Some(Frame::Move(LatLng::new(next, self.target.lng)))
        }
    }
}

/// Drive `animation` on `scheduler`, one frame every `FRAME_INTERVAL`.
///
/// A stationary animation lands synchronously. Once `token` is cancelled no
/// further frame is delivered.
pub fn play(
    mut animation: DropAnimation,
    scheduler: Rc<dyn Scheduler>,
    token: CancelToken,
    mut on_frame: Box<dyn FnMut(Frame)>,
) {
    if animation.is_stationary() {
        if let Some(frame) = animation.tick() {
            on_frame(frame);
        }
        return;
    }

    let next = scheduler.clone();
    scheduler.schedule(
        FRAME_INTERVAL,
        Box::new(move || {
            if token.is_cancelled() {
                return;
            }
            match animation.tick() {
                Some(frame @ Frame::Move(_)) => {
                    on_frame(frame);
                    play(animation, next, token, on_frame);
                }
                Some(frame @ Frame::Land(_)) => on_frame(frame),
                None => {}
            }
        }),
    );
}
