//! What the widget needs from the map it is attached to.

use std::cell::Cell;
use std::rc::Rc;

use crate::geo::{LatLng, Point};
use crate::models::ContentElement;

pub type ListenerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    MouseMove,
    Click,
}

#[derive(Debug, Clone)]
pub struct MapEvent {
    pub kind: MapEventKind,
    pub lat_lng: LatLng,
    pub container_point: Point,
    consumed: Cell<bool>,
}

impl MapEvent {
    pub fn new(kind: MapEventKind, lat_lng: LatLng, container_point: Point) -> Self {
        Self {
            kind,
            lat_lng,
            container_point,
            consumed: Cell::new(false),
        }
    }

    /// Prevent the default action and stop propagation to other handlers.
    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}

pub type MapHandler = Rc<dyn Fn(&MapEvent)>;

/// Called by the host with the new text whenever an editable content element
/// receives input.
pub type InputHook = Rc<dyn Fn(&str)>;

/// A popup-like overlay anchored at a geographic position.
pub trait Popup {
    fn set_content(&mut self, content: ContentElement, on_input: Option<InputHook>);
    fn set_lat_lng(&mut self, lat_lng: LatLng);
    fn set_close_on_click(&mut self, close_on_click: bool);
    fn open(&mut self);
    fn close(&mut self);
}

pub trait MapHost {
    fn center(&self) -> LatLng;

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng;

    fn on(&self, kind: MapEventKind, handler: MapHandler) -> ListenerId;

    fn off(&self, kind: MapEventKind, listener: ListenerId);

    fn create_popup(&self) -> Box<dyn Popup>;
}

/// Identity comparison: both handles point at the same host object.
pub fn same_host(a: &Rc<dyn MapHost>, b: &Rc<dyn MapHost>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;
    use crate::testing::FakeHost;

    #[test]
    fn test_same_host_is_identity() {
        let view = Viewport::new(LatLng::new(0.0, 0.0), 1.0, 100.0, 100.0);
        let a: Rc<dyn MapHost> = FakeHost::new(view);
        let b: Rc<dyn MapHost> = FakeHost::new(view);
        assert!(same_host(&a, &a.clone()));
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_event_consume() {
        let evt = MapEvent::new(MapEventKind::Click, LatLng::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert!(!evt.is_consumed());
        evt.consume();
        assert!(evt.is_consumed());
    }
}
