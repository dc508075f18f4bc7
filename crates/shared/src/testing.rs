//! An in-process map host for driving a widget without a browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::geo::{LatLng, Point, Viewport};
use crate::host::{InputHook, ListenerId, MapEvent, MapEventKind, MapHandler, MapHost, Popup};
use crate::models::ContentElement;

/// Everything a `FakeHost` popup has been told.
pub struct PopupRecord {
    pub content: Option<ContentElement>,
    pub on_input: Option<InputHook>,
    pub lat_lng: Option<LatLng>,
    /// Every position set, oldest first.
    pub positions: Vec<LatLng>,
    pub content_changes: usize,
    pub close_on_click: bool,
    pub open: bool,
}

impl Default for PopupRecord {
    fn default() -> Self {
        Self {
            content: None,
            on_input: None,
            lat_lng: None,
            positions: Vec::new(),
            content_changes: 0,
            // Popups close on map clicks unless told otherwise.
            close_on_click: true,
            open: false,
        }
    }
}

struct FakePopup(Rc<RefCell<PopupRecord>>);

impl Popup for FakePopup {
    fn set_content(&mut self, content: ContentElement, on_input: Option<InputHook>) {
        let mut rec = self.0.borrow_mut();
        rec.content = Some(content);
        rec.on_input = on_input;
        rec.content_changes += 1;
    }

    fn set_lat_lng(&mut self, lat_lng: LatLng) {
        let mut rec = self.0.borrow_mut();
        rec.lat_lng = Some(lat_lng);
        rec.positions.push(lat_lng);
    }

    fn set_close_on_click(&mut self, close_on_click: bool) {
        self.0.borrow_mut().close_on_click = close_on_click;
    }

    fn open(&mut self) {
        self.0.borrow_mut().open = true;
    }

    fn close(&mut self) {
        self.0.borrow_mut().open = false;
    }
}

pub struct FakeHost {
    viewport: Viewport,
    next_listener: Cell<ListenerId>,
    listeners: RefCell<Vec<(ListenerId, MapEventKind, MapHandler)>>,
    popups: RefCell<Vec<Rc<RefCell<PopupRecord>>>>,
}

impl FakeHost {
    pub fn new(viewport: Viewport) -> Rc<Self> {
        Rc::new(Self {
            viewport,
            next_listener: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
            popups: RefCell::new(Vec::new()),
        })
    }

    pub fn listener_count(&self, kind: MapEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    pub fn popups_created(&self) -> usize {
        self.popups.borrow().len()
    }

    /// The most recently created popup.
    pub fn popup(&self) -> Option<Rc<RefCell<PopupRecord>>> {
        self.popups.borrow().last().cloned()
    }

    /// Dispatch to every handler of the event's kind, in subscription order.
    /// Handlers may unsubscribe while being dispatched.
    pub fn dispatch(&self, event: &MapEvent) {
        let handlers: Vec<MapHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == event.kind)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(event);
            if event.is_consumed() {
                break;
            }
        }
    }

    pub fn move_pointer(&self, point: Point) {
        let event = MapEvent::new(
            MapEventKind::MouseMove,
            self.viewport.container_point_to_lat_lng(point),
            point,
        );
        self.dispatch(&event);
    }

    /// Returns whether a handler consumed the click.
    pub fn click(&self, point: Point) -> bool {
        let event = MapEvent::new(
            MapEventKind::Click,
            self.viewport.container_point_to_lat_lng(point),
            point,
        );
        self.dispatch(&event);
        event.is_consumed()
    }

    /// Feed text to the current popup's input hook, as a user typing would.
    /// Returns `false` when the popup has no input hook.
    pub fn type_text(&self, text: &str) -> bool {
        let hook = self.popup().and_then(|p| {
            let hook = p.borrow().on_input.clone();
            hook
        });
        match hook {
            Some(hook) => {
                hook(text);
                true
            }
            None => false,
        }
    }
}

impl MapHost for FakeHost {
    fn center(&self) -> LatLng {
        self.viewport.center
    }

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        self.viewport.container_point_to_lat_lng(point)
    }

    fn on(&self, kind: MapEventKind, handler: MapHandler) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, kind, handler));
        id
    }

    fn off(&self, kind: MapEventKind, listener: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(id, k, _)| !(*id == listener && *k == kind));
    }

    fn create_popup(&self) -> Box<dyn Popup> {
        let record = Rc::new(RefCell::new(PopupRecord::default()));
        self.popups.borrow_mut().push(record.clone());
        Box::new(FakePopup(record))
    }
}
