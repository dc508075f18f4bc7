//! A `MapHost` whose state lives in Dioxus signals, so that popups and view
//! changes made by the widget re-render the map surface.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use dioxus::prelude::*;
use map_comment_shared::geo::{LatLng, Point, Viewport};
use map_comment_shared::host::{InputHook, ListenerId, MapEvent, MapEventKind, MapHandler, MapHost, Popup};
use map_comment_shared::models::ContentElement;

/// Render state of one popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub key: u64,
    pub content: Option<ContentElement>,
    pub lat_lng: LatLng,
    pub open: bool,
    pub close_on_click: bool,
}

pub struct SurfaceHost {
    viewport: Signal<Viewport>,
    popups: Signal<Vec<PopupView>>,
    hooks: Rc<RefCell<HashMap<u64, InputHook>>>,
    listeners: RefCell<Vec<(ListenerId, MapEventKind, MapHandler)>>,
    next_listener: Cell<ListenerId>,
    next_popup: Cell<u64>,
}

impl SurfaceHost {
    pub fn new(viewport: Signal<Viewport>, popups: Signal<Vec<PopupView>>) -> Self {
        Self {
            viewport,
            popups,
            hooks: Rc::new(RefCell::new(HashMap::new())),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            next_popup: Cell::new(1),
        }
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.peek()
    }

    /// Deliver a pointer event at a container point. Returns whether a handler
    /// consumed it.
    pub fn dispatch_at(&self, kind: MapEventKind, point: Point) -> bool {
        let lat_lng = self.viewport().container_point_to_lat_lng(point);
        let event = MapEvent::new(kind, lat_lng, point);
        let handlers: Vec<MapHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(&event);
            if event.is_consumed() {
                break;
            }
        }
        if kind == MapEventKind::Click && !event.is_consumed() {
            self.close_popups_on_click();
        }
        event.is_consumed()
    }

    /// Forward text typed into popup `key` to its input hook.
    pub fn input(&self, key: u64, text: &str) {
        let hook = self.hooks.borrow().get(&key).cloned();
        if let Some(hook) = hook {
            hook(text);
        }
    }

    fn close_popups_on_click(&self) {
        let mut popups = self.popups;
        for view in popups.write().iter_mut() {
            if view.close_on_click {
                view.open = false;
            }
        }
    }
}

impl MapHost for SurfaceHost {
    fn center(&self) -> LatLng {
        self.viewport().center
    }

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        self.viewport().container_point_to_lat_lng(point)
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
        let key = self.next_popup.get();
        self.next_popup.set(key + 1);
        let mut popups = self.popups;
        popups.write().push(PopupView {
            key,
            content: None,
            lat_lng: self.viewport().center,
            open: false,
            close_on_click: true,
        });
        Box::new(SurfacePopup {
            key,
            popups: self.popups,
            hooks: self.hooks.clone(),
        })
    }
}

struct SurfacePopup {
    key: u64,
    popups: Signal<Vec<PopupView>>,
    hooks: Rc<RefCell<HashMap<u64, InputHook>>>,
}

impl SurfacePopup {
    fn update(&mut self, f: impl FnOnce(&mut PopupView)) {
        if let Some(view) = self.popups.write().iter_mut().find(|v| v.key == self.key) {
            f(view);
        }
    }
}

impl Popup for SurfacePopup {
    fn set_content(&mut self, content: ContentElement, on_input: Option<InputHook>) {
        match on_input {
            Some(hook) => self.hooks.borrow_mut().insert(self.key, hook),
            None => self.hooks.borrow_mut().remove(&self.key),
        };
        self.update(|view| view.content = Some(content));
    }

    fn set_lat_lng(&mut self, lat_lng: LatLng) {
        self.update(|view| view.lat_lng = lat_lng);
    }

    fn set_close_on_click(&mut self, close_on_click: bool) {
        self.update(|view| view.close_on_click = close_on_click);
    }

    fn open(&mut self) {
        self.update(|view| view.open = true);
    }

    fn close(&mut self) {
        self.hooks.borrow_mut().remove(&self.key);
        let key = self.key;
        self.popups.write().retain(|v| v.key != key);
    }
}

/// Component-prop wrapper: equal when both point at the same host.
#[derive(Clone)]
pub struct HostHandle(pub Rc<SurfaceHost>);

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
