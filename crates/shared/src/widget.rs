//! The comment widget: attach it to a map, let the user move the prompt
//! around, click to drop it, then type. Text is persisted on every edit when
//! a store is configured.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::animation::{self, DropAnimation, Frame};
use crate::clock::{Clock, SystemClock};
use crate::geo::LatLng;
use crate::host::{same_host, InputHook, ListenerId, MapEvent, MapEventKind, MapHost, Popup};
use crate::ids::{global_id_generator, IdGenerator};
use crate::models::{CommentContent, CommentSnapshot, ContentElement, ContentMode, CONTENT_CLASS};
use crate::options::CommentOptions;
use crate::persist::{self, PersistValue};
use crate::scheduler::{CancelToken, Scheduler};
use crate::store::KeyValueStore;

struct Inner {
    options: CommentOptions,
    id: Option<String>,
    /// Load the stored record on the next enable (caller supplied the id).
    restore_on_enable: bool,
    /// A record was loaded and should be shown on the next enable.
    restored: bool,
    enabled: bool,
    host: Option<Rc<dyn MapHost>>,
    popup: Option<Box<dyn Popup>>,
    content: CommentContent,
    position: Option<LatLng>,
    listeners: Vec<(MapEventKind, ListenerId)>,
    drop_token: Option<CancelToken>,
    store: Option<Rc<dyn KeyValueStore>>,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn Scheduler>,
    ids: Arc<dyn IdGenerator>,
}

impl Inner {
    fn persistence_active(&self) -> bool {
        self.options.use_cookies && self.store.as_ref().is_some_and(|s| s.is_available())
    }

    fn element(&self, mode: ContentMode) -> ContentElement {
        let id = self.id.clone().unwrap_or_default();
        let class = CONTENT_CLASS.to_string();
        let style = self.options.inline_style();
        match mode {
            ContentMode::Placeholder => ContentElement::Prompt {
                id,
                class,
                style,
                message: self.options.on_drag_message.clone(),
            },
            ContentMode::Editable => ContentElement::TextInput {
                id,
                class,
                style,
                placeholder: self.options.on_click_placeholder.clone(),
                value: self.content.text.clone(),
            },
        }
    }

    fn unsubscribe(&mut self) {
        if let Some(host) = &self.host {
            for (kind, listener) in self.listeners.drain(..) {
                host.off(kind, listener);
            }
        } else {
            self.listeners.clear();
        }
    }

    fn snapshot(&self) -> CommentSnapshot {
        CommentSnapshot {
            id: self.id.clone(),
            enabled: self.enabled,
            options: self.options.snapshot(),
            content: self.content.clone(),
            position: self.position,
        }
    }
}

pub struct CommentWidgetBuilder {
    options: CommentOptions,
    id: Option<String>,
    store: Option<Rc<dyn KeyValueStore>>,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn Scheduler>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl CommentWidgetBuilder {
    pub fn options(mut self, options: CommentOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a known id instead of generating one. The record stored under it
    /// is restored on the first attach.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> CommentWidget {
        let restore_on_enable = self.id.is_some();
        CommentWidget {
            inner: Rc::new(RefCell::new(Inner {
                options: self.options,
                id: self.id,
                restore_on_enable,
                restored: false,
                enabled: false,
                host: None,
                popup: None,
                content: CommentContent::default(),
                position: None,
                listeners: Vec::new(),
                drop_token: None,
                store: self.store,
                clock: self.clock,
                scheduler: self.scheduler,
                ids: self.ids.unwrap_or_else(global_id_generator),
            })),
        }
    }
}

/// Handle to a comment instance. Clones share the same instance.
#[derive(Clone)]
pub struct CommentWidget {
    inner: Rc<RefCell<Inner>>,
}

impl CommentWidget {
    /// Frames of the drop animation are run on `scheduler`.
    pub fn builder(scheduler: Rc<dyn Scheduler>) -> CommentWidgetBuilder {
        CommentWidgetBuilder {
            options: CommentOptions::default(),
            id: None,
            store: None,
            clock: Rc::new(SystemClock),
            scheduler,
            ids: None,
        }
    }

    pub fn new(options: CommentOptions, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::builder(scheduler).options(options).build()
    }

    fn from_weak(weak: &Weak<RefCell<Inner>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn id(&self) -> Option<String> {
        self.inner.borrow().id.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    pub fn mode(&self) -> ContentMode {
        self.inner.borrow().content.mode
    }

    pub fn position(&self) -> Option<LatLng> {
        self.inner.borrow().position
    }

    pub fn is_attached_to(&self, host: &Rc<dyn MapHost>) -> bool {
        self.inner
            .borrow()
            .host
            .as_ref()
            .is_some_and(|h| same_host(h, host))
    }

    /// Current properties of this instance.
    pub fn properties(&self) -> CommentSnapshot {
        self.inner.borrow().snapshot()
    }

    /// Attach to `host` and enable. No-op while already enabled.
    pub fn attach(&self, host: Rc<dyn MapHost>) -> &Self {
        if self.is_enabled() {
            return self;
        }
        self.inner.borrow_mut().host = Some(host);
        self.enable();
        self
    }

    /// Detach from the current host, if any.
    pub fn detach(&self) -> &Self {
        let host = self.inner.borrow().host.clone();
        if let Some(host) = host {
            self.detach_from(&host);
        }
        self
    }

    /// Detach only if `host` is the one this widget is attached to.
    pub fn detach_from(&self, host: &Rc<dyn MapHost>) -> &Self {
        if self.is_attached_to(host) {
            self.disable();
            self.inner.borrow_mut().host = None;
        }
        self
    }

    fn enable(&self) {
        let restore = {
            let mut inner = self.inner.borrow_mut();
            if inner.id.is_none() {
                let id = format!("{}{}", inner.options.cookie_stamp, inner.ids.next_id());
                inner.id = Some(id);
            }
            std::mem::take(&mut inner.restore_on_enable)
        };
        if restore {
            self.load_from_persistence();
        }

        let mut inner = self.inner.borrow_mut();
        let Some(host) = inner.host.clone() else {
            return;
        };

        if std::mem::take(&mut inner.restored) && inner.content.mode == ContentMode::Editable {
            if let Some(position) = inner.position {
                let element = inner.element(ContentMode::Editable);
                let mut popup = host.create_popup();
                popup.set_content(element, Some(self.input_hook()));
                popup.set_lat_lng(position);
                popup.set_close_on_click(false);
                popup.open();
                inner.popup = Some(popup);
                inner.enabled = true;
                tracing::debug!(id = ?inner.id, %position, "restored comment enabled");
                return;
            }
        }

        let center = host.center();
        inner.content = CommentContent::default();
        inner.position = Some(center);
        let element = inner.element(ContentMode::Placeholder);
        let mut popup = host.create_popup();
        popup.set_content(element, None);
        popup.set_lat_lng(center);
        popup.open();
        inner.popup = Some(popup);

        let weak = Rc::downgrade(&self.inner);
        let on_move = host.on(
            MapEventKind::MouseMove,
            Rc::new(move |event: &MapEvent| {
                if let Some(widget) = Self::from_weak(&weak) {
                    widget.track(event);
                }
            }),
        );
        let weak = Rc::downgrade(&self.inner);
        let on_click = host.on(
            MapEventKind::Click,
            Rc::new(move |event: &MapEvent| {
                if let Some(widget) = Self::from_weak(&weak) {
                    widget.commit(event);
                }
            }),
        );
        inner.listeners = vec![(MapEventKind::MouseMove, on_move), (MapEventKind::Click, on_click)];
        inner.enabled = true;
        tracing::debug!(id = ?inner.id, %center, "comment enabled");
    }

    fn disable(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.enabled {
            return;
        }
        if let Some(token) = inner.drop_token.take() {
            token.cancel();
        }
        inner.unsubscribe();
        if let Some(mut popup) = inner.popup.take() {
            popup.close();
        }
        inner.enabled = false;
        tracing::debug!(id = ?inner.id, "comment disabled");
    }

    fn track(&self, event: &MapEvent) {
        let mut inner = self.inner.borrow_mut();
        if !inner.enabled || inner.content.mode != ContentMode::Placeholder || inner.drop_token.is_some() {
            return;
        }
        inner.position = Some(event.lat_lng);
        if let Some(popup) = inner.popup.as_mut() {
            popup.set_lat_lng(event.lat_lng);
        }
    }

    fn commit(&self, event: &MapEvent) {
        let (drop, scheduler, token) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.enabled || inner.content.mode != ContentMode::Placeholder || inner.drop_token.is_some() {
                return;
            }
            let Some(host) = inner.host.clone() else {
                return;
            };
            event.consume();
            inner.unsubscribe();
            if let Some(popup) = inner.popup.as_mut() {
                popup.set_close_on_click(false);
                popup.open();
            }

            let drop = DropAnimation::from_point(event.container_point, event.lat_lng, |p| {
                host.container_point_to_lat_lng(p)
            });
            let token = CancelToken::new();
            inner.drop_token = Some(token.clone());
            tracing::debug!(
                id = ?inner.id,
                target = %event.lat_lng,
                step = drop.step(),
                "comment committed, dropping"
            );
            (drop, inner.scheduler.clone(), token)
        };

        let weak = Rc::downgrade(&self.inner);
        animation::play(
            drop,
            scheduler,
            token,
            Box::new(move |frame| {
                if let Some(widget) = Self::from_weak(&weak) {
                    widget.on_frame(frame);
                }
            }),
        );
    }

    fn on_frame(&self, frame: Frame) {
        let hook = self.input_hook();
        let mut inner = self.inner.borrow_mut();
        match frame {
            Frame::Move(lat_lng) => {
                inner.position = Some(lat_lng);
                if let Some(popup) = inner.popup.as_mut() {
                    popup.set_lat_lng(lat_lng);
                }
            }
            Frame::Land(lat_lng) => {
                inner.position = Some(lat_lng);
                inner.drop_token = None;
                inner.content.mode = ContentMode::Editable;
                let element = inner.element(ContentMode::Editable);
                if let Some(popup) = inner.popup.as_mut() {
                    popup.set_lat_lng(lat_lng);
                    popup.set_content(element, Some(hook));
                }
                tracing::debug!(id = ?inner.id, position = %lat_lng, "comment landed");
            }
        }
    }

    fn input_hook(&self) -> InputHook {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |text: &str| {
            if let Some(widget) = Self::from_weak(&weak) {
                widget.handle_input(text);
            }
        })
    }

    /// Record new text typed into the editable content: notify the
    /// `on_input` callback, then persist.
    pub fn handle_input(&self, text: &str) {
        let (callback, id, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.enabled || inner.content.mode != ContentMode::Editable {
                return;
            }
            inner.content.text = text.to_string();
            (
                inner.options.on_input.clone(),
                inner.id.clone().unwrap_or_default(),
                inner.snapshot(),
            )
        };
        if let Some(callback) = callback {
            callback(&id, text);
        }
        self.save(snapshot);
    }

    /// Persist `value` under this instance's id for one year. Returns whether
    /// a record was written; every failure is logged and swallowed.
    pub fn save(&self, value: impl Into<PersistValue>) -> bool {
        let (store, clock, id) = {
            let inner = self.inner.borrow();
            if !inner.persistence_active() {
                return false;
            }
            let (Some(store), Some(id)) = (inner.store.clone(), inner.id.clone()) else {
                return false;
            };
            (store, inner.clock.clone(), id)
        };
        match persist::write_record(store.as_ref(), clock.as_ref(), &id, &value.into()) {
            Ok(expiry) => {
                tracing::debug!(id = %id, expires = %expiry.expires, "comment saved");
                true
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "could not save comment");
                false
            }
        }
    }

    /// Delete every persisted record carrying this widget type's key prefix,
    /// for all instances. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let (store, prefix) = {
            let inner = self.inner.borrow();
            match &inner.store {
                Some(store) if store.is_available() => {
                    (store.clone(), inner.options.cookie_stamp.clone())
                }
                _ => return 0,
            }
        };
        persist::clear_records(store.as_ref(), &prefix)
    }

    /// Read this instance's record and, if it is well formed, adopt its text,
    /// mode and position; the next enable shows it. Only valid while
    /// disabled. On any failure the instance is left untouched.
    pub fn load_from_persistence(&self) -> bool {
        let (store, id) = {
            let inner = self.inner.borrow();
            if inner.enabled || !inner.persistence_active() {
                return false;
            }
            let (Some(store), Some(id)) = (inner.store.clone(), inner.id.clone()) else {
                return false;
            };
            (store, id)
        };

        let record = match persist::read_record(store.as_ref(), &id) {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "ignoring unreadable comment record");
                return false;
            }
        };

        let mut inner = self.inner.borrow_mut();
        inner.content = record.content;
        if record.position.is_some() {
            inner.position = record.position;
        }
        inner.restored = true;
        tracing::debug!(id = %id, mode = %inner.content.mode, "comment restored");
        true
    }
}
