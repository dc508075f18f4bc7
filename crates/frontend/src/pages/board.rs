use std::rc::Rc;

use dioxus::prelude::*;
use map_comment_shared::cookie::CookieStore;
use map_comment_shared::geo::{LatLng, Viewport};
use map_comment_shared::persist;
use map_comment_shared::store::KeyValueStore;
use map_comment_shared::{CommentOptions, CommentWidget, ContentMode, MapHost};

use crate::components::comment_list::CommentList;
use crate::components::help_overlay::HelpOverlay;
use crate::components::map_view::MapView;
use crate::components::options_panel::OptionsPanel;
use crate::cookies::DocumentCookieJar;
use crate::host::{HostHandle, PopupView, SurfaceHost};
use crate::timers::TimeoutScheduler;

const INITIAL_CENTER: LatLng = LatLng::new(20.0, 10.0);
const INITIAL_ZOOM: f64 = 3.0;

/// Last input event reported by a comment: (element id, text).
type InputEvent = Option<(String, String)>;

fn build_comment(
    store: &Rc<dyn KeyValueStore>,
    options: CommentOptions,
    id: Option<String>,
    last_input: Signal<InputEvent>,
) -> CommentWidget {
    let options = options.with_on_input(move |id, text| {
        let mut last_input = last_input;
        last_input.set(Some((id.to_string(), text.to_string())));
    });
    let mut builder = CommentWidget::builder(Rc::new(TimeoutScheduler))
        .options(options)
        .store(store.clone());
    if let Some(id) = id {
        builder = builder.id(id);
    }
    builder.build()
}

fn attach_to(widget: &CommentWidget, host: &HostHandle) {
    let host: Rc<dyn MapHost> = host.0.clone();
    widget.attach(host);
}

/// Result of bringing a saved comment back onto the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restore {
    /// A comment with this id is already on the board; nothing was created.
    AlreadyOpen,
    Restored,
    /// No usable record: a fresh comment was started under the id.
    NothingSaved,
}

impl Restore {
    fn message(self, id: &str) -> String {
        match self {
            Restore::AlreadyOpen => format!("{id} is already on the map"),
            Restore::Restored => format!("Restored {id}"),
            Restore::NothingSaved => format!("Nothing saved under {id}"),
        }
    }
}

/// Restore `id` onto `host` unless a live comment already holds it. Two
/// instances under one id would overwrite each other's record.
fn restore_into(
    comments: &mut Vec<CommentWidget>,
    host: Rc<dyn MapHost>,
    id: &str,
    build: impl FnOnce(String) -> CommentWidget,
) -> Restore {
    if comments.iter().any(|w| w.id().as_deref() == Some(id)) {
        return Restore::AlreadyOpen;
    }
    let widget = build(id.to_string());
    widget.attach(host);
    // Only a stored record brings a comment up editable right away.
    let outcome = if widget.mode() == ContentMode::Editable {
        Restore::Restored
    } else {
        Restore::NothingSaved
    };
    comments.push(widget);
    outcome
}

#[component]
pub fn Board(comment_id: ReadSignal<Option<String>>) -> Element {
    let viewport = use_signal(|| Viewport::at_zoom(INITIAL_CENTER, INITIAL_ZOOM, 800.0, 600.0));
    let popups = use_signal(Vec::<PopupView>::new);
    let zoom = use_signal(|| INITIAL_ZOOM);
    let options = use_signal(CommentOptions::default);
    let mut comments = use_signal(Vec::<CommentWidget>::new);
    let last_input = use_signal(|| None::<(String, String)>);
    let mut restore_id = use_signal(String::new);
    let mut status = use_signal(|| None::<String>);
    let mut show_help = use_signal(|| false);

    let host = use_hook(|| HostHandle(Rc::new(SurfaceHost::new(viewport, popups))));
    let store = use_hook(|| Rc::new(CookieStore::new(DocumentCookieJar)) as Rc<dyn KeyValueStore>);

    // Restore the comment named in the URL, again whenever the route id changes.
    {
        let host = host.clone();
        let store = store.clone();
        use_effect(move || {
            let Some(id) = comment_id.read().clone() else {
                return;
            };
            let outcome = restore_into(&mut comments.write(), host.0.clone(), &id, |id| {
                build_comment(&store, options.peek().clone(), Some(id), last_input)
            });
            tracing::info!(%id, ?outcome, "restore from url");
            status.set(Some(outcome.message(&id)));
        });
    }

    // Re-render the sidebar whenever a popup changes.
    let open_count = popups.read().iter().filter(|p| p.open).count();
    let snapshots: Vec<_> = comments.read().iter().map(CommentWidget::properties).collect();
    let input_line = match &*last_input.read() {
        Some((id, text)) => format!("{id}: {text}"),
        None => "nothing typed yet".to_string(),
    };

    let add_host = host.clone();
    let add_store = store.clone();
    let restore_host = host.clone();
    let restore_store = store.clone();
    let clear_store = store.clone();

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Map Comments" }
                span { class: "header-count", "{open_count} open" }
                button {
                    class: "help-button secondary",
                    onclick: move |_| show_help.set(true),
                    "?"
                }
            }

            div { class: "sidebar",
                OptionsPanel { options: options }

                div { class: "panel",
                    h3 { "Actions" }
                    div { class: "button-row",
                        button {
                            onclick: move |_| {
                                let widget = build_comment(&add_store, options.read().clone(), None, last_input);
                                attach_to(&widget, &add_host);
                                comments.write().push(widget);
                            },
                            "Add comment"
                        }
                        button {
                            class: "secondary",
                            disabled: comments.read().is_empty(),
                            onclick: move |_| {
                                if let Some(widget) = comments.write().pop() {
                                    widget.detach();
                                }
                            },
                            "Remove last"
                        }
                    }
                    div { class: "button-row",
                        button {
                            class: "danger",
                            onclick: move |_| {
                                let stamp = options.read().cookie_stamp.clone();
                                let removed = persist::clear_records(clear_store.as_ref(), &stamp);
                                status.set(Some(format!("Removed {removed} saved comment(s)")));
                            },
                            "Clear saved"
                        }
                    }
                    div { class: "restore-row",
                        input {
                            r#type: "text",
                            placeholder: "Comment id...",
                            value: "{restore_id}",
                            oninput: move |evt: Event<FormData>| restore_id.set(evt.value()),
                        }
                        button {
                            class: "secondary",
                            disabled: restore_id.read().trim().is_empty(),
                            onclick: move |_| {
                                let id = restore_id.read().trim().to_string();
                                let opts = options.read().clone();
                                let outcome = restore_into(&mut comments.write(), restore_host.0.clone(), &id, |id| {
                                    build_comment(&restore_store, opts, Some(id), last_input)
                                });
                                status.set(Some(outcome.message(&id)));
                                restore_id.set(String::new());
                            },
                            "Restore"
                        }
                    }
                    if let Some(message) = &*status.read() {
                        div { class: "status-line", "{message}" }
                    }
                }

                div { class: "panel",
                    h3 { "Last input" }
                    div { class: "input-line", "{input_line}" }
                }

                CommentList { snapshots: snapshots }
            }

            MapView {
                host: host.clone(),
                viewport: viewport,
                popups: popups,
                zoom: zoom,
            }

            HelpOverlay { show: show_help }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use map_comment_shared::clock::ManualClock;
    use map_comment_shared::scheduler::ManualScheduler;
    use map_comment_shared::store::MemoryStore;
    use map_comment_shared::testing::FakeHost;
    use serde_json::json;

    struct World {
        host: Rc<dyn MapHost>,
        clock: Rc<ManualClock>,
        store: Rc<MemoryStore>,
    }

    fn world() -> World {
        let clock = Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()));
        let host: Rc<dyn MapHost> =
            FakeHost::new(Viewport::new(LatLng::new(20.0, 10.0), 0.375, 800.0, 600.0));
        World {
            host,
            store: Rc::new(MemoryStore::new(clock.clone())),
            clock,
        }
    }

    fn widget(world: &World, id: String) -> CommentWidget {
        CommentWidget::builder(Rc::new(ManualScheduler::new()))
            .store(world.store.clone())
            .clock(world.clock.clone())
            .id(id)
            .build()
    }

    #[test]
    fn test_restore_saved_comment() {
        let w = world();
        let record = json!({
            "content": { "mode": "editable", "text": "bakery" },
            "position": { "lat": 21.0, "lng": 11.0 },
        });
        persist::write_record(w.store.as_ref(), w.clock.as_ref(), "L-Comment-3", &record.into()).unwrap();

        let mut comments = Vec::new();
        let outcome = restore_into(&mut comments, w.host.clone(), "L-Comment-3", |id| widget(&w, id));
        assert_eq!(outcome, Restore::Restored);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].properties().content.text, "bakery");
    }

    #[test]
    fn test_restore_missing_id_reports_nothing_saved() {
        let w = world();
        let mut comments = Vec::new();
        let outcome = restore_into(&mut comments, w.host.clone(), "L-Comment-404", |id| widget(&w, id));
        assert_eq!(outcome, Restore::NothingSaved);
        assert_eq!(outcome.message("L-Comment-404"), "Nothing saved under L-Comment-404");
        // The host centre is set even without a record.
        assert!(comments[0].position().is_some());
        assert_eq!(comments[0].mode(), ContentMode::Placeholder);
    }

    #[test]
    fn test_restore_live_id_is_refused() {
        let w = world();
        let mut comments = Vec::new();
        restore_into(&mut comments, w.host.clone(), "L-Comment-5", |id| widget(&w, id));

        let mut built = false;
        let outcome = restore_into(&mut comments, w.host.clone(), "L-Comment-5", |id| {
            built = true;
            widget(&w, id)
        });
        assert_eq!(outcome, Restore::AlreadyOpen);
        assert!(!built);
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn test_clear_saved_uses_stamp_only() {
        let w = world();
        let expiry = map_comment_shared::store::Expiry::one_year_from(Utc::now());
        for key in ["pin-1", "pin-2", "L-Comment-1"] {
            w.store.set(key, "x", &expiry).unwrap();
        }
        assert_eq!(persist::clear_records(w.store.as_ref(), "pin-"), 2);
        assert_eq!(w.store.keys().unwrap(), vec!["L-Comment-1".to_string()]);
    }
}
