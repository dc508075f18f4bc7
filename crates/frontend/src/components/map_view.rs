use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use map_comment_shared::geo::{self, LatLng, Viewport};
use map_comment_shared::host::MapEventKind;
use map_comment_shared::models::ContentElement;

use crate::coords;
use crate::host::{HostHandle, PopupView};

const MAP_CONTAINER_ID: &str = "comment-map-container";

/// Movement in pixels below which a press and release count as a click.
const DRAG_THRESHOLD: f64 = 3.0;

const ZOOM_STEP: f64 = 0.25;

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

fn next_zoom(zoom: f64, delta_y: f64) -> f64 {
    let z = if delta_y < 0.0 { zoom + ZOOM_STEP } else { zoom - ZOOM_STEP };
    z.clamp(geo::MIN_ZOOM, geo::MAX_ZOOM)
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

/// Latitude/longitude lines over the visible part of `view`, as SVG markup in
/// container pixel space.
fn build_graticule(view: &Viewport) -> String {
    let mut svg = String::with_capacity(2048);
    let (sw, ne) = coords::visible_bounds(view);
    let step = coords::graticule_step((ne.lng - sw.lng).max(ne.lat - sw.lat));

    for lng in coords::graticule_values(sw.lng, ne.lng, step) {
        let x = view.lat_lng_to_container_point(LatLng::new(view.center.lat, lng)).x;
        let stroke = if lng == 0.0 { "rgba(0,0,0,0.35)" } else { "rgba(0,0,0,0.12)" };
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="0" x2="{x}" y2="{}" stroke="{stroke}" stroke-width="1"/>"#,
            view.height
        ));
    }
    for lat in coords::graticule_values(sw.lat.max(-90.0), ne.lat.min(90.0), step) {
        let y = view.lat_lng_to_container_point(LatLng::new(lat, view.center.lng)).y;
        let stroke = if lat == 0.0 { "rgba(0,0,0,0.35)" } else { "rgba(0,0,0,0.12)" };
        svg.push_str(&format!(
            r#"<line x1="0" y1="{y}" x2="{}" y2="{y}" stroke="{stroke}" stroke-width="1"/>"#,
            view.width
        ));
    }
    svg
}

#[component]
pub fn MapView(
    host: HostHandle,
    viewport: Signal<Viewport>,
    popups: Signal<Vec<PopupView>>,
    zoom: Signal<f64>,
) -> Element {
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| LatLng::new(0.0, 0.0));
    let mut pointer = use_signal(|| None::<LatLng>);

    // Pick up the real container size once it is in the DOM.
    use_effect(move || {
        if let Some(rect) = coords::container_rect(MAP_CONTAINER_ID) {
            viewport.write().resize(rect.width(), rect.height());
        }
    });

    let view = *viewport.read();
    let graticule = build_graticule(&view);
    let svg_html = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" style="position:absolute;top:0;left:0;pointer-events:none;">{graticule}</svg>"#,
        w = view.width,
        h = view.height,
    );

    let visible: Vec<(u64, f64, f64, ContentElement)> = popups
        .read()
        .iter()
        .filter(|p| p.open)
        .filter_map(|p| {
            let pt = view.lat_lng_to_container_point(p.lat_lng);
            p.content.clone().map(|c| (p.key, pt.x, pt.y, c))
        })
        .collect();

    let readout = match *pointer.read() {
        Some(ll) => coords::format_lat_lng(ll),
        None => coords::format_lat_lng(view.center),
    };
    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    let move_host = host.clone();
    let up_host = host.clone();

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let z = next_zoom(*zoom.read(), wheel_delta_y(evt.data().delta()));
                zoom.set(z);
                viewport.write().degrees_per_px = geo::degrees_per_px(z);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(viewport.read().center);
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                let Some((point, w, h)) =
                    coords::client_to_container_point(client.x, client.y, MAP_CONTAINER_ID)
                else {
                    return;
                };
                if (viewport.read().width, viewport.read().height) != (w, h) {
                    viewport.write().resize(w, h);
                }

                if *is_dragging.read() {
                    let (sx, sy) = *drag_start.read();
                    let (dx, dy) = (client.x - sx, client.y - sy);
                    if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                        did_drag.set(true);
                    }
                    if *did_drag.read() {
                        let mut v = viewport.write();
                        v.center = *drag_start_center.read();
                        v.pan_by(dx, dy);
                        return;
                    }
                }

                pointer.set(Some(viewport.read().container_point_to_lat_lng(point)));
                move_host.0.dispatch_at(MapEventKind::MouseMove, point);
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement = a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    if let Some((point, _, _)) =
                        coords::client_to_container_point(client.x, client.y, MAP_CONTAINER_ID)
                    {
                        if up_host.0.dispatch_at(MapEventKind::Click, point) {
                            evt.prevent_default();
                            evt.stop_propagation();
                        }
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
                pointer.set(None);
            },

            div {
                dangerous_inner_html: "{svg_html}",
                style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
            }

            for (key, x, y, content) in visible {
                div {
                    key: "{key}",
                    class: "map-popup",
                    style: "left: {x}px; top: {y}px;",
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                    {match content {
                        ContentElement::Prompt { id, class, style, message } => rsx! {
                            div { id: "{id}", class: "{class}", style: "{style}", "{message}" }
                        },
                        ContentElement::TextInput { id, class, style, placeholder, value } => rsx! {
                            textarea {
                                id: "{id}",
                                class: "{class}",
                                style: "{style}",
                                placeholder: "{placeholder}",
                                value: "{value}",
                                oninput: {
                                    let host = host.clone();
                                    move |evt: Event<FormData>| host.0.input(key, &evt.value())
                                },
                            }
                        },
                    }}
                    div { class: "map-popup-tip" }
                }
            }

            div { class: "coord-readout",
                span { class: "coord-tag", "{readout}" }
            }
        }
    }
}
