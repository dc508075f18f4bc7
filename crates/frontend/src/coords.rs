use map_comment_shared::geo::{LatLng, Point, Viewport};

/// Candidate graticule spacings in degrees, coarsest first.
const GRATICULE_STEPS: [f64; 10] = [30.0, 15.0, 10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05];

/// Aim for at most this many graticule lines across the wider axis.
const MAX_GRATICULE_LINES: f64 = 12.0;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) -> Point {
    Point::new(client_x - rect_left, client_y - rect_top)
}

/// Bounding rect of the element with `id`.
pub fn container_rect(id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect())
}

/// Container-relative point for a client position, plus the container size.
pub fn client_to_container_point(
    client_x: f64,
    client_y: f64,
    container_id: &str,
) -> Option<(Point, f64, f64)> {
    let rect = container_rect(container_id)?;
    Some((
        client_to_container(client_x, client_y, rect.left(), rect.top()),
        rect.width(),
        rect.height(),
    ))
}

/// Largest step that keeps the graticule within `MAX_GRATICULE_LINES` lines
/// over a `span` of degrees.
pub fn graticule_step(span: f64) -> f64 {
    GRATICULE_STEPS
        .iter()
        .rev()
        .copied()
        .find(|step| span / step <= MAX_GRATICULE_LINES)
        .unwrap_or(GRATICULE_STEPS[0])
}

/// Multiples of `step` in `[lo, hi]`.
pub fn graticule_values(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || hi < lo {
        return Vec::new();
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Visible lat/lng bounds as `(south_west, north_east)`.
pub fn visible_bounds(view: &Viewport) -> (LatLng, LatLng) {
    let sw = view.container_point_to_lat_lng(Point::new(0.0, view.height));
    let ne = view.container_point_to_lat_lng(Point::new(view.width, 0.0));
    (sw, ne)
}

/// Human readable coordinate, e.g. `20.00000° N, 10.00000° E`.
pub fn format_lat_lng(ll: LatLng) -> String {
    let ns = if ll.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if ll.lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.5}° {ns}, {:.5}° {ew}", ll.lat.abs(), ll.lng.abs())
}
