//! A comment marker for maps: follows the pointer, drops onto the clicked
//! spot, turns into a text box and optionally remembers what was typed.

pub mod animation;
pub mod clock;
pub mod cookie;
pub mod geo;
pub mod host;
pub mod ids;
pub mod models;
pub mod options;
pub mod persist;
pub mod scheduler;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod widget;

pub use geo::{LatLng, Point};
pub use host::{MapEvent, MapEventKind, MapHost, Popup};
pub use models::{CommentSnapshot, ContentElement, ContentMode};
pub use options::CommentOptions;
pub use widget::{CommentWidget, CommentWidgetBuilder};
