use dioxus::prelude::*;
use map_comment_shared::models::{CommentSnapshot, ContentMode};

use crate::coords;

fn summary(snapshot: &CommentSnapshot) -> String {
    match snapshot.content.mode {
        ContentMode::Placeholder => "(not dropped yet)".to_string(),
        ContentMode::Editable if snapshot.content.text.is_empty() => "(empty)".to_string(),
        ContentMode::Editable => snapshot.content.text.clone(),
    }
}

#[component]
pub fn CommentList(snapshots: Vec<CommentSnapshot>) -> Element {
    rsx! {
        div { class: "panel",
            h3 { "Comments" }
            if snapshots.is_empty() {
                div { class: "placeholder-text", "No comments on the map" }
            }
            for snap in snapshots {
                div { class: "comment-row",
                    key: "{snap.id.clone().unwrap_or_default()}",
                    div { class: "comment-head",
                        span {
                            class: "swatch",
                            style: "background-color: {snap.options.background_color};",
                        }
                        if let Some(id) = snap.id.clone() {
                            Link { class: "comment-id", to: format!("/comment/{id}"), "{id}" }
                        }
                    }
                    div { class: "comment-text", "{summary(&snap)}" }
                    if let Some(pos) = snap.position {
                        div { class: "comment-pos", "{coords::format_lat_lng(pos)}" }
                    }
                }
            }
        }
    }
}
