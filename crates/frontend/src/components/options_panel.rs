use dioxus::prelude::*;
use map_comment_shared::CommentOptions;

/// Options applied to the next comment dropped on the board.
#[component]
pub fn OptionsPanel(options: Signal<CommentOptions>) -> Element {
    let current = options.read().clone();

    rsx! {
        div { class: "panel",
            h3 { "New comment" }
            div { class: "field-row",
                label { "Background" }
                input {
                    r#type: "text",
                    value: "{current.background_color}",
                    oninput: move |evt: Event<FormData>| {
                        options.write().background_color = evt.value();
                    },
                }
            }
            div { class: "field-row",
                label { "Text colour" }
                input {
                    r#type: "text",
                    value: "{current.text_color}",
                    oninput: move |evt: Event<FormData>| {
                        options.write().text_color = evt.value();
                    },
                }
            }
            div { class: "field-row",
                label { "Prompt" }
                input {
                    r#type: "text",
                    value: "{current.on_drag_message}",
                    oninput: move |evt: Event<FormData>| {
                        options.write().on_drag_message = evt.value();
                    },
                }
            }
            div { class: "field-row",
                label { "Placeholder" }
                input {
                    r#type: "text",
                    value: "{current.on_click_placeholder}",
                    oninput: move |evt: Event<FormData>| {
                        options.write().on_click_placeholder = evt.value();
                    },
                }
            }
            div { class: "field-row",
                label { "Cookie prefix" }
                input {
                    r#type: "text",
                    value: "{current.cookie_stamp}",
                    oninput: move |evt: Event<FormData>| {
                        options.write().cookie_stamp = evt.value();
                    },
                }
            }
            label { class: "checkbox-row",
                input {
                    r#type: "checkbox",
                    checked: current.use_cookies,
                    onchange: move |evt: Event<FormData>| {
                        options.write().use_cookies = evt.checked();
                    },
                }
                "Save in cookies"
            }
        }
    }
}
