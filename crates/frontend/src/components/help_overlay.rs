use dioxus::prelude::*;

#[component]
pub fn HelpOverlay(show: Signal<bool>) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                h3 { class: "help-section-title", "How comments work" }

                div { class: "help-info-section",
                    h3 { "Placing" }
                    p { "A new comment follows the pointer with a prompt. Click anywhere on the map to drop it; it falls the last few pixels into place and turns into a text box." }
                }

                div { class: "help-info-section",
                    h3 { "Saving" }
                    p { "With \"Save in cookies\" ticked, every keystroke is stored in a cookie named after the comment id, kept for a year. Open " code { "/comment/<id>" } " to bring a saved comment back." }
                }

                div { class: "help-info-section",
                    h3 { "Clearing" }
                    p { "\"Clear saved\" removes every cookie whose name contains the current cookie prefix. Comments on the map stay until removed." }
                }

                div { class: "help-info-section",
                    h3 { "Map Interactions" }
                    p { "Drag to pan, scroll to zoom. Clicks inside a comment's text box do not reach the map." }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
