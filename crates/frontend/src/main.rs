mod components;
mod cookies;
mod coords;
mod host;
mod pages;
mod timers;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/comment/:id")]
    CommentView { id: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::board::Board { comment_id: None::<String> }
    }
}

#[component]
fn CommentView(id: String) -> Element {
    rsx! {
        pages::board::Board { comment_id: Some(id) }
    }
}

const CSS: Asset = asset!("/assets/main.css");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    let store = map_comment_shared::cookie::CookieStore::new(cookies::DocumentCookieJar);
    cookies::init_ids_after_saved(&store);
    launch(App);
}
