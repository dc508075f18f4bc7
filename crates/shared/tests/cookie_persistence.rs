use std::rc::Rc;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use map_comment_shared::animation::{DROP_FRAMES, FRAME_INTERVAL};
use map_comment_shared::clock::{Clock, ManualClock};
use map_comment_shared::cookie::{CookieStore, MemoryCookieJar};
use map_comment_shared::geo::Viewport;
use map_comment_shared::ids::CounterIds;
use map_comment_shared::persist;
use map_comment_shared::scheduler::ManualScheduler;
use map_comment_shared::store::KeyValueStore;
use map_comment_shared::testing::FakeHost;
use map_comment_shared::{CommentOptions, CommentWidget, ContentMode, LatLng, MapHost, Point};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct World {
    host: Rc<FakeHost>,
    sched: Rc<ManualScheduler>,
    clock: Rc<ManualClock>,
    store: Rc<CookieStore<MemoryCookieJar>>,
    ids: Arc<CounterIds>,
}

impl World {
    fn new() -> Self {
        init_tracing();
        let clock = Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 9, 5, 3).unwrap()));
        Self {
            host: FakeHost::new(Viewport::new(LatLng::new(20.0, 10.0), 0.375, 800.0, 600.0)),
            sched: Rc::new(ManualScheduler::new()),
            store: Rc::new(CookieStore::new(MemoryCookieJar::new(clock.clone()))),
            clock,
            ids: Arc::new(CounterIds::new()),
        }
    }

    fn widget(&self, options: CommentOptions) -> CommentWidget {
        CommentWidget::builder(self.sched.clone())
            .options(options)
            .store(self.store.clone())
            .clock(self.clock.clone())
            .ids(self.ids.clone())
            .build()
    }

    fn host(&self) -> Rc<dyn MapHost> {
        self.host.clone()
    }
}

#[test]
fn test_typed_text_lands_in_a_cookie() {
    let world = World::new();
    let widget = world.widget(CommentOptions::default());
    widget.attach(world.host());

    assert!(world.host.click(Point::new(400.0, 300.0)));
    world.sched.advance(FRAME_INTERVAL * DROP_FRAMES);
    assert_eq!(widget.mode(), ContentMode::Editable);
    assert_eq!(widget.position(), Some(LatLng::new(20.0, 10.0)));

    assert!(world.host.type_text("50% off; today only"));

    let writes = world.store.jar().writes();
    assert_eq!(writes.len(), 1);
    let write = &writes[0];
    assert!(write.starts_with("L-Comment-1=%7B"));
    assert!(write.ends_with("; expires=Thu, 15 Jan 2026 09:05:03 GMT; path=/"));

    let record = persist::read_record(world.store.as_ref(), "L-Comment-1")
        .unwrap()
        .unwrap();
    assert_eq!(record.content.text, "50% off; today only");
}

#[test]
fn test_every_keystroke_rewrites_the_same_cookie() {
    let world = World::new();
    let widget = world.widget(CommentOptions::default());
    widget.attach(world.host());
    world.host.click(Point::new(400.0, 300.0));
    world.sched.run_until_idle();

    for text in ["h", "he", "hey"] {
        world.host.type_text(text);
    }
    assert_eq!(world.store.jar().writes().len(), 3);
    assert_eq!(world.store.keys().unwrap(), vec!["L-Comment-1".to_string()]);
}

#[test]
fn test_clear_all_expires_only_prefixed_cookies() {
    let world = World::new();
    let a = world.widget(CommentOptions::default());
    let b = world.widget(CommentOptions::default());
    a.attach(world.host());
    b.attach(world.host());
    assert!(a.save("first"));
    assert!(b.save("second"));
    world
        .store
        .set(
            "session",
            "abc",
            &map_comment_shared::store::Expiry::one_year_from(world.clock.now()),
        )
        .unwrap();

    assert_eq!(a.clear_all(), 2);
    assert_eq!(world.store.keys().unwrap(), vec!["session".to_string()]);
    let deletions = world
        .store
        .jar()
        .writes()
        .into_iter()
        .filter(|w| w.contains("expires=Thu, 01 Jan 1970 00:00:00 GMT"))
        .count();
    assert_eq!(deletions, 2);
}

#[test]
fn test_custom_stamp_namespaces_records() {
    let world = World::new();
    let pins = world.widget(CommentOptions {
        cookie_stamp: "pin-".into(),
        ..Default::default()
    });
    let notes = world.widget(CommentOptions::default());
    pins.attach(world.host());
    notes.attach(world.host());
    pins.save("p");
    notes.save("n");

    assert_eq!(pins.id().as_deref(), Some("pin-1"));
    assert_eq!(pins.clear_all(), 1);
    assert_eq!(world.store.keys().unwrap(), vec!["L-Comment-2".to_string()]);
}
