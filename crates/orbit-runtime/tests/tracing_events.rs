#![forbid(unsafe_code)]

//! Log-level policy: swallowed failures and timeouts warn, lifecycle
//! transitions log at debug, and nothing escapes to the caller.
//!
//! Run:
//!   cargo test -p orbit-runtime --test tracing_events

use std::sync::{Arc, Mutex};

use orbit_core::options::Options;
use orbit_core::step::{RoutePattern, Step};
use orbit_runtime::host::StorageError;
use orbit_web::HeadlessHost;
use tracing_subscriber::layer::SubscriberExt;
use web_time::Duration;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.0,
        });
    }
}

fn with_captured<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    (result, captured)
}

fn warnings(events: &[CapturedEvent]) -> Vec<&CapturedEvent> {
    events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect()
}

#[test]
fn storage_write_failure_warns_and_tour_continues() {
    let env = HeadlessHost::new(800.0, 600.0, "/");
    env.storage.fail_writes(Some(StorageError::QuotaExceeded));

    let (index, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x"), Step::new("b", "y")], Options::default());
        tour.mount();
        tour.start(None);
        tour.next();
        tour.current_index()
    });

    assert_eq!(index, Some(1));
    let warns = warnings(&events);
    assert_eq!(warns.len(), 2);
    assert!(warns.iter().all(|e| e.target == "orbit.store"));
    assert_eq!(warns[0].field("error"), Some("storage quota exceeded"));
    assert_eq!(warns[0].field("key"), Some("ctrlcan:orbit:v1"));
}

#[test]
fn unreadable_storage_warns_and_starts_fresh() {
    let env = HeadlessHost::new(800.0, 600.0, "/");
    env.storage.fail_reads(Some(StorageError::Unavailable));

    let (active, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x")], Options::default());
        tour.mount();
        tour.is_active()
    });

    assert!(!active);
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert_eq!(warns[0].message.as_deref(), Some("failed to read tour state"));
}

#[test]
fn corrupt_state_warns_once() {
    let env = HeadlessHost::new(800.0, 600.0, "/");
    env.storage.insert("ctrlcan:orbit:v1", "{\"active\": tru");

    let (_, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x")], Options::default());
        tour.mount();
    });

    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert!(
        warns[0]
            .field("error")
            .is_some_and(|e| e.starts_with("failed to decode tour state"))
    );
}

#[test]
fn route_timeout_warns_with_ceiling() {
    let env = HeadlessHost::new(800.0, 600.0, "/");
    let route = RoutePattern::pattern("^/nowhere$").unwrap();

    let (shown, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x").route(route)], Options::default());
        tour.mount();
        tour.start(None);
        env.advance(&mut tour, Duration::from_secs(5));
        tour.is_shown()
    });

    assert!(shown);
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert_eq!(warns[0].target, "orbit.runtime");
    assert_eq!(warns[0].field("ceiling_ms"), Some("4000"));
    assert_eq!(warns[0].field("path"), Some("/"));
}

#[test]
fn lifecycle_transitions_log_at_debug() {
    let env = HeadlessHost::new(800.0, 600.0, "/");

    let (_, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x")], Options::default());
        tour.mount();
        tour.start(None);
        tour.next();
    });

    let runtime: Vec<&str> = events
        .iter()
        .filter(|e| e.target == "orbit.runtime" && e.level == tracing::Level::DEBUG)
        .filter_map(|e| e.message.as_deref())
        .collect();
    assert_eq!(runtime, vec!["step activated", "step shown", "tour finished"]);
    assert!(warnings(&events).is_empty());
}

#[test]
fn unknown_step_id_warns() {
    let env = HeadlessHost::new(800.0, 600.0, "/");

    let (active, events) = with_captured(|| {
        let mut tour = env.tour(vec![Step::new("a", "x")], Options::default());
        tour.mount();
        tour.start(Some("nope"));
        tour.is_active()
    });

    assert!(!active);
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert_eq!(warns[0].field("id"), Some("nope"));
}
