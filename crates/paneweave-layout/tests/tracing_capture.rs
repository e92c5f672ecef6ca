//! Structured logging contract: spans and events the engine emits.
//!
//! Covers:
//! (1) every committed mutation runs inside a `layout.sync` span
//! (2) rejected operations log at WARN with the operation name
//! (3) stale hydration is logged at DEBUG and never warns
//! (4) drag/drop and resize gestures log on their own targets
//!
//! Run:
//!   cargo test -p paneweave-layout --test tracing_capture

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use paneweave_core::{DropSide, GestureEnd, GestureId, ListenerGuard, Point, Rect};
use paneweave_layout::{
    ContentState, ContentType, DragCoordinator, DropTarget, HydrationResult, ResizeGesture,
    Workspace,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing Capture Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    level: tracing::Level,
    message: Option<String>,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    span_index: Arc<Mutex<HashMap<u64, usize>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let idx = {
            let mut spans = self.spans.lock().unwrap();
            spans.push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
            spans.len() - 1
        };
        self.span_index.lock().unwrap().insert(id.into_u64(), idx);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        values.record(&mut visitor);
        if let Some(&idx) = self.span_index.lock().unwrap().get(&id.into_u64()) {
            let mut spans = self.spans.lock().unwrap();
            if let Some(span) = spans.get_mut(idx) {
                span.fields.extend(visitor.0);
            }
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            message: fields.get("message").cloned(),
            fields,
            parent_span_name: ctx.event_span(event).map(|span| span.name().to_string()),
        });
    }
}

fn with_capture<F>(f: F) -> (Vec<CapturedSpan>, Vec<CapturedEvent>)
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
        span_index: Arc::new(Mutex::new(HashMap::new())),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let s = spans.lock().unwrap().clone();
    let e = events.lock().unwrap().clone();
    (s, e)
}

fn find<'a>(events: &'a [CapturedEvent], target: &str, message: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|event| event.target == target && event.message.as_deref() == Some(message))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn mutations_run_inside_sync_spans() {
    let (spans, events) = with_capture(|| {
        let mut ws = Workspace::default();
        let a = ws.add_pane(ContentType::Terminal, None).pane_id;
        ws.split(&[], DropSide::Bottom, ContentType::Browser, Some("https://example.com".into()))
            .unwrap();
        ws.close_pane(a.as_str()).unwrap();
    });

    let sync_spans: Vec<&CapturedSpan> = spans.iter().filter(|s| s.name == "layout.sync").collect();
    assert_eq!(sync_spans.len(), 3, "one sync pass per mutation");
    let last = sync_spans[2];
    assert_eq!(last.fields.get("pruned").map(String::as_str), Some("1"));
    assert_eq!(last.fields.get("dropped").map(String::as_str), Some("0"));

    let split = find(&events, "paneweave.layout", "split pane");
    assert_eq!(split.len(), 1);
    assert_eq!(split[0].level, tracing::Level::DEBUG);
    assert_eq!(split[0].fields.get("side").map(String::as_str), Some("bottom"));

    let synced = find(&events, "paneweave.sync", "synchronized layout and registry");
    assert_eq!(synced.len(), 1, "only the close pass changed anything");
    assert_eq!(synced[0].parent_span_name.as_deref(), Some("layout.sync"));
}

#[test]
fn rejected_operations_warn_with_operation_name() {
    let (_, events) = with_capture(|| {
        let mut ws = Workspace::default();
        ws.add_pane(ContentType::Empty, None);
        assert!(ws.split(&[4], DropSide::Left, ContentType::Empty, None).is_err());
        assert!(ws.resize(&[], &[50.0, 50.0]).is_err());
    });

    let warnings: Vec<&CapturedEvent> = events
        .iter()
        .filter(|event| event.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.target == "paneweave.layout"));
    assert_eq!(warnings[0].fields.get("op").map(String::as_str), Some("split"));
    assert_eq!(warnings[1].fields.get("op").map(String::as_str), Some("resize"));
    assert!(warnings[0].fields.contains_key("error"));
}

#[test]
fn stale_hydration_is_debug_only() {
    let (_, events) = with_capture(|| {
        let mut ws = Workspace::default();
        ws.add_pane(ContentType::Terminal, None);
        let spawned = ws.add_pane(ContentType::Editor, Some("/src/main.rs".into()));
        let request = spawned.hydration.unwrap();
        ws.close_pane(spawned.pane_id.as_str()).unwrap();
        ws.apply_hydration(
            &request.ticket,
            HydrationResult::Loaded(ContentState {
                buffer: Some("fn main() {}".into()),
                ..ContentState::default()
            }),
        );
    });

    let stale = find(&events, "paneweave.hydrate", "discarded stale hydration");
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].level, tracing::Level::DEBUG);
    assert_eq!(
        stale[0].fields.get("content_id").map(String::as_str),
        Some("/src/main.rs")
    );
    assert!(find(&events, "paneweave.hydrate", "applied hydration").is_empty());
    assert!(events.iter().all(|event| event.level != tracing::Level::WARN));
}

#[test]
fn gestures_log_on_their_own_targets() {
    let ended = Arc::new(Mutex::new(Vec::new()));
    let (_, events) = with_capture(|| {
        let mut ws = Workspace::default();
        let a = ws.add_pane(ContentType::Terminal, None).pane_id;
        let b = ws.add_pane(ContentType::Terminal, None).pane_id;

        let sink = ended.clone();
        let guard = ListenerGuard::new(GestureId::new(7), move |_, end| {
            sink.lock().unwrap().push(end);
        });
        let mut dnd = DragCoordinator::default();
        dnd.begin_pane_drag(&ws, a.as_str(), guard).unwrap();
        dnd.hover(Some(DropTarget {
            target_path: ws.path_of(b.as_str()).unwrap(),
            side: DropSide::Bottom,
        }));
        assert!(!dnd.drop_on(&mut ws).is_ignored());

        let container = Rect::from_size(800.0, 600.0);
        let gesture = ResizeGesture::begin(
            &ws,
            &[],
            0,
            container,
            Point::new(400.0, 300.0),
            ListenerGuard::detached(GestureId::new(8)),
        )
        .unwrap();
        gesture.cancel();
    });

    assert_eq!(*ended.lock().unwrap(), vec![GestureEnd::Committed]);
    assert_eq!(find(&events, "paneweave.dnd", "pane drag started").len(), 1);
    assert_eq!(find(&events, "paneweave.dnd", "drop resolved").len(), 1);
    assert_eq!(find(&events, "paneweave.resize", "resize gesture started").len(), 1);
    assert_eq!(find(&events, "paneweave.resize", "resize gesture cancelled").len(), 1);
    assert!(
        events
            .iter()
            .any(|event| event.target == "paneweave.gesture"
                && event.level == tracing::Level::TRACE),
        "listener guard lifecycle is traced"
    );
}
