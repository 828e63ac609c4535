//! Snapshot fixtures shared by the unit tests.

use crate::{NodeKind, NodeRecord};

/// A folder record with a readable id in workspace `"ws"`.
pub fn folder(id: &str, parent: Option<&str>, order: f64) -> NodeRecord {
    record(id, parent, order, NodeKind::Folder)
}

/// A file record with a readable id in workspace `"ws"`.
pub fn file(id: &str, parent: Option<&str>, order: f64) -> NodeRecord {
    record(id, parent, order, NodeKind::File)
}

pub fn record(id: &str, parent: Option<&str>, order: f64, kind: NodeKind) -> NodeRecord {
    let mut node = NodeRecord::new("ws", parent, kind, id, order);
    node.id = id.to_string();
    node
}

/// `r` with children `a` (1) and `b` (2); `a` holds `a1` (1) and `a2` (2).
pub fn sample() -> Vec<NodeRecord> {
    vec![
        folder("r", None, 1.0),
        folder("a", Some("r"), 1.0),
        file("b", Some("r"), 2.0),
        file("a1", Some("a"), 1.0),
        file("a2", Some("a"), 2.0),
    ]
}

/// `x -> y -> z -> x`, plus an innocent root `r`.
pub fn cyclic() -> Vec<NodeRecord> {
    vec![
        folder("r", None, 1.0),
        folder("x", Some("z"), 1.0),
        folder("y", Some("x"), 1.0),
        folder("z", Some("y"), 1.0),
    ]
}

pub fn ids(nodes: &[&NodeRecord]) -> Vec<String> {
    nodes.iter().map(|n| n.id.clone()).collect()
}

thread_local! {
    static CAPTURED: std::cell::RefCell<Vec<(log::Level, String)>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = record.args().to_string();
        CAPTURED.with(|c| c.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

/// Runs `f` and returns the records it logged on this thread.
pub fn capture_logs(f: impl FnOnce()) -> Vec<(log::Level, String)> {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        if log::set_logger(&CaptureLogger).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|c| c.borrow_mut().clear());
    f();
    CAPTURED.with(|c| std::mem::take(&mut *c.borrow_mut()))
}
