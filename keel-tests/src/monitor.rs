use keel_core::{BoundParameter, QueryMonitor};
use std::cell::RefCell;

/// Monitor keeping the sequence of calls it received.
#[derive(Default, Debug)]
pub struct RecordingMonitor {
    events: RefCell<Vec<String>>,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `start <sql>` and `stop` entries, in call order.
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn starts(&self) -> usize {
        self.events.borrow().iter().filter(|v| v.starts_with("start")).count()
    }

    pub fn stops(&self) -> usize {
        self.events.borrow().iter().filter(|v| *v == "stop").count()
    }
}

impl QueryMonitor for RecordingMonitor {
    fn start_query(&self, sql: &str, _bound: &[BoundParameter]) {
        self.events.borrow_mut().push(format!("start {sql}"));
    }

    fn stop_query(&self) {
        self.events.borrow_mut().push("stop".into());
    }
}
