use crate::{BoundParameter, truncate_long};
use std::{
    cell::{Cell, RefCell},
    time::{Duration, Instant},
};

/// Observer notified around every statement a driver executes.
///
/// `start_query` runs right before the statement is sent and `stop_query`
/// right after it returns, also when it fails.
pub trait QueryMonitor {
    fn start_query(&self, sql: &str, bound: &[BoundParameter]);
    fn stop_query(&self);
}

/// One statement observed by a [`DebugMonitor`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredQuery {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
    /// `None` while the statement is running.
    pub elapsed: Option<Duration>,
}

/// Keeps every observed statement in memory, with its timing.
#[derive(Default, Debug)]
pub struct DebugMonitor {
    queries: RefCell<Vec<MonitoredQuery>>,
    started: Cell<Option<Instant>>,
}

impl DebugMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<MonitoredQuery> {
        self.queries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.borrow().is_empty()
    }

    pub fn total_time(&self) -> Duration {
        self.queries.borrow().iter().filter_map(|v| v.elapsed).sum()
    }
}

impl QueryMonitor for DebugMonitor {
    fn start_query(&self, sql: &str, bound: &[BoundParameter]) {
        self.queries.borrow_mut().push(MonitoredQuery {
            sql: sql.to_owned(),
            parameters: bound.to_vec(),
            elapsed: None,
        });
        self.started.set(Some(Instant::now()));
    }

    fn stop_query(&self) {
        let Some(started) = self.started.take() else {
            return;
        };
        if let Some(query) = self.queries.borrow_mut().last_mut() {
            query.elapsed = Some(started.elapsed());
        }
    }
}

/// Writes every statement to the `log` facade.
#[derive(Debug)]
pub struct LogMonitor {
    level: log::Level,
    started: Cell<Option<Instant>>,
}

impl LogMonitor {
    pub fn new(level: log::Level) -> Self {
        Self {
            level,
            started: Cell::new(None),
        }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl QueryMonitor for LogMonitor {
    fn start_query(&self, sql: &str, bound: &[BoundParameter]) {
        self.started.set(Some(Instant::now()));
        log::log!(self.level, "{}", truncate_long!(sql));
        for parameter in bound {
            log::log!(
                self.level,
                "  {} = {:?} ({})",
                parameter.key,
                parameter.value,
                parameter.data_type
            );
        }
    }

    fn stop_query(&self) {
        if let Some(started) = self.started.take() {
            log::log!(self.level, "Query completed in {:?}", started.elapsed());
        }
    }
}
