//! Structured diagnostics for extraction decisions.
//!
//! The pipeline reports every decision it takes (chosen tolerances, header
//! row, column roles, skipped rows, rejected candidates) as a
//! [`TraceEvent`]. Attach a [`TraceSink`] to a pipeline to receive them;
//! without one, events are only narrated through `log::debug!`.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::model::{Tier, TransactionRecord};
use crate::table::ColumnRoles;
use crate::validate::RejectReason;

/// Why a row produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoDate,
    NoNarrative,
    NoDesignation,
    NoAmount,
}

/// One extraction decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    PageStarted {
        page: u32,
        fragments: usize,
    },
    RowsGrouped {
        page: u32,
        rows: usize,
        tolerance: f32,
    },
    ColumnsDetected {
        page: u32,
        columns: usize,
        tolerance: f32,
    },
    HeaderDetected {
        page: u32,
        row: Option<usize>,
    },
    RolesDetected {
        page: u32,
        roles: ColumnRoles,
    },
    RowSkipped {
        page: u32,
        tier: Tier,
        row: usize,
        reason: SkipReason,
    },
    RecordEmitted {
        page: u32,
        tier: Tier,
        record: TransactionRecord,
    },
    RecordRejected {
        page: u32,
        tier: Tier,
        record: TransactionRecord,
        reason: RejectReason,
    },
    TierFinished {
        page: u32,
        tier: Tier,
        candidates: usize,
        accepted: usize,
    },
    PageFinished {
        page: u32,
        tier: Option<Tier>,
        records: usize,
    },
}

/// Receiver of trace events.
pub trait TraceSink {
    fn record(&self, event: &TraceEvent);
}

impl<F> TraceSink for F
where
    F: Fn(&TraceEvent),
{
    fn record(&self, event: &TraceEvent) {
        self(event)
    }
}

/// A sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingTrace {
    events: Mutex<Vec<TraceEvent>>,
}

impl CollectingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain the events received so far.
    pub fn take(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl TraceSink for CollectingTrace {
    fn record(&self, event: &TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Optional shared sink handle held by the pipeline.
#[derive(Clone, Default)]
pub struct Tracer {
    sink: Option<Arc<dyn TraceSink + Send + Sync>>,
}

impl Tracer {
    /// A tracer that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A tracer forwarding to `sink`.
    pub fn new(sink: Arc<dyn TraceSink + Send + Sync>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Check if a sink is attached.
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Forward an event; the event is only built when a sink is attached.
    pub fn emit(&self, event: impl FnOnce() -> TraceEvent) {
        if let Some(sink) = &self.sink {
            sink.record(&event());
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_trace() {
        let sink = Arc::new(CollectingTrace::new());
        let tracer = Tracer::new(sink.clone());
        tracer.emit(|| TraceEvent::PageStarted {
            page: 1,
            fragments: 12,
        });
        tracer.emit(|| TraceEvent::HeaderDetected {
            page: 1,
            row: Some(0),
        });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_disabled_tracer_builds_nothing() {
        let tracer = Tracer::disabled();
        assert!(!tracer.is_enabled());
        tracer.emit(|| panic!("event built without a sink"));
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(0usize));
        let counter = seen.clone();
        let tracer = Tracer::new(Arc::new(move |_: &TraceEvent| {
            if let Ok(mut n) = counter.lock() {
                *n += 1;
            }
        }));
        tracer.emit(|| TraceEvent::PageFinished {
            page: 1,
            tier: None,
            records: 0,
        });
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = TraceEvent::RowSkipped {
            page: 2,
            tier: Tier::ColumnStructure,
            row: 4,
            reason: SkipReason::NoDesignation,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"row_skipped\""));
        assert!(json.contains("\"reason\":\"no_designation\""));
    }
}
