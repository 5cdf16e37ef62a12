/// One dispatched event as recorded by [`EventTrace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Dispatch order across the lifetime of the queue, starting at 0.
    pub seq: u64,
    pub kind: &'static str,
    /// `Debug` rendering of the event payload.
    pub detail: String,
}

/// In-memory log of dispatched events.
///
/// Unbounded by default: long-lived owners either `take()` the entries
/// periodically or build the trace `with_limit`, which keeps only the most
/// recent entries.
#[derive(Debug, Default)]
pub struct EventTrace {
    entries: Vec<TraceEntry>,
    limit: Option<usize>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn record(&mut self, seq: u64, kind: &'static str, detail: impl Into<String>) {
        if self.limit == Some(0) {
            return;
        }
        self.entries.push(TraceEntry {
            seq,
            kind,
            detail: detail.into(),
        });
        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    pub fn take(&mut self) -> Vec<TraceEntry> {
        std::mem::take(&mut self.entries)
    }
}
