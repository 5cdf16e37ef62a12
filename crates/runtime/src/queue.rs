use std::collections::VecDeque;
use std::fmt;

use crate::trace::EventTrace;

pub trait QueuedEvent: fmt::Debug {
    /// Short static label used in the trace.
    fn kind(&self) -> &'static str;
}

/// Single-threaded FIFO event loop.
///
/// Each event is handed to the handler and runs to completion before the next
/// one is taken. Every dispatch is recorded in the trace.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
    next_seq: u64,
    trace: EventTrace,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            next_seq: 0,
            trace: EventTrace::new(),
        }
    }
}

impl<E: QueuedEvent> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue whose trace keeps at most `limit` entries.
    pub fn with_trace_limit(limit: usize) -> Self {
        Self {
            trace: EventTrace::with_limit(limit),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Dispatches everything queued so far. Returns the number of events run.
    pub fn run<F>(&mut self, mut handler: F) -> usize
    where
        F: FnMut(E),
    {
        let mut ran = 0;
        while let Some(event) = self.pending.pop_front() {
            self.trace
                .record(self.next_seq, event.kind(), format!("{event:?}"));
            self.next_seq += 1;
            handler(event);
            ran += 1;
        }
        ran
    }

    pub fn trace(&self) -> &EventTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut EventTrace {
        &mut self.trace
    }
}
