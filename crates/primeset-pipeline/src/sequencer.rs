//! Reordering stage for input-ordered output

use primeset_core::Record;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Releases records strictly in increasing `value` order
///
/// Records that arrive ahead of the next expected value wait in a min-heap.
/// The heap grows while a slow value holds up the sequence.
#[derive(Debug)]
pub struct Sequencer {
    next: u64,
    pending: BinaryHeap<Reverse<Pending>>,
    high_water: usize,
}

#[derive(Debug)]
struct Pending(Record);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.0.value == other.0.value
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.value.cmp(&other.0.value)
    }
}

impl Sequencer {
    /// Create a sequencer expecting `first` as the first value
    pub fn new(first: u64) -> Self {
        Self {
            next: first,
            pending: BinaryHeap::new(),
            high_water: 0,
        }
    }

    /// Buffer a record
    pub fn push(&mut self, record: Record) {
        self.pending.push(Reverse(Pending(record)));
        self.high_water = self.high_water.max(self.pending.len());
    }

    /// Take the next record if it has arrived
    pub fn pop_ready(&mut self) -> Option<Record> {
        let ready = matches!(self.pending.peek(), Some(Reverse(Pending(r))) if r.value == self.next);
        if !ready {
            return None;
        }
        self.next += 1;
        self.pending.pop().map(|Reverse(Pending(record))| record)
    }

    /// Remaining records in value order, regardless of gaps
    pub fn drain(&mut self) -> Vec<Record> {
        let mut rest = Vec::with_capacity(self.pending.len());
        while let Some(Reverse(Pending(record))) = self.pending.pop() {
            rest.push(record);
        }
        rest
    }

    /// The value expected next
    pub fn next_expected(&self) -> u64 {
        self.next
    }

    /// Number of buffered records
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Largest number of records buffered at once
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}
