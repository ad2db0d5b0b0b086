//! Partition planning for the line item scan

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Split `total` rows into `parts` contiguous ranges
///
/// Every range but the last holds `total / parts` rows; the last one also
/// takes the remainder. With more parts than rows the leading ranges are
/// empty and the last range holds everything.
pub fn static_ranges(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk = total / parts;

    (0..parts)
        .map(|i| {
            let start = i * chunk;
            let end = if i == parts - 1 { total } else { start + chunk };
            start..end
        })
        .collect()
}

/// Split `total` rows into consecutive morsels of at most `morsel_size`
pub fn morsel_ranges(total: usize, morsel_size: usize) -> Vec<Range<usize>> {
    let morsel_size = morsel_size.max(1);
    (0..total)
        .step_by(morsel_size)
        .map(|start| start..(start + morsel_size).min(total))
        .collect()
}

/// Shared queue of morsels; workers claim the next unclaimed index
#[derive(Debug)]
pub struct MorselQueue {
    morsels: Vec<Range<usize>>,
    next: AtomicUsize,
}

impl MorselQueue {
    pub fn new(total: usize, morsel_size: usize) -> Self {
        Self {
            morsels: morsel_ranges(total, morsel_size),
            next: AtomicUsize::new(0),
        }
    }

    /// Claim the next morsel as `(morsel id, row range)`
    pub fn next_morsel(&self) -> Option<(usize, Range<usize>)> {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.morsels.get(id).map(|range| (id, range.clone()))
    }

    pub fn len(&self) -> usize {
        self.morsels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.morsels.is_empty()
    }
}
