use serde::{Deserialize, Serialize};

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    /// Number of records currently indexed
    pub record_count: usize,
    /// Records accepted by `insert`
    pub inserts: u64,
    /// Records removed by name or by location
    pub removals: u64,
    /// Inserts and removals refused because of invalid or duplicate input
    pub rejections: u64,
    /// Total number of mutating operations attempted
    pub operations_count: u64,
}

impl DbStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_insert(&mut self) {
        self.operations_count += 1;
        self.inserts += 1;
        self.record_count += 1;
    }

    pub fn record_removal(&mut self) {
        self.operations_count += 1;
        self.removals += 1;
        self.record_count = self.record_count.saturating_sub(1);
    }

    pub fn record_rejection(&mut self) {
        self.operations_count += 1;
        self.rejections += 1;
    }

    /// A mutation that found nothing to act on.
    pub fn record_miss(&mut self) {
        self.operations_count += 1;
    }
}
