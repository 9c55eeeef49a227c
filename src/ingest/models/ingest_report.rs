use std::fmt;

/// Outcome of one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub nodes_checked: usize,
    pub nodes_skipped: usize,
    pub nodes_failed: usize,
    pub receipts_fetched: usize,
    pub receipts_new: u64,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} node(s) checked, {} up to date, {} failed, {} receipt(s) fetched, {} new",
            self.nodes_checked,
            self.nodes_skipped,
            self.nodes_failed,
            self.receipts_fetched,
            self.receipts_new
        )
    }
}
