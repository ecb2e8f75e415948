use crate::session::PageSession;
use anyhow::Result;

/// Outcome of one pass over the site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Records persisted to the dataset's history and snapshot
    pub records_written: usize,
    /// Pages attempted
    pub pages_visited: usize,
    /// Pages that yielded nothing because they failed to load or extract
    pub pages_failed: usize,
}

/// Common trait for the crawl passes
///
/// Each pass drives the session it is given and persists its own dataset.
pub trait CrawlPass {
    fn run<S: PageSession>(&self, session: &mut S) -> Result<PassReport>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
