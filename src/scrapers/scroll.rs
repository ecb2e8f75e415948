use anyhow::Result;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Scrolls an infinite-scroll listing until the item count stops growing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergentScroller {
    pub max_attempts: u32,
    pub settle_delay: Duration,
    pub scroll_delta: i64,
}

impl Default for ConvergentScroller {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            settle_delay: Duration::from_secs(6),
            scroll_delta: 1000,
        }
    }
}

impl ConvergentScroller {
    /// Run until a read shows no new items, or the attempt budget is spent.
    ///
    /// Returns the last item count read.
    pub fn run<C, S>(&self, mut count: C, mut step: S) -> Result<usize>
    where
        C: FnMut() -> Result<usize>,
        S: FnMut(i64) -> Result<()>,
    {
        let mut previous = 0;
        let mut attempts = 0;

        while attempts < self.max_attempts {
            let current = count()?;
            debug!("Attempt {}: {} items found", attempts + 1, current);

            if current == previous {
                info!("No new items loaded, stopping scroll");
                break;
            }

            step(self.scroll_delta)?;
            thread::sleep(self.settle_delay);

            previous = current;
            attempts += 1;
            debug!("Scrolling... attempt {}/{}", attempts, self.max_attempts);
        }

        info!("Finished scrolling after {} attempts, {} items loaded", attempts, previous);
        Ok(previous)
    }
}

/// A fixed number of scroll steps with no early exit.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedScroll {
    pub steps: u32,
    pub settle_delay: Duration,
    pub scroll_delta: i64,
}

impl Default for FixedScroll {
    fn default() -> Self {
        Self {
            steps: 0,
            settle_delay: Duration::from_secs(2),
            scroll_delta: 1000,
        }
    }
}

impl FixedScroll {
    pub fn run<S>(&self, mut step: S) -> Result<()>
    where
        S: FnMut(i64) -> Result<()>,
    {
        for _ in 0..self.steps {
            step(self.scroll_delta)?;
            thread::sleep(self.settle_delay);
        }
        Ok(())
    }
}
