//! Remote page automation behind a small blocking interface.
//!
//! Every pass drives exactly one [`PageSession`]. The session is created by
//! the caller, borrowed mutably for the duration of a pass and released when
//! it is dropped.

pub mod chrome;
pub mod page;

pub use chrome::ChromeSession;
pub use page::StaticPage;

use crate::error::ScoutError;
use anyhow::Result;
use std::thread;
use std::time::{Duration, Instant};

/// Interval between predicate checks in [`PageSession::wait_until`]
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Blocking operations against a rendered page.
///
/// Element handles are only meaningful for the page they were found on.
pub trait PageSession {
    type Element: Clone;

    fn navigate(&mut self, url: &str) -> Result<()>;

    /// All elements on the page matching a CSS selector, in document order
    fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Number of elements matching a CSS selector, without taking handles
    fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.find_all(selector)?.len())
    }

    /// Descendants of `scope` matching a CSS selector
    fn find_within(&self, scope: &Self::Element, selector: &str) -> Result<Vec<Self::Element>>;

    fn text(&self, element: &Self::Element) -> Result<String>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Scrolls the viewport vertically by `delta` pixels
    fn scroll_by(&self, delta: i64) -> Result<()>;

    /// Serialized HTML of the current page
    fn page_source(&self) -> Result<String>;

    /// Polls `predicate` until it holds or `timeout` elapses.
    fn wait_until<F>(&self, timeout: Duration, mut predicate: F) -> bool
    where
        Self: Sized,
        F: FnMut(&Self) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if predicate(self) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Waits until at least one element matches `selector`.
///
/// Query errors while polling count as "not yet present".
pub fn wait_for_selector<S: PageSession>(session: &S, selector: &str, timeout: Duration) -> Result<()> {
    let present = session.wait_until(timeout, |s| {
        s.count(selector).map(|n| n > 0).unwrap_or(false)
    });

    if present {
        Ok(())
    } else {
        Err(ScoutError::ContentTimeout {
            selector: selector.to_string(),
            waited: timeout,
        }
        .into())
    }
}

/// File name a captured page is stored under, derived from its URL
pub fn capture_file_name(url: &str) -> String {
    let stem = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>();
    format!("{}.html", stem.trim_matches('_'))
}
