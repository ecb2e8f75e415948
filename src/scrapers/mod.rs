pub mod categories;
pub mod extract;
pub mod scroll;
pub mod streams;
pub mod traits;
pub mod types;
pub mod viewers;

pub use categories::CategoryCrawlPass;
pub use streams::StreamCrawlPass;
pub use traits::{CrawlPass, PassReport};

use crate::session::{capture_file_name, PageSession};
use std::path::Path;
use tracing::{info, warn};

/// Save the rendered page for offline replay. Failures are only logged.
fn capture_page<S: PageSession>(session: &S, dir: Option<&Path>, url: &str) {
    let Some(dir) = dir else { return };

    let path = dir.join(capture_file_name(url));
    let result = session
        .page_source()
        .and_then(|html| {
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, html)?;
            Ok(())
        });

    match result {
        Ok(()) => info!("Saved page HTML to {}", path.display()),
        Err(e) => warn!("Could not capture {}: {:#}", url, e),
    }
}
