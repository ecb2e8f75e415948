use super::extract::extract_categories;
use super::traits::{CrawlPass, PassReport};
use super::capture_page;
use crate::config::ScoutConfig;
use crate::models::CategoryRecord;
use crate::session::{wait_for_selector, PageSession};
use anyhow::Result;
use chrono::Local;
use std::thread;
use tracing::{error, info};

/// Scrapes the top-level directory into category history and snapshot
pub struct CategoryCrawlPass {
    config: ScoutConfig,
}

impl CategoryCrawlPass {
    pub fn new(config: ScoutConfig) -> Self {
        Self { config }
    }

    /// Load the directory, scroll it to convergence and extract every card
    fn scrape<S: PageSession>(&self, session: &mut S) -> Result<Vec<CategoryRecord>> {
        let url = &self.config.directory_url;
        let card = &self.config.selectors.category_card;

        session.navigate(url)?;
        let page: &S = session;

        wait_for_selector(page, card, self.config.wait_timeout)?;
        thread::sleep(self.config.post_load_delay);

        self.config
            .category_scroll
            .run(|| page.count(card), |delta| page.scroll_by(delta))?;

        let cards = page.find_all(card)?;
        info!("Found {} categories after scrolling", cards.len());

        capture_page(page, self.config.capture_dir.as_deref(), url);

        let captured_at = Local::now().naive_local();
        Ok(extract_categories(page, &cards, &self.config.selectors, captured_at))
    }
}

impl CrawlPass for CategoryCrawlPass {
    fn run<S: PageSession>(&self, session: &mut S) -> Result<PassReport> {
        info!("📡 Loading categories page {}", self.config.directory_url);

        let records = match self.scrape(session) {
            Ok(records) => records,
            Err(e) => {
                error!("❌ Category pass failed: {:#}", e);
                return Ok(PassReport {
                    records_written: 0,
                    pages_visited: 1,
                    pages_failed: 1,
                });
            }
        };

        if !records.is_empty() {
            self.config.categories.append_history(&records)?;
            self.config.categories.overwrite_snapshot(&records)?;
        }

        info!("✅ Scraping completed. {} categories scraped.", records.len());
        Ok(PassReport {
            records_written: records.len(),
            pages_visited: 1,
            pages_failed: 0,
        })
    }

    fn name(&self) -> &'static str {
        "categories"
    }
}
