use super::extract::extract_streams;
use super::traits::{CrawlPass, PassReport};
use super::capture_page;
use crate::catalog::Catalog;
use crate::config::ScoutConfig;
use crate::models::StreamRecord;
use crate::session::{wait_for_selector, PageSession};
use anyhow::Result;
use chrono::Local;
use std::thread;
use tracing::{error, info};

/// Scrapes live streams for every category in the category snapshot
pub struct StreamCrawlPass {
    config: ScoutConfig,
}

impl StreamCrawlPass {
    pub fn new(config: ScoutConfig) -> Self {
        Self { config }
    }

    /// Scrape a single category page
    fn scrape_category<S: PageSession>(&self, session: &mut S, category: &str) -> Result<Vec<StreamRecord>> {
        let url = self.config.category_url(category);
        info!("📡 Scraping {} - {}", category, url);

        session.navigate(&url)?;
        let page: &S = session;
        thread::sleep(self.config.post_load_delay);

        wait_for_selector(page, &self.config.selectors.stream_title, self.config.wait_timeout)?;

        self.config.stream_scroll.run(|delta| page.scroll_by(delta))?;

        capture_page(page, self.config.capture_dir.as_deref(), &url);

        let captured_at = Local::now().naive_local();
        extract_streams(page, &self.config.selectors, category, captured_at)
    }
}

impl CrawlPass for StreamCrawlPass {
    fn run<S: PageSession>(&self, session: &mut S) -> Result<PassReport> {
        let catalog = Catalog::load(&self.config.categories.snapshot)?;
        info!("Loaded {} categories from {}", catalog.len(), self.config.categories.snapshot.display());

        let mut report = PassReport::default();
        let mut all_streams = Vec::new();

        for category in catalog.names() {
            report.pages_visited += 1;
            match self.scrape_category(session, category) {
                Ok(streams) => {
                    info!("✅ {} streams scraped for category: {}", streams.len(), category);
                    all_streams.extend(streams);
                }
                Err(e) => {
                    error!("❌ Error scraping {}: {:#}", category, e);
                    report.pages_failed += 1;
                }
            }
        }

        self.config.streams.overwrite_snapshot(&all_streams)?;
        self.config.streams.append_history(&all_streams)?;

        report.records_written = all_streams.len();
        info!(
            "✅ Streams extraction completed: {} streams from {} categories ({} failed)",
            report.records_written, report.pages_visited, report.pages_failed
        );
        Ok(report)
    }

    fn name(&self) -> &'static str {
        "streams"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use crate::models::CategoryRecord;
    use crate::session::StaticPage;
    use chrono::NaiveDate;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const STREAM_HEADER: &str = "Timestamp,Category,Stream Title,Channel,Viewers,Tags";

    fn test_config(dir: &TempDir) -> ScoutConfig {
        let mut config = ScoutConfig::with_data_dir(dir.path());
        config.stream_scroll.settle_delay = Duration::ZERO;
        config.wait_timeout = Duration::ZERO;
        config.post_load_delay = Duration::ZERO;
        config
    }

    fn seed_catalog(config: &ScoutConfig, names: &[&str]) {
        let captured_at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records: Vec<_> = names
            .iter()
            .map(|name| CategoryRecord {
                captured_at,
                name: name.to_string(),
                viewers: 1000,
                tags: "No Tags".to_string(),
                image_url: "No Image".to_string(),
            })
            .collect();
        config.categories.overwrite_snapshot(&records).unwrap();
    }

    fn category_page(rows: &[(&str, &str, &str, &str)]) -> String {
        let mut html = String::from("<body>");
        for (title, channel, viewers, tag) in rows {
            html.push_str(&format!(
                r#"<h3 class="CoreText-t">{title}</h3><div class="Layout-sc-1xcs6mc-0 bQImNn">{channel}</div><div class="ScMediaCardStatWrapper-v">{viewers}</div><button class="ScTag-q">{tag}</button>"#
            ));
        }
        html.push_str("</body>");
        html
    }

    #[test]
    fn missing_catalog_fails_without_writes() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut page = StaticPage::new();

        let err = StreamCrawlPass::new(config.clone()).run(&mut page).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoutError>(),
            Some(ScoutError::MissingCatalog { .. })
        ));
        assert!(!config.streams.history.exists());
        assert!(!config.streams.snapshot.exists());
    }

    #[test]
    fn timed_out_category_leaves_header_only_files() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        seed_catalog(&config, &["Just Chatting"]);
        let mut page = StaticPage::new().with_page(
            &config.category_url("Just Chatting"),
            "<body><div class=\"spinner\"></div></body>",
        );

        let report = StreamCrawlPass::new(config.clone()).run(&mut page).unwrap();
        assert_eq!(report.records_written, 0);
        assert_eq!(report.pages_failed, 1);

        for path in [&config.streams.history, &config.streams.snapshot] {
            assert_eq!(fs::read_to_string(path).unwrap(), format!("{STREAM_HEADER}\n"));
        }
    }

    #[test]
    fn one_failing_category_does_not_abort_the_rest() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        seed_catalog(&config, &["Just Chatting", "Broken Game", "Chess"]);

        let mut page = StaticPage::new()
            .with_page(
                &config.category_url("Just Chatting"),
                &category_page(&[("Hello", "alice", "1.2K viewers", "English"), ("Hi", "bob", "300", "IRL")]),
            )
            .with_page(
                &config.category_url("Chess"),
                &category_page(&[("Blitz", "carol", "20.7000", "Chess")]),
            );

        let report = StreamCrawlPass::new(config.clone()).run(&mut page).unwrap();
        assert_eq!(report.pages_visited, 3);
        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.records_written, 3);

        let snapshot = fs::read_to_string(&config.streams.snapshot).unwrap();
        let rows: Vec<_> = snapshot.lines().skip(1).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].ends_with(",Just Chatting,Hello,alice,1200,English"));
        assert!(rows[1].ends_with(",Just Chatting,Hi,bob,300,IRL"));
        assert!(rows[2].ends_with(",Chess,Blitz,carol,20700,Chess"));
    }

    #[test]
    fn history_accumulates_across_runs() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        seed_catalog(&config, &["Chess"]);
        let html = category_page(&[("Blitz", "carol", "42", "Chess")]);

        for _ in 0..2 {
            let mut page = StaticPage::new().with_page(&config.category_url("Chess"), &html);
            StreamCrawlPass::new(config.clone()).run(&mut page).unwrap();
        }

        let history = fs::read_to_string(&config.streams.history).unwrap();
        assert_eq!(history.lines().count(), 3);
        let snapshot = fs::read_to_string(&config.streams.snapshot).unwrap();
        assert_eq!(snapshot.lines().count(), 2);
    }

    #[test]
    fn category_label_comes_from_catalog() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.stream_scroll.steps = 2;
        seed_catalog(&config, &["Grand Theft Auto V"]);

        let url = config.category_url("Grand Theft Auto V");
        assert!(url.contains("/grand-theft-auto-v?"));
        let mut page = StaticPage::new().with_page(&url, &category_page(&[("RP", "dave", "5K", "RP")]));

        StreamCrawlPass::new(config.clone()).run(&mut page).unwrap();

        let snapshot = fs::read_to_string(&config.streams.snapshot).unwrap();
        assert!(snapshot.contains(",Grand Theft Auto V,RP,dave,5000,RP"));
    }
}
