use crate::scrapers::scroll::{ConvergentScroller, FixedScroll};
use crate::scrapers::types::Selectors;
use crate::store::DatasetFiles;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DIRECTORY_URL: &str = "https://www.twitch.tv/directory?sort=VIEWER_COUNT";
pub const CATEGORY_URL_TEMPLATE: &str = "https://www.twitch.tv/directory/category/{category}?sort=VIEWER_COUNT";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Everything a crawl pass needs besides the page session
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub directory_url: String,
    /// Per-category URL; `{category}` is replaced by the category slug
    pub category_url_template: String,
    /// Replaces spaces when a category name becomes a URL slug
    pub slug_separator: char,
    pub categories: DatasetFiles,
    pub streams: DatasetFiles,
    pub selectors: Selectors,
    /// Scrolling on the directory page
    pub category_scroll: ConvergentScroller,
    /// Scrolling on category pages before streams are read
    pub stream_scroll: FixedScroll,
    /// Bound on waiting for the first item of a page to render
    pub wait_timeout: Duration,
    /// Pause after a page is known to be loading, before extraction starts
    pub post_load_delay: Duration,
    /// Where rendered pages are saved for later replay, if anywhere
    pub capture_dir: Option<PathBuf>,
}

impl ScoutConfig {
    /// Defaults with all four CSV files under `data_dir`
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            directory_url: DIRECTORY_URL.to_string(),
            category_url_template: CATEGORY_URL_TEMPLATE.to_string(),
            slug_separator: '-',
            categories: DatasetFiles {
                history: dir.join("twitch_categories.csv"),
                snapshot: dir.join("last_categories.csv"),
            },
            streams: DatasetFiles {
                history: dir.join("twitch_streams.csv"),
                snapshot: dir.join("last_streams.csv"),
            },
            selectors: Selectors::default(),
            category_scroll: ConvergentScroller::default(),
            stream_scroll: FixedScroll::default(),
            wait_timeout: Duration::from_secs(10),
            post_load_delay: Duration::from_secs(3),
            capture_dir: None,
        }
    }

    /// Slug used in category URLs: lowercase, spaces replaced
    pub fn category_slug(&self, name: &str) -> String {
        name.to_lowercase().replace(' ', &self.slug_separator.to_string())
    }

    pub fn category_url(&self, name: &str) -> String {
        self.category_url_template
            .replace("{category}", &self.category_slug(name))
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}
