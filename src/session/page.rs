use super::{capture_file_name, PageSession};
use anyhow::{anyhow, bail, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Element detached from its document: enough to query inside it again
#[derive(Debug, Clone)]
pub struct StaticElement {
    outer_html: String,
    text: String,
    attrs: Vec<(String, String)>,
}

impl StaticElement {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            outer_html: element.html(),
            text: element.text().collect(),
            attrs: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Page session over fixed HTML, used for tests and for replaying captured pages.
///
/// A URL can be registered with several stages; each scroll reveals the next
/// stage, which is how an infinite-scroll listing is imitated.
#[derive(Debug, Default)]
pub struct StaticPage {
    pages: HashMap<String, Vec<String>>,
    replay_dir: Option<PathBuf>,
    current: Vec<String>,
    stage: Cell<usize>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve pages previously written by the capture option
    pub fn from_capture_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            replay_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_stages(url, vec![html.to_string()])
    }

    pub fn with_stages(mut self, url: &str, stages: Vec<String>) -> Self {
        self.pages.insert(url.to_string(), stages);
        self
    }

    fn current_html(&self) -> Result<&str> {
        self.current
            .get(self.stage.get())
            .map(String::as_str)
            .ok_or_else(|| anyhow!("No page loaded"))
    }

    fn load(&self, url: &str) -> Result<Vec<String>> {
        if let Some(stages) = self.pages.get(url) {
            return Ok(stages.clone());
        }
        if let Some(dir) = &self.replay_dir {
            let path = dir.join(capture_file_name(url));
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("No captured page for {url} at {}", path.display()))?;
            return Ok(vec![html]);
        }
        bail!("No page registered for {url}")
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector `{selector}`: {e:?}"))
}

impl PageSession for StaticPage {
    type Element = StaticElement;

    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Loading static page {}", url);
        let stages = self.load(url)?;
        if stages.is_empty() {
            bail!("Page for {url} has no content");
        }
        self.current = stages;
        self.stage.set(0);
        Ok(())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<StaticElement>> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(self.current_html()?);
        Ok(document.select(&selector).map(StaticElement::from_ref).collect())
    }

    fn find_within(&self, scope: &StaticElement, selector: &str) -> Result<Vec<StaticElement>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&scope.outer_html);
        let Some(root) = fragment.root_element().children().find_map(ElementRef::wrap) else {
            return Ok(Vec::new());
        };
        Ok(root
            .select(&selector)
            .filter(|el| el.id() != root.id())
            .map(StaticElement::from_ref)
            .collect())
    }

    fn text(&self, element: &StaticElement) -> Result<String> {
        Ok(element.text.clone())
    }

    fn attribute(&self, element: &StaticElement, name: &str) -> Result<Option<String>> {
        Ok(element
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    fn scroll_by(&self, _delta: i64) -> Result<()> {
        self.current_html()?;
        let stage = self.stage.get();
        if stage + 1 < self.current.len() {
            self.stage.set(stage + 1);
        }
        Ok(())
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.current_html()?.to_string())
    }

    // Static content cannot change while waiting, so one check decides.
    fn wait_until<F>(&self, _timeout: Duration, mut predicate: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        predicate(self)
    }
}
