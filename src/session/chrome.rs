use super::PageSession;
use crate::error::ScoutError;
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Chrome is killed if the session issues no command for this long.
/// Must exceed the longest settle delay between commands.
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Handle to an element registered in the page's `window.__scout` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeElement(u64);

/// Page session backed by a headless Chrome tab.
///
/// Dropping the session closes the browser.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch Chrome and open the tab every pass will drive
    pub fn launch(headless: bool) -> Result<Self> {
        info!("Launching {} Chrome...", if headless { "headless" } else { "headed" });

        let options = LaunchOptions::default_builder()
            .headless(headless)
            .sandbox(false)
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self { _browser: browser, tab })
    }

    /// Evaluate a script that returns `JSON.stringify(...)` and decode the result
    fn eval_json<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let result = self.tab.evaluate(script, false).context("Script evaluation failed")?;
        let raw = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Script returned no string value"))?;
        serde_json::from_str(raw).context("Script returned malformed JSON")
    }

    fn query(&self, scope: &str, selector: &str) -> Result<Option<Vec<u64>>> {
        let selector = serde_json::to_string(selector)?;
        let script = format!(
            r#"(() => {{
                const reg = window.__scout || (window.__scout = {{ next: 1, nodes: new Map() }});
                const scope = {scope};
                if (!scope) return JSON.stringify(null);
                const ids = Array.from(scope.querySelectorAll({selector})).map((node) => {{
                    const id = reg.next++;
                    reg.nodes.set(id, node);
                    return id;
                }});
                return JSON.stringify(ids);
            }})()"#
        );
        self.eval_json(&script)
    }
}

fn node_expr(element: &ChromeElement) -> String {
    format!("((window.__scout && window.__scout.nodes.get({})) || null)", element.0)
}

impl PageSession for ChromeSession {
    type Element = ChromeElement;

    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {url} did not complete"))?;
        Ok(())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>> {
        let ids = self.query("document", selector)?.unwrap_or_default();
        Ok(ids.into_iter().map(ChromeElement).collect())
    }

    // Counting must not register nodes; it runs on every scroll and wait poll.
    fn count(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "JSON.stringify(document.querySelectorAll({}).length)",
            serde_json::to_string(selector)?
        );
        self.eval_json(&script)
    }

    fn find_within(&self, scope: &ChromeElement, selector: &str) -> Result<Vec<ChromeElement>> {
        let ids = self
            .query(&node_expr(scope), selector)?
            .ok_or(ScoutError::UnknownElement(scope.0))?;
        Ok(ids.into_iter().map(ChromeElement).collect())
    }

    fn text(&self, element: &ChromeElement) -> Result<String> {
        let script = format!(
            "(() => {{ const n = {}; return JSON.stringify(n ? (n.innerText || '') : null); }})()",
            node_expr(element)
        );
        let text: Option<String> = self.eval_json(&script)?;
        Ok(text.ok_or(ScoutError::UnknownElement(element.0))?)
    }

    fn attribute(&self, element: &ChromeElement, name: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const n = {}; return JSON.stringify(n ? [n.getAttribute({})] : null); }})()",
            node_expr(element),
            serde_json::to_string(name)?
        );
        let value: Option<(Option<String>,)> = self.eval_json(&script)?;
        let (attr,) = value.ok_or(ScoutError::UnknownElement(element.0))?;
        Ok(attr)
    }

    fn scroll_by(&self, delta: i64) -> Result<()> {
        self.tab
            .evaluate(&format!("window.scrollBy(0, {delta});"), false)
            .context("Scroll command failed")?;
        Ok(())
    }

    fn page_source(&self) -> Result<String> {
        self.eval_json("JSON.stringify(document.documentElement.outerHTML)")
    }
}
