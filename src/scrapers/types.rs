/// CSS selectors for the directory and category pages
#[derive(Debug, Clone, PartialEq)]
pub struct Selectors {
    /// One card per category on the directory page
    pub category_card: String,
    /// Category name, inside a card
    pub category_name: String,
    /// Viewer count text, inside a card
    pub category_viewers: String,
    /// Tag chip texts, inside a card
    pub category_tags: String,
    /// Box art, inside a card
    pub category_image: String,
    /// Stream titles on a category page; also the "page has loaded" marker
    pub stream_title: String,
    pub stream_channel: String,
    pub stream_viewers: String,
    pub stream_tag: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            category_card: r#"div[class*="game-card"]"#.to_string(),
            category_name: "h2".to_string(),
            category_viewers: "p".to_string(),
            category_tags: r#"button[class*="tw-tag"] span"#.to_string(),
            category_image: "img".to_string(),
            stream_title: r#"h3[class*="CoreText"]"#.to_string(),
            stream_channel: "div.Layout-sc-1xcs6mc-0.bQImNn".to_string(),
            stream_viewers: r#"div[class*="ScMediaCardStatWrapper"]"#.to_string(),
            stream_tag: r#"button[class*="ScTag"]"#.to_string(),
        }
    }
}
