use super::types::Selectors;
use super::viewers::parse_viewers;
use crate::models::{CategoryProbe, CategoryRecord, StreamRecord};
use crate::session::PageSession;
use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Extract category records from directory cards.
///
/// A card that fails to probe is logged and skipped; cards without a name
/// or with zero viewers are dropped.
pub fn extract_categories<S: PageSession>(
    session: &S,
    cards: &[S::Element],
    selectors: &Selectors,
    captured_at: NaiveDateTime,
) -> Vec<CategoryRecord> {
    let mut records = Vec::new();

    for (idx, card) in cards.iter().enumerate() {
        let probe = match probe_category(session, card, selectors) {
            Ok(probe) => probe,
            Err(e) => {
                warn!("⚠️ Error scraping category card {}: {:#}", idx, e);
                continue;
            }
        };

        if probe.image_url.is_none() {
            debug!("No image found for category: {:?}", probe.name);
        }

        let summary = format!("name={:?}, viewers={:?}", probe.name, probe.viewers);
        match probe.into_record(captured_at) {
            Some(record) => records.push(record),
            None => debug!("Skipped category card {}: {}", idx, summary),
        }
    }

    records
}

/// Read every field of one card. Missing elements are `None`/empty, not errors.
pub fn probe_category<S: PageSession>(
    session: &S,
    card: &S::Element,
    selectors: &Selectors,
) -> Result<CategoryProbe> {
    let name = match session.find_within(card, &selectors.category_name)?.first() {
        Some(el) => Some(session.text(el)?.trim().to_string()).filter(|n| !n.is_empty()),
        None => None,
    };

    let viewers = match session.find_within(card, &selectors.category_viewers)?.first() {
        Some(el) => Some(parse_viewers(&session.text(el)?)),
        None => None,
    };

    let mut tags = Vec::new();
    for el in session.find_within(card, &selectors.category_tags)? {
        let tag = session.text(&el)?;
        let tag = tag.trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
    }

    let image_url = match session.find_within(card, &selectors.category_image)?.first() {
        Some(el) => session.attribute(el, "src")?.filter(|src| !src.trim().is_empty()),
        None => None,
    };

    Ok(CategoryProbe {
        name,
        viewers,
        tags,
        image_url,
    })
}

/// The four independently queried columns of a category page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamLists {
    pub titles: Vec<String>,
    pub channels: Vec<String>,
    pub viewers: Vec<u64>,
    pub tags: Vec<String>,
}

impl StreamLists {
    /// Number of rows that can be zipped from all four lists
    pub fn aligned_len(&self) -> usize {
        self.titles
            .len()
            .min(self.channels.len())
            .min(self.viewers.len())
            .min(self.tags.len())
    }
}

/// Query the four stream columns. Blank texts are left out of each list.
pub fn read_stream_lists<S: PageSession>(session: &S, selectors: &Selectors) -> Result<StreamLists> {
    let titles = non_blank_texts(session, &selectors.stream_title)?;
    let channels = non_blank_texts(session, &selectors.stream_channel)?;
    let viewers = non_blank_texts(session, &selectors.stream_viewers)?
        .iter()
        .map(|t| parse_viewers(t))
        .collect();
    let tags = non_blank_texts(session, &selectors.stream_tag)?;

    Ok(StreamLists {
        titles,
        channels,
        viewers,
        tags,
    })
}

fn non_blank_texts<S: PageSession>(session: &S, selector: &str) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for el in session.find_all(selector)? {
        let text = session.text(&el)?;
        if !text.trim().is_empty() {
            texts.push(text);
        }
    }
    Ok(texts)
}

/// Zip the four lists by position, stopping at the shortest.
pub fn zip_streams(lists: StreamLists, category: &str, captured_at: NaiveDateTime) -> Vec<StreamRecord> {
    let len = lists.aligned_len();
    if len < lists.titles.len().max(lists.channels.len()).max(lists.viewers.len()).max(lists.tags.len()) {
        debug!(
            "Uneven stream lists for {}: titles={}, channels={}, viewers={}, tags={}; keeping {}",
            category,
            lists.titles.len(),
            lists.channels.len(),
            lists.viewers.len(),
            lists.tags.len(),
            len
        );
    }

    lists
        .titles
        .into_iter()
        .zip(lists.channels)
        .zip(lists.viewers)
        .zip(lists.tags)
        .map(|(((title, channel), viewers), tag)| StreamRecord {
            captured_at,
            category: category.to_string(),
            title,
            channel,
            viewers,
            tag,
        })
        .collect()
}

/// Extract all stream records currently rendered on a category page.
pub fn extract_streams<S: PageSession>(
    session: &S,
    selectors: &Selectors,
    category: &str,
    captured_at: NaiveDateTime,
) -> Result<Vec<StreamRecord>> {
    let lists = read_stream_lists(session, selectors)?;
    Ok(zip_streams(lists, category, captured_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_IMAGE, NO_TAGS};
    use crate::session::StaticPage;
    use chrono::NaiveDate;

    const URL: &str = "https://www.twitch.tv/directory?sort=VIEWER_COUNT";

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 14)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn session(body: &str) -> StaticPage {
        let mut page = StaticPage::new().with_page(URL, &format!("<html><body>{body}</body></html>"));
        page.navigate(URL).unwrap();
        page
    }

    fn strings(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn category_cards_are_filtered_and_defaulted() {
        let page = session(
            r#"
            <div class="game-card"><h2>Just Chatting</h2><p>299K viewers</p>
              <button class="tw-tag"><span>IRL</span></button>
              <button class="tw-tag"><span> </span></button>
              <button class="tw-tag"><span>English</span></button>
              <img src="https://static.example/jc.jpg"></div>
            <div class="game-card"><h2>Dead Game</h2><p>0 viewers</p></div>
            <div class="game-card"><p>12K viewers</p></div>
            <div class="game-card"><h2>Chess</h2><p>18.2K viewers</p><img></div>
            <div class="game-card"><h2>No Count</h2></div>
            "#,
        );
        let selectors = Selectors::default();
        let cards = page.find_all(&selectors.category_card).unwrap();
        assert_eq!(cards.len(), 5);

        let records = extract_categories(&page, &cards, &selectors, ts());
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name, "Just Chatting");
        assert_eq!(records[0].viewers, 299_000);
        assert_eq!(records[0].tags, "IRL, English");
        assert_eq!(records[0].image_url, "https://static.example/jc.jpg");

        assert_eq!(records[1].name, "Chess");
        assert_eq!(records[1].viewers, 18_200);
        assert_eq!(records[1].tags, NO_TAGS);
        assert_eq!(records[1].image_url, NO_IMAGE);

        assert!(records.iter().all(|r| r.viewers > 0 && r.name != "Unknown"));
    }

    #[test]
    fn invalid_inner_selector_skips_every_card() {
        let page = session(r#"<div class="game-card"><h2>Chess</h2><p>5K</p></div>"#);
        let mut selectors = Selectors::default();
        let cards = page.find_all(&selectors.category_card).unwrap();

        selectors.category_tags = "[[".to_string();
        assert!(extract_categories(&page, &cards, &selectors, ts()).is_empty());

        selectors.category_tags = Selectors::default().category_tags;
        assert_eq!(extract_categories(&page, &cards, &selectors, ts()).len(), 1);
    }

    /// Three cards; reading the name of card `failing` errors.
    struct FlakyCards {
        failing: usize,
    }

    #[derive(Debug, Clone, Copy)]
    enum FlakyElement {
        Card(usize),
        Name(usize),
        Viewers(usize),
    }

    impl PageSession for FlakyCards {
        type Element = FlakyElement;

        fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }
        fn find_all(&self, _selector: &str) -> Result<Vec<FlakyElement>> {
            Ok((0..3).map(FlakyElement::Card).collect())
        }
        fn find_within(&self, scope: &FlakyElement, selector: &str) -> Result<Vec<FlakyElement>> {
            let FlakyElement::Card(i) = *scope else {
                return Ok(Vec::new());
            };
            Ok(match selector {
                "h2" => vec![FlakyElement::Name(i)],
                "p" => vec![FlakyElement::Viewers(i)],
                _ => Vec::new(),
            })
        }
        fn text(&self, element: &FlakyElement) -> Result<String> {
            match *element {
                FlakyElement::Name(i) if i == self.failing => anyhow::bail!("node detached"),
                FlakyElement::Name(i) => Ok(format!("Game {i}")),
                FlakyElement::Viewers(_) => Ok("5K".to_string()),
                FlakyElement::Card(_) => Ok(String::new()),
            }
        }
        fn attribute(&self, _element: &FlakyElement, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn scroll_by(&self, _delta: i64) -> Result<()> {
            Ok(())
        }
        fn page_source(&self) -> Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn failing_card_does_not_stop_siblings() {
        let page = FlakyCards { failing: 1 };
        let cards = page.find_all("div").unwrap();

        let records = extract_categories(&page, &cards, &Selectors::default(), ts());
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Game 0", "Game 2"]);
        assert!(records.iter().all(|r| r.viewers == 5000));
    }

    #[test]
    fn zip_stops_at_shortest_list() {
        let lists = StreamLists {
            titles: strings("title", 5),
            channels: strings("channel", 4),
            viewers: vec![100, 200, 300, 400, 500, 600],
            tags: strings("tag", 3),
        };

        let records = zip_streams(lists, "Just Chatting", ts());
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.category, "Just Chatting");
            assert_eq!(record.title, format!("title{i}"));
            assert_eq!(record.channel, format!("channel{i}"));
            assert_eq!(record.viewers, (i as u64 + 1) * 100);
            assert_eq!(record.tag, format!("tag{i}"));
        }
    }

    #[test]
    fn stream_lists_skip_blank_texts() {
        let page = session(
            r#"
            <h3 class="CoreText-abc">Speedrun</h3><h3 class="CoreText-abc">  </h3><h3 class="CoreText-abc">Chill</h3>
            <div class="Layout-sc-1xcs6mc-0 bQImNn">alice</div><div class="Layout-sc-1xcs6mc-0 bQImNn">bob</div>
            <div class="ScMediaCardStatWrapper-x">1.5K viewers</div><div class="ScMediaCardStatWrapper-x">87 viewers</div>
            <button class="ScTag-y">English</button><button class="ScTag-y">Retro</button>
            "#,
        );

        let records = extract_streams(&page, &Selectors::default(), "Retro", ts()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Chill");
        assert_eq!(records[1].channel, "bob");
        assert_eq!(records[0].viewers, 1_500);
        assert_eq!(records[1].viewers, 87);
        assert_eq!(records[1].tag, "Retro");
    }
}
