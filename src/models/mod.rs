use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Tags cell written when a category card carries no tag chips
pub const NO_TAGS: &str = "No Tags";

/// Image cell written when a category card has no usable image
pub const NO_IMAGE: &str = "No Image";

/// Separator between tag texts inside the Tags cell
pub const TAG_DELIMITER: &str = ", ";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record type with a fixed CSV column order.
///
/// `HEADER` must list the columns in the same order as the struct's
/// serialized fields.
pub trait Tabular: Serialize {
    const HEADER: &'static [&'static str];
}

/// One category from the top-level directory
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRecord {
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub captured_at: NaiveDateTime,
    #[serde(rename = "Category")]
    pub name: String,
    #[serde(rename = "Viewers")]
    pub viewers: u64,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Image_URL")]
    pub image_url: String,
}

impl Tabular for CategoryRecord {
    const HEADER: &'static [&'static str] = &["Timestamp", "Category", "Viewers", "Tags", "Image_URL"];
}

/// One live stream listed on a category page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StreamRecord {
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub captured_at: NaiveDateTime,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Stream Title")]
    pub title: String,
    #[serde(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Viewers")]
    pub viewers: u64,
    #[serde(rename = "Tags")]
    pub tag: String,
}

impl Tabular for StreamRecord {
    const HEADER: &'static [&'static str] =
        &["Timestamp", "Category", "Stream Title", "Channel", "Viewers", "Tags"];
}

/// Raw result of probing a single category card.
///
/// Name and viewers stay optional until [`CategoryProbe::into_record`]
/// decides whether the card is worth keeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryProbe {
    pub name: Option<String>,
    pub viewers: Option<u64>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

impl CategoryProbe {
    /// Applies the retention filter: a readable name and a non-zero viewer count.
    pub fn into_record(self, captured_at: NaiveDateTime) -> Option<CategoryRecord> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let viewers = self.viewers.filter(|v| *v > 0)?;

        let tags = if self.tags.is_empty() {
            NO_TAGS.to_string()
        } else {
            self.tags.join(TAG_DELIMITER)
        };

        Some(CategoryRecord {
            captured_at,
            name,
            viewers,
            tags,
            image_url: self.image_url.unwrap_or_else(|| NO_IMAGE.to_string()),
        })
    }
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
