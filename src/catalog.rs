use crate::error::ScoutError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const CATEGORY_COLUMN: &str = "Category";

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Category", default)]
    category: Option<String>,
}

/// Ordered, distinct category names that drive the stream pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.trim().is_empty())
            .filter(|n| seen.insert(n.clone()))
            .collect();
        Self { names }
    }

    /// Read the `Category` column of a category snapshot, in row order.
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        if !path.exists() {
            return Err(ScoutError::MissingCatalog { path: path.to_path_buf() });
        }

        let unreadable = |reason: String| ScoutError::UnreadableCatalog {
            path: path.to_path_buf(),
            reason,
        };

        let mut rdr = csv::Reader::from_path(path).map_err(|e| unreadable(e.to_string()))?;
        let headers = rdr.headers().map_err(|e| unreadable(e.to_string()))?;
        if !headers.iter().any(|h| h == CATEGORY_COLUMN) {
            return Err(unreadable(format!("no `{CATEGORY_COLUMN}` column")));
        }

        let mut names = Vec::new();
        for row in rdr.deserialize::<CatalogRow>() {
            let row = row.map_err(|e| unreadable(e.to_string()))?;
            names.extend(row.category);
        }
        Ok(Self::new(names))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
