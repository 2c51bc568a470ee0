//! End-of-run report, as text lines or JSON.

use std::fmt::Write as _;

use ftcr_core::{Collection, FetchOutcome, Item};
use serde::Serialize;

/// Everything added in one run, plus the inputs that failed.
#[derive(Debug, Default, Serialize)]
pub(crate) struct Summary {
    pub items: Vec<ItemSummary>,
    pub collections: Vec<CollectionSummary>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemSummary {
    pub id: String,
    pub url: String,
    pub name: String,
    pub size: Option<String>,
    pub fetch: FetchOutcome,
}

#[derive(Debug, Serialize)]
pub(crate) struct CollectionSummary {
    pub id: String,
    pub url: String,
    pub members: Vec<ItemSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FailureSummary {
    pub input: String,
    pub error: String,
}

impl ItemSummary {
    pub(crate) fn new(item: &Item, fetch: FetchOutcome) -> Self {
        Self {
            id: item.id().to_string(),
            url: item.url().to_string(),
            name: item.file_name().to_string(),
            size: item.size_label(),
            fetch,
        }
    }
}

impl CollectionSummary {
    pub(crate) fn new(collection: &Collection, fetches: Vec<FetchOutcome>) -> Self {
        let members = collection
            .members()
            .iter()
            .zip(fetches)
            .map(|(item, fetch)| ItemSummary::new(item, fetch))
            .collect();
        Self {
            id: collection.id().to_string(),
            url: collection.url().to_string(),
            members,
        }
    }
}

impl Summary {
    /// True when any input could not be added.
    pub(crate) fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One line per item and collection; members are indented under their page.
    pub(crate) fn render_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            let _ = writeln!(out, "{}", item_line(item));
        }
        for collection in &self.collections {
            let count = collection.members.len();
            let noun = if count == 1 { "image" } else { "images" };
            let _ = writeln!(out, "{} ({count} {noun})", collection.url);
            for member in &collection.members {
                let _ = writeln!(out, "  {}", item_line(member));
            }
        }
        out
    }
}

fn item_line(item: &ItemSummary) -> String {
    format!(
        "{}  {}",
        item.name,
        item.size.as_deref().unwrap_or("unavailable")
    )
}
