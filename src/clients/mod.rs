//! Catalog site adapters and the plumbing they share.

pub mod ann;
pub mod document;
pub mod fetcher;
pub mod mal;
pub mod mu;

use async_trait::async_trait;

use crate::config::ScraperConfig;
use crate::models::record::{Kind, Record};

pub use ann::AnnAdapter;
pub use fetcher::{HttpFetcher, PageFetcher, SiteClient};
pub use mal::MalAdapter;
pub use mu::MuAdapter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Most recently added or not-yet-aired titles.
    Latest,
    /// Announced titles for the coming season.
    Upcoming,
    /// Every title filed under a category tag.
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub listing: Listing,
    pub limit: Option<usize>,
    /// Restrict to these kinds; empty means whatever the site's default is.
    pub kinds: Vec<Kind>,
    /// Drop rows carrying a tag that starts with any of these.
    pub reject_tags: Vec<String>,
}

impl ListOptions {
    #[must_use]
    pub const fn new(listing: Listing) -> Self {
        Self {
            listing,
            limit: None,
            kinds: Vec::new(),
            reject_tags: Vec::new(),
        }
    }

    #[must_use]
    pub const fn latest() -> Self {
        Self::new(Listing::Latest)
    }

    #[must_use]
    pub const fn upcoming() -> Self {
        Self::new(Listing::Upcoming)
    }

    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(Listing::Tag(tag.into()))
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<Kind>) -> Self {
        self.kinds = kinds;
        self
    }

    #[must_use]
    pub fn with_reject_tags(mut self, reject_tags: Vec<String>) -> Self {
        self.reject_tags = reject_tags;
        self
    }

    fn limit_reached(&self, count: usize) -> bool {
        self.limit.is_some_and(|limit| count >= limit)
    }

    fn accepts_kind(&self, kind: Kind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// Limits for a listing paged by a Next marker: a page cap and a run of
/// empty pages after which the listing gives up.
#[derive(Debug, Clone, Copy)]
struct PageBudget {
    max_pages: usize,
    max_empty: usize,
    empty_streak: usize,
}

impl PageBudget {
    const fn new(scraper: &ScraperConfig) -> Self {
        Self {
            max_pages: scraper.max_pages,
            max_empty: scraper.max_consecutive_empty_pages,
            empty_streak: 0,
        }
    }

    const fn hit(&mut self) {
        self.empty_streak = 0;
    }

    /// Counts an empty or failed page. `false` once the streak is used up.
    const fn miss(&mut self) -> bool {
        self.empty_streak += 1;
        self.empty_streak < self.max_empty
    }
}

/// One catalog site, turning its pages into records.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches a listing, following pagination, and returns one partial
    /// record per row. Fetch failures shorten the result; they never error.
    async fn list_records(&self, options: &ListOptions) -> Vec<Record>;

    /// Fetches the record's detail page and fills its empty fields.
    ///
    /// Returns the record unchanged when it has no URL or the page has no
    /// content.
    async fn populate(&self, record: Record) -> Record;
}

/// Shared tail of every `populate`: fold the detail page into the record.
fn apply_detail(source: &'static str, mut record: Record, detail: &Record) -> Record {
    let filled = record.fill_from(detail);
    record.populated = true;
    tracing::debug!(
        source,
        title = %record.title,
        filled = filled.len(),
        "Record populated"
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_filters() {
        let options = ListOptions::latest().with_kinds(vec![Kind::Tv, Kind::Movie]);
        assert!(options.accepts_kind(Kind::Tv));
        assert!(!options.accepts_kind(Kind::Ona));
        assert!(ListOptions::upcoming().accepts_kind(Kind::Ona));

        let options = ListOptions::tag("Comedy").with_limit(2);
        assert_eq!(options.listing, Listing::Tag("Comedy".to_string()));
        assert!(!options.limit_reached(1));
        assert!(options.limit_reached(2));
        assert!(!ListOptions::latest().limit_reached(10_000));
    }

    #[test]
    fn test_page_budget_streak() {
        let scraper = ScraperConfig {
            max_consecutive_empty_pages: 2,
            ..ScraperConfig::default()
        };
        let mut budget = PageBudget::new(&scraper);
        assert!(budget.miss());
        budget.hit();
        assert!(budget.miss());
        assert!(!budget.miss());
    }

    #[test]
    fn test_apply_detail_fills_and_marks() {
        let record = Record::new("Show").with_url("/show/1");
        let detail = Record::new("Other").with_summary("Filled in.");
        let populated = apply_detail("test", record, &detail);
        assert_eq!(populated.title, "Show");
        assert_eq!(populated.summary, "Filled in.");
        assert!(populated.populated);
    }
}
