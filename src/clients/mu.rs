//! Baka-Updates Manga series catalog.
//!
//! Category listings announce their length up front with a `Pages (N)`
//! indicator on the first page; later pages are `&page=N`.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::document::{Document, Node};
use super::fetcher::{PageFetcher, SiteClient};
use super::{ListOptions, Listing, SourceAdapter, apply_detail};
use crate::config::{ScraperConfig, SourceConfig};
use crate::models::record::{Kind, Record};
use crate::parser::{Role, RoleTable, credit, parse_date};

const NAME: &str = "mu";

pub const ROLES: RoleTable = &[
    (Role::Original, &["Author(s)", "Author"]),
    (Role::CharacterDesigner, &["Artist(s)", "Artist"]),
];

/// A listing row and the category tags it was filed under.
#[derive(Debug, Clone)]
pub struct Row {
    pub record: Record,
    pub tags: Vec<String>,
}

impl Row {
    /// Whether any tag starts with one of `prefixes`.
    #[must_use]
    pub fn has_tag_prefix(&self, prefixes: &[String]) -> bool {
        self.tags
            .iter()
            .any(|tag| prefixes.iter().any(|prefix| tag.starts_with(prefix.as_str())))
    }
}

#[derive(Debug, Default)]
pub struct ListingPage {
    pub rows: Vec<Row>,
    /// From the `Pages (N)` indicator, when the page carries one.
    pub total_pages: Option<usize>,
}

#[must_use]
pub fn tag_path(tag: &str) -> String {
    format!("/series.html?category={}", urlencoding::encode(tag))
}

fn total_pages(doc: &Document) -> Option<usize> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^Pages \((\d+)\)").expect("Invalid regex pattern defined in code")
    });

    doc.select_all("td.specialtext").iter().find_map(|td| {
        re.captures(&td.text())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn parse_row(tr: &Node<'_>) -> Option<Row> {
    let mut record = Record::default();
    let mut tags = Vec::new();

    for td in tr.select_all("td") {
        let class = td.attr("class").unwrap_or_default();
        if class.ends_with('1') {
            let a = td.select_first("a")?;
            record.title = a.text();
            record.url = a.attr("href").unwrap_or_default().to_string();
        } else if class.ends_with('2') {
            tags = td
                .text()
                .split(", ")
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect();
        } else if class.ends_with('3') {
            let text = td.text();
            record.start_date = parse_date(&text).unwrap_or_else(|e| {
                debug!(source = NAME, error = %e, "Unparseable listing year");
                None
            });
        }
    }

    (!record.title.is_empty()).then_some(Row { record, tags })
}

#[must_use]
pub fn parse_listing(body: &str) -> ListingPage {
    let doc = Document::parse(body);
    let rows = doc
        .select_all("table.series_rows_table tr")
        .iter()
        .filter(|tr| tr.select_first("td.col1").is_some())
        .filter_map(parse_row)
        .collect();

    ListingPage {
        rows,
        total_pages: total_pages(&doc),
    }
}

fn credited_names(content: &Node<'_>) -> Vec<String> {
    let links: Vec<String> = content
        .select_all("a")
        .iter()
        .map(Node::text)
        .filter(|name| !name.is_empty())
        .collect();
    if links.is_empty() {
        content.own_text()
    } else {
        links
    }
}

/// Everything the series page says, as a record of its own.
#[must_use]
pub fn parse_detail(body: &str) -> Record {
    let doc = Document::parse(body);
    let mut detail = Record::default();

    for category in doc.select_all("div.sCat") {
        let Some(label) = category.select_first("b").map(|b| b.text()) else {
            continue;
        };
        let Some(content) = category
            .following_siblings()
            .into_iter()
            .next()
            .filter(|next| next.has_class("sContent"))
        else {
            debug!(source = NAME, field = %label, "Category without content");
            continue;
        };

        match label.as_str() {
            "Description" => {
                let lines = content.own_text();
                detail.summary = if lines.is_empty() {
                    content.text()
                } else {
                    lines.join("\n")
                };
            }
            "Associated Names" => detail.alt_titles = content.own_text(),
            "Type" => detail.kind = Kind::from_label(&content.text()),
            "Year" => match parse_date(&content.text()) {
                Ok(year) => detail.start_date = year,
                Err(e) => debug!(source = NAME, field = "Year", error = %e, "Skipping field"),
            },
            "Author(s)" | "Artist(s)" => {
                for name in credited_names(&content) {
                    credit(&mut detail, ROLES, &name, &[label.as_str()]);
                }
            }
            _ => {}
        }
    }

    detail
}

pub struct MuAdapter {
    site: SiteClient,
    max_pages: usize,
}

impl MuAdapter {
    #[must_use]
    pub fn new(source: SourceConfig, scraper: &ScraperConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            site: SiteClient::new(NAME, source, scraper, fetcher),
            max_pages: scraper.max_pages,
        }
    }

    async fn tag(&self, tag: &str, options: &ListOptions) -> Vec<Row> {
        let path = tag_path(tag);

        info!(source = NAME, tag, page = 1, "Acquiring listing page");
        let first = match self.site.get_page(&path).await {
            Some(body) => parse_listing(&body),
            None => ListingPage::default(),
        };

        // The page count is known up front, so empty pages are skipped
        // without giving up on the ones after them.
        let total = first.total_pages.unwrap_or(1).clamp(1, self.max_pages.max(1));
        let mut rows = first.rows;

        for page in 2..=total {
            if options.limit_reached(rows.len()) {
                break;
            }

            info!(
                source = NAME,
                page,
                total_pages = total,
                results = rows.len(),
                "Acquiring listing page"
            );

            let page_rows = match self.site.get_page(&format!("{path}&page={page}")).await {
                Some(body) => parse_listing(&body).rows,
                None => Vec::new(),
            };

            if page_rows.is_empty() {
                debug!(source = NAME, page, "Skipping empty listing page");
                continue;
            }
            rows.extend(page_rows);
        }

        if !options.reject_tags.is_empty() {
            let unfiltered = rows.len();
            rows.retain(|row| !row.has_tag_prefix(&options.reject_tags));
            info!(source = NAME, unfiltered, results = rows.len(), "Rejected tagged rows");
        }

        rows
    }
}

#[async_trait]
impl SourceAdapter for MuAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_records(&self, options: &ListOptions) -> Vec<Record> {
        info!(event = "listing_started", source = NAME, listing = ?options.listing);

        let mut results: Vec<Record> = match &options.listing {
            Listing::Tag(tag) => self
                .tag(tag, options)
                .await
                .into_iter()
                .map(|row| row.record)
                .collect(),
            other => {
                warn!(source = NAME, listing = ?other, "Listing not supported");
                Vec::new()
            }
        };

        if let Some(limit) = options.limit {
            results.truncate(limit);
        }

        info!(event = "listing_finished", source = NAME, results = results.len());
        results
    }

    async fn populate(&self, record: Record) -> Record {
        if record.url.is_empty() {
            return record;
        }

        let Some(body) = self.site.get_url(&record.url).await else {
            return record;
        };

        let detail = parse_detail(&body);
        apply_detail(NAME, record, &detail)
    }
}
