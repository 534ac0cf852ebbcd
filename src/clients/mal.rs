//! MyAnimeList.
//!
//! The listing is the advanced search for not-yet-aired titles, 20 rows a
//! page, paged by `show=` offset until the navigation bar has no "Next".

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::document::{Document, Node};
use super::fetcher::{PageFetcher, SiteClient};
use super::{ListOptions, Listing, PageBudget, SourceAdapter, apply_detail};
use crate::config::{ScraperConfig, SourceConfig};
use crate::constants::limits::MAL_PAGE_SIZE;
use crate::error::{Result, ScrapeError};
use crate::models::record::{EndDate, Kind, Record};
use crate::models::staff::Staff;
use crate::parser::{Role, RoleTable, credit, parse_date, parse_date_range};

const NAME: &str = "mal";

const LATEST_PATH: &str = "/anime.php?q=&type=0&score=0&status=3&tag=&p=0&r=0&sm=0&sd=0&sy=0&em=0&ed=0&ey=0&c[0]=a&c[1]=b&c[2]=d&c[3]=e&gx=0";

pub const ROLES: RoleTable = &[
    (Role::Director, &["Director"]),
    (Role::Original, &["Creator", "Original Creator"]),
    (Role::CharacterDesigner, &["Character Design"]),
    (Role::Writer, &["Script", "Series Composition"]),
    (Role::Music, &["Theme Song Performance", "Music"]),
];

/// What the sidebar prints when a studio or producer list is blank.
const NONE_MARKERS: [&str; 3] = ["None found", "Not found", "add some"];

/// One page of search results.
#[derive(Debug, Default)]
pub struct ListingPage {
    pub rows: Vec<Record>,
    pub has_next: bool,
}

#[must_use]
pub fn latest_path(offset: usize) -> String {
    format!("{LATEST_PATH}&show={offset}")
}

fn listing_date(text: &str, title: &str, column: &'static str) -> Option<chrono::NaiveDate> {
    parse_date(text).unwrap_or_else(|e| {
        debug!(source = NAME, title, column, error = %e, "Unparseable listing date");
        None
    })
}

fn parse_row(tds: &[Node<'_>]) -> Option<Record> {
    let a = tds[1].select_first("a")?;
    let title = a.text();
    if title.is_empty() {
        return None;
    }

    let img_url = tds[0]
        .select_first("img")
        .and_then(|img| img.attr("data-src").or_else(|| img.attr("src")))
        .map(|src| {
            src.strip_suffix("t.jpg")
                .map_or_else(|| src.to_string(), |stem| format!("{stem}l.jpg"))
        })
        .unwrap_or_default();

    let episodes = tds[3].text().parse().unwrap_or(-1);
    let start = listing_date(&tds[4].text(), &title, "start");
    let end = listing_date(&tds[5].text(), &title, "end");

    Some(
        Record::new(title)
            .with_url(a.attr("href").unwrap_or_default())
            .with_img_url(img_url)
            .with_kind(Kind::from_label(&tds[2].text()))
            .with_episodes(episodes)
            .with_start_date(start)
            .with_end_date(end.into()),
    )
}

/// Result rows and the "Next" marker. `None` when the page has no result
/// table at all.
#[must_use]
pub fn parse_listing(body: &str) -> Option<ListingPage> {
    let doc = Document::parse(body);
    let table = doc.select_first(r#"#content form[method="GET"] ~ table"#)?;

    let rows = table
        .select_all("tr")
        .iter()
        .filter_map(|tr| {
            let tds = tr.select_all("td.borderClass");
            if tds.len() == 6 { parse_row(&tds) } else { None }
        })
        .collect();

    let has_next = doc
        .select_first(r#"#content form[method="GET"] ~ div.borderClass"#)
        .and_then(|nav| nav.select_all("a").last().map(Node::text))
        .is_some_and(|label| label.contains("Next"));

    Some(ListingPage { rows, has_next })
}

fn split_names(val: &str) -> Option<Staff> {
    if NONE_MARKERS.iter().any(|marker| val.contains(marker)) {
        return None;
    }
    let names: Vec<String> = val.split(',').map(|n| n.trim().to_string()).collect();
    let staff = Staff::from(names);
    (!staff.is_empty()).then_some(staff)
}

fn apply_sidebar(detail: &mut Record, key: &str, val: &str) -> Result<()> {
    match key {
        "Type" => detail.kind = Kind::from_label(val),
        "Episodes" => {
            let episodes = val
                .parse()
                .map_err(|_| ScrapeError::field("episodes", val))?;
            detail.set_episodes(episodes);
        }
        "Aired" => {
            let (start, end) = parse_date_range(val)?;
            detail.start_date = start;
            detail.end_date = match end {
                EndDate::Unknown if start.is_some() && !val.contains(" to ") => EndDate::OneShot,
                other => other,
            };
        }
        "Studios" => {
            if let Some(studio) = split_names(val) {
                detail.studio = studio;
            }
        }
        "Producers" => {
            if detail.studio.is_empty()
                && let Some(producers) = split_names(val)
            {
                detail.studio = producers;
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_sidebar(doc: &Document, detail: &mut Record) {
    let Some(heading) = doc
        .select_all("#content h2")
        .into_iter()
        .find(|h2| h2.text() == "Information")
    else {
        debug!(source = NAME, "Information sidebar not found");
        return;
    };

    for div in heading.following_siblings() {
        if div.tag_name() != "div" {
            continue;
        }
        let Some(key) = div.select_first("span.dark_text").map(|span| span.text()) else {
            continue;
        };
        let key = key.trim_end_matches(':');
        let val = div.inline_text(&["a"]);

        if let Err(e) = apply_sidebar(detail, key, &val) {
            debug!(source = NAME, field = key, error = %e, "Skipping sidebar field");
        }
    }
}

fn parse_staff(doc: &Document, detail: &mut Record) {
    let Some(table) = doc.select_first(r#"a[name="staff"] ~ table"#) else {
        return;
    };

    for tr in table.select_all("tr") {
        let tds = tr.select_all("td");
        let Some(td) = tds.get(1) else {
            continue;
        };
        let (Some(roles), Some(name)) = (td.select_first("small"), td.select_first("a")) else {
            continue;
        };

        let roles = roles.text();
        let labels: Vec<&str> = roles.split(", ").collect();
        credit(detail, ROLES, &name.text().replace(',', ""), &labels);
    }
}

fn parse_summary(doc: &Document) -> String {
    doc.select_first(r#"p[itemprop="description"]"#)
        .or_else(|| doc.select_first("#content #horiznav_nav ~ div td"))
        .map(|node| node.own_text().join("\n"))
        .unwrap_or_default()
}

/// Everything the detail page says, as a record of its own.
#[must_use]
pub fn parse_detail(body: &str) -> Record {
    let doc = Document::parse(body);
    let mut detail = Record::default();

    parse_sidebar(&doc, &mut detail);
    parse_staff(&doc, &mut detail);
    detail.summary = parse_summary(&doc);

    detail
}

pub struct MalAdapter {
    site: SiteClient,
    budget: PageBudget,
}

impl MalAdapter {
    #[must_use]
    pub fn new(source: SourceConfig, scraper: &ScraperConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            site: SiteClient::new(NAME, source, scraper, fetcher),
            budget: PageBudget::new(scraper),
        }
    }

    async fn latest(&self, options: &ListOptions) -> Vec<Record> {
        let mut budget = self.budget;
        let mut results = Vec::new();

        for page in 0..budget.max_pages {
            let path = latest_path(page * MAL_PAGE_SIZE);
            info!(
                source = NAME,
                page = page + 1,
                results = results.len(),
                "Acquiring listing page"
            );

            let listing = match self.site.get_page(&path).await {
                Some(body) => parse_listing(&body),
                None => None,
            };

            let Some(listing) = listing else {
                if budget.miss() {
                    continue;
                }
                warn!(source = NAME, page = page + 1, "Too many empty pages, stopping");
                break;
            };
            budget.hit();

            results.extend(
                listing
                    .rows
                    .into_iter()
                    .filter(|record| options.accepts_kind(record.kind)),
            );

            if options.limit_reached(results.len()) || !listing.has_next {
                break;
            }
        }

        results
    }
}

#[async_trait]
impl SourceAdapter for MalAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_records(&self, options: &ListOptions) -> Vec<Record> {
        info!(event = "listing_started", source = NAME, listing = ?options.listing);

        let mut results = match &options.listing {
            Listing::Latest => self.latest(options).await,
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
