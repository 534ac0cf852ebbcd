//! Anime News Network encyclopedia.
//!
//! Listing rows carry `Title (KIND N)` names and `YYYY-MM-DD to YYYY-MM-DD`
//! vintages. Detail pages are a series of `div.encyc-info-type` blocks whose
//! element id (`infotype-N`) says what they hold, followed by staff credits
//! in `div.ENTAB` blocks.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::document::{Document, Node, require};
use super::fetcher::{PageFetcher, SiteClient};
use super::{ListOptions, Listing, SourceAdapter, apply_detail};
use crate::config::{ScraperConfig, SourceConfig};
use crate::constants::defaults::ANN_LISTING_LIMIT;
use crate::error::{Result, ScrapeError};
use crate::models::record::{EndDate, Kind, Record};
use crate::parser::{Role, RoleTable, credit, parse_date, parse_date_range, parse_title};

const NAME: &str = "ann";

const LATEST_PATH: &str = "/encyclopedia/anime-list.php?showdate=1&sort=date&invertsort=1";
const UPCOMING_PATH: &str = "/encyclopedia/anime/upcoming/";
const UPCOMING_SECTIONS: [(&str, Kind); 3] =
    [("tv", Kind::Tv), ("movie", Kind::Movie), ("oav", Kind::Oav)];

pub const ROLES: RoleTable = &[
    (Role::Director, &["Director"]),
    (Role::Writer, &["Series Composition", "Script", "Screenplay"]),
    (Role::Music, &["Music"]),
    (Role::Original, &["Original creator", "Original Work"]),
    (
        Role::CharacterDesigner,
        &["Character Design", "Original Character Design"],
    ),
    (Role::Studio, &["Animation Production"]),
];

mod infotype {
    pub const ALT_TITLES: u32 = 2;
    pub const EPISODES: u32 = 3;
    pub const VINTAGE: u32 = 7;
    pub const PREMIERE: u32 = 9;
    pub const WEBSITE: u32 = 10;
    pub const SUMMARY: u32 = 12;
    pub const PICTURE: u32 = 19;
    pub const EPISODE_TITLES: u32 = 25;
}

fn kind_flag(kind: Kind) -> Option<char> {
    match kind {
        Kind::Tv => Some('T'),
        Kind::Movie => Some('M'),
        Kind::Oav | Kind::Ova => Some('O'),
        Kind::Ona => Some('N'),
        Kind::Special | Kind::Unknown => None,
    }
}

#[must_use]
pub fn latest_path(options: &ListOptions) -> String {
    let limit = options.limit.unwrap_or(ANN_LISTING_LIMIT);
    let mut path = format!("{LATEST_PATH}&limit_to={limit}");

    let kinds = if options.kinds.is_empty() {
        &[Kind::Tv][..]
    } else {
        &options.kinds[..]
    };

    let mut flags: Vec<char> = kinds.iter().copied().filter_map(kind_flag).collect();
    flags.dedup();
    for flag in flags {
        path.push_str(&format!("&show{flag}=1"));
    }
    path
}

fn date_range_or_unknown(text: &str, title: &str) -> (Option<chrono::NaiveDate>, EndDate) {
    parse_date_range(text).unwrap_or_else(|e| {
        debug!(source = NAME, title, error = %e, "Unparseable listing date");
        (None, EndDate::Unknown)
    })
}

/// Rows of the encyclopedia listing table.
#[must_use]
pub fn parse_latest(body: &str) -> Vec<Record> {
    let doc = Document::parse(body);
    let Some(table) = doc.select_first(r#"#content-zone form[name="listform"] ~ table[border="0"]"#)
    else {
        debug!(source = NAME, "Listing table not found");
        return Vec::new();
    };

    let mut records = Vec::new();
    for tr in table.select_all("tr") {
        let tds = tr.select_all("td");
        if tds.len() < 2 {
            continue;
        }

        let parsed = parse_title(&tds[0].text());
        if parsed.title.is_empty() {
            continue;
        }

        let url = tds[0]
            .select_first("a")
            .and_then(|a| a.attr("href"))
            .unwrap_or_default();
        let (start, end) = date_range_or_unknown(&tds[1].text(), &parsed.title);

        records.push(
            Record::new(parsed.title.clone())
                .with_url(url)
                .with_kind(parsed.kind_or(Kind::Unknown))
                .with_season_number(parsed.season_number)
                .with_start_date(start)
                .with_end_date(end),
        );
    }
    records
}

/// Rows of one upcoming section; every row takes the section's kind.
#[must_use]
pub fn parse_upcoming(body: &str, kind: Kind) -> Vec<Record> {
    let doc = Document::parse(body);
    let Some(table) = doc.select_first("#content-zone table.datalist") else {
        debug!(source = NAME, %kind, "Upcoming table not found");
        return Vec::new();
    };

    let mut records = Vec::new();
    for tr in table.select_all("tr") {
        let tds = tr.select_all("td");
        if tds.len() < 3 {
            continue;
        }

        let Some(a) = tds[1].select_first("a") else {
            continue;
        };
        let parsed = parse_title(&a.text());

        let img_url = tds[0]
            .select_first("img")
            .and_then(|img| img.attr("src"))
            .map(|src| src.replace("thumbnails/fit200x200", "images"))
            .unwrap_or_default();
        let (start, _) = date_range_or_unknown(&tds[2].text(), &parsed.title);

        records.push(
            Record::new(parsed.title.clone())
                .with_url(a.attr("href").unwrap_or_default())
                .with_img_url(img_url)
                .with_kind(kind)
                .with_season_number(parsed.season_number)
                .with_summary(tds[1].own_text().join("\n"))
                .with_start_date(start),
        );
    }
    records
}

fn infotype_id(info: &Node<'_>) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"infotype-(\d+)$").expect("Invalid regex pattern defined in code")
    });
    re.captures(info.attr("id")?)?.get(1)?.as_str().parse().ok()
}

fn episode_count_from_titles(text: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"We have (\d+)$").expect("Invalid regex pattern defined in code")
    });
    re.captures(text.trim())?.get(1)?.as_str().parse().ok()
}

/// Vintage strings sometimes trail a region note: `2024-04-06 (Japan)`.
fn strip_note(text: &str) -> &str {
    text.find(" (").map_or(text, |idx| &text[..idx]).trim()
}

fn apply_info(detail: &mut Record, info: Node<'_>, id: u32) -> Result<()> {
    match id {
        infotype::ALT_TITLES => {
            detail.alt_titles = info
                .select_all("div.tab")
                .iter()
                .map(Node::text)
                .filter(|t| !t.is_empty())
                .collect();
        }
        infotype::EPISODES => {
            let text = require(info.select_first("span"), "episodes")?.text();
            let episodes = text
                .parse()
                .map_err(|_| ScrapeError::field("episodes", text.clone()))?;
            detail.set_episodes(episodes);
        }
        infotype::VINTAGE => {
            let text = require(info.select_first("span"), "vintage")?.text();
            let (start, end) = parse_date_range(strip_note(&text))?;
            detail.start_date = start;
            detail.end_date = end;
        }
        infotype::PREMIERE => {
            let text = require(info.select_first("div.tab"), "premiere")?.text();
            detail.start_date = parse_date(strip_note(&text))?;
            detail.end_date = EndDate::OneShot;
        }
        infotype::WEBSITE => {
            let href = require(info.select_first("a"), "website")?
                .attr("href")
                .ok_or_else(|| ScrapeError::field("website", "link without href"))?;
            detail.website = href.to_string();
        }
        infotype::SUMMARY => {
            detail.summary = require(info.select_first("span"), "summary")?.text();
        }
        infotype::PICTURE => {
            let picture = require(info.select_first("a"), "img_url")?;
            let src = picture
                .attr("href")
                .or_else(|| picture.select_first("img").and_then(|img| img.attr("src")))
                .ok_or_else(|| ScrapeError::field("img_url", "no image link"))?;
            detail.img_url = src.to_string();
        }
        infotype::EPISODE_TITLES => {
            let text = require(info.select_first("a"), "episodes")?.text();
            let episodes = episode_count_from_titles(&text)
                .ok_or_else(|| ScrapeError::field("episodes", text.clone()))?;
            detail.set_episodes(episodes);
        }
        _ => {}
    }
    Ok(())
}

/// Everything the detail page says, as a record of its own.
#[must_use]
pub fn parse_detail(body: &str) -> Record {
    let doc = Document::parse(body);
    let mut detail = Record::default();

    for info in doc.select_all("#content-zone div.encyc-info-type") {
        let Some(id) = infotype_id(&info) else {
            continue;
        };
        if let Err(e) = apply_info(&mut detail, info, id) {
            debug!(source = NAME, infotype = id, error = %e, "Skipping info field");
        }
    }

    // Credits sit one level above the credits table; the markup there does
    // not nest cleanly.
    let Some(zone) = doc.select_first("#content-zone") else {
        return detail;
    };
    for entry in zone.select_all("div.ENTAB") {
        let Some(label) = entry.select_first("b").map(|b| b.text()) else {
            continue;
        };
        for a in entry.select_all("a") {
            credit(&mut detail, ROLES, &a.text(), &[label.as_str()]);
        }
    }

    detail
}

pub struct AnnAdapter {
    site: SiteClient,
}

impl AnnAdapter {
    #[must_use]
    pub fn new(source: SourceConfig, scraper: &ScraperConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            site: SiteClient::new(NAME, source, scraper, fetcher),
        }
    }

    async fn latest(&self, options: &ListOptions) -> Vec<Record> {
        let path = latest_path(options);
        let Some(body) = self.site.get_page(&path).await else {
            return Vec::new();
        };
        parse_latest(&body)
    }

    async fn upcoming(&self, options: &ListOptions) -> Vec<Record> {
        let mut results = Vec::new();

        for (section, kind) in UPCOMING_SECTIONS {
            if !options.accepts_kind(kind) {
                continue;
            }

            let path = format!("{UPCOMING_PATH}{section}");
            let Some(body) = self.site.get_page(&path).await else {
                continue;
            };

            let rows = parse_upcoming(&body, kind);
            info!(source = NAME, section, rows = rows.len(), "Upcoming section acquired");
            results.extend(rows);
        }

        results
    }
}

#[async_trait]
impl SourceAdapter for AnnAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_records(&self, options: &ListOptions) -> Vec<Record> {
        info!(event = "listing_started", source = NAME, listing = ?options.listing);

        let mut results = match &options.listing {
            Listing::Latest => self.latest(options).await,
            Listing::Upcoming => self.upcoming(options).await,
            Listing::Tag(tag) => {
                warn!(source = NAME, tag = %tag, "Tag listings are not supported");
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
