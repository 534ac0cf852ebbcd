//! The serialized record format: `{"shows": [...]}` with one object per
//! record. Unknown values are written as `null` and read back as each
//! field's empty default.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::record::{EndDate, Kind, Record};
use super::staff::Staff;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowList {
    #[serde(default)]
    pub shows: Vec<Record>,
}

impl ShowList {
    #[must_use]
    pub const fn new(shows: Vec<Record>) -> Self {
        Self { shows }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse show list JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize show list")
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read show list: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid show list: {}", path.display()))
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write show list: {}", path.display()))?;
        info!(count = self.shows.len(), "Show list written to {}", path.display());
        Ok(())
    }
}

/// Wire shape of a [`Record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordJson {
    #[serde(skip_deserializing)]
    pub id: Option<String>,
    pub url: Option<String>,
    pub img_url: Option<String>,
    pub website: Option<String>,
    pub title: Option<String>,
    pub kind: Option<Kind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: EndDate,
    pub season: Option<String>,
    pub season_number: Option<u32>,
    pub episodes: Option<i32>,
    pub summary: Option<String>,
    pub director: Staff,
    pub writer: Staff,
    pub music: Staff,
    pub character_designer: Staff,
    pub original: Staff,
    pub studio: Staff,
    pub alt_titles: Vec<String>,
    pub populated: bool,
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

impl From<Record> for RecordJson {
    fn from(record: Record) -> Self {
        let id = non_empty(record.id().to_string());
        let season = record.season().map(|s| s.to_string());

        Self {
            id,
            url: non_empty(record.url),
            img_url: non_empty(record.img_url),
            website: non_empty(record.website),
            title: non_empty(record.title),
            kind: (record.kind != Kind::Unknown).then_some(record.kind),
            start_date: record.start_date,
            end_date: record.end_date,
            season,
            season_number: (record.season_number > 0).then_some(record.season_number),
            episodes: (record.episodes >= 0).then_some(record.episodes),
            summary: non_empty(record.summary),
            director: record.director,
            writer: record.writer,
            music: record.music,
            character_designer: record.character_designer,
            original: record.original,
            studio: record.studio,
            alt_titles: record.alt_titles,
            populated: record.populated,
        }
    }
}

impl From<RecordJson> for Record {
    fn from(json: RecordJson) -> Self {
        let mut record = Self::new(json.title.unwrap_or_default());
        record.url = json.url.unwrap_or_default();
        record.img_url = json.img_url.unwrap_or_default();
        record.website = json.website.unwrap_or_default();
        record.kind = json.kind.unwrap_or_default();
        record.start_date = json.start_date;
        record.end_date = json.end_date;
        record.season_number = json.season_number.unwrap_or(0);
        record.set_episodes(json.episodes.unwrap_or(-1));
        record.summary = json.summary.unwrap_or_default();
        record.director = json.director;
        record.writer = json.writer;
        record.music = json.music;
        record.character_designer = json.character_designer;
        record.original = json.original;
        record.studio = json.studio;
        record.alt_titles = json.alt_titles;
        record.populated = json.populated;
        record
    }
}
