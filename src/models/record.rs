use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::staff::Staff;

const ID_TITLE_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Tv,
    Movie,
    Ova,
    Ona,
    Oav,
    Special,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Kind {
    /// Maps a site label ("TV", "Movie", "oav", ...) to a kind. Unrecognized
    /// labels map to `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "tv" => Self::Tv,
            "movie" => Self::Movie,
            "ova" => Self::Ova,
            "ona" => Self::Ona,
            "oav" => Self::Oav,
            "special" => Self::Special,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Movie => "movie",
            Self::Ova => "ova",
            Self::Ona => "ona",
            Self::Oav => "oav",
            Self::Special => "special",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

/// Broadcast season by month, January first.
pub const SEASONS: [Season; 12] = [
    Season::Winter,
    Season::Winter,
    Season::Spring,
    Season::Spring,
    Season::Spring,
    Season::Summer,
    Season::Summer,
    Season::Summer,
    Season::Autumn,
    Season::Autumn,
    Season::Autumn,
    Season::Winter,
];

impl Season {
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        SEASONS[date.month0() as usize]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
        };
        f.write_str(s)
    }
}

/// How a title's run ends.
///
/// `OneShot` is for releases that have a single air date (movies, specials);
/// `Unknown` means the source simply did not say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EndDate {
    #[default]
    Unknown,
    Ongoing,
    OneShot,
    Ended(NaiveDate),
}

impl EndDate {
    #[must_use]
    pub const fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Ended(date) => Some(date),
            _ => None,
        }
    }
}

impl From<Option<NaiveDate>> for EndDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Unknown, Self::Ended)
    }
}

impl fmt::Display for EndDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => Ok(()),
            Self::Ongoing => f.write_str("ongoing"),
            Self::OneShot => f.write_str("one-shot"),
            Self::Ended(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for EndDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(Self::Unknown),
            Some("ongoing") => Ok(Self::Ongoing),
            Some("one-shot") => Ok(Self::OneShot),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Self::Ended)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// The emptiness predicate used by merging: a value that is "empty" may be
/// filled from another record, anything else is kept.
pub trait Emptiness {
    fn is_empty_value(&self) -> bool;
}

impl Emptiness for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for Vec<String> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for i32 {
    fn is_empty_value(&self) -> bool {
        *self <= 0
    }
}

impl Emptiness for u32 {
    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl Emptiness for bool {
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl<T> Emptiness for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl Emptiness for Kind {
    fn is_empty_value(&self) -> bool {
        *self == Self::Unknown
    }
}

impl Emptiness for EndDate {
    fn is_empty_value(&self) -> bool {
        *self == Self::Unknown
    }
}

impl Emptiness for Staff {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// Every mergeable field of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Url,
    ImgUrl,
    Website,
    Title,
    Kind,
    StartDate,
    EndDate,
    SeasonNumber,
    Episodes,
    Summary,
    Director,
    Writer,
    Music,
    CharacterDesigner,
    Original,
    Studio,
    AltTitles,
    Populated,
}

impl Field {
    pub const ALL: [Self; 18] = [
        Self::Url,
        Self::ImgUrl,
        Self::Website,
        Self::Title,
        Self::Kind,
        Self::StartDate,
        Self::EndDate,
        Self::SeasonNumber,
        Self::Episodes,
        Self::Summary,
        Self::Director,
        Self::Writer,
        Self::Music,
        Self::CharacterDesigner,
        Self::Original,
        Self::Studio,
        Self::AltTitles,
        Self::Populated,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::ImgUrl => "img_url",
            Self::Website => "website",
            Self::Title => "title",
            Self::Kind => "kind",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::SeasonNumber => "season_number",
            Self::Episodes => "episodes",
            Self::Summary => "summary",
            Self::Director => "director",
            Self::Writer => "writer",
            Self::Music => "music",
            Self::CharacterDesigner => "character_designer",
            Self::Original => "original",
            Self::Studio => "studio",
            Self::AltTitles => "alt_titles",
            Self::Populated => "populated",
        }
    }
}

/// Memoized identity slug. Never participates in equality.
#[derive(Debug, Clone, Default)]
struct IdCache(OnceLock<String>);

impl PartialEq for IdCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// One title's known metadata, normalized across catalog sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "super::show_list::RecordJson", from = "super::show_list::RecordJson")]
pub struct Record {
    pub url: String,
    pub img_url: String,
    pub website: String,
    pub title: String,
    pub kind: Kind,
    pub start_date: Option<NaiveDate>,
    pub end_date: EndDate,
    /// Installment number from a `(TV 2)` style annotation, 0 when absent.
    pub season_number: u32,
    /// -1 when unknown.
    pub episodes: i32,
    pub summary: String,
    pub director: Staff,
    pub writer: Staff,
    pub music: Staff,
    pub character_designer: Staff,
    pub original: Staff,
    pub studio: Staff,
    pub alt_titles: Vec<String>,
    pub populated: bool,
    id: IdCache,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            url: String::new(),
            img_url: String::new(),
            website: String::new(),
            title: String::new(),
            kind: Kind::Unknown,
            start_date: None,
            end_date: EndDate::Unknown,
            season_number: 0,
            episodes: -1,
            summary: String::new(),
            director: Staff::Unset,
            writer: Staff::Unset,
            music: Staff::Unset,
            character_designer: Staff::Unset,
            original: Staff::Unset,
            studio: Staff::Unset,
            alt_titles: Vec::new(),
            populated: false,
            id: IdCache::default(),
        }
    }
}

impl Record {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = img_url.into();
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn with_start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    #[must_use]
    pub const fn with_end_date(mut self, end: EndDate) -> Self {
        self.end_date = end;
        self
    }

    #[must_use]
    pub const fn with_season_number(mut self, season_number: u32) -> Self {
        self.season_number = season_number;
        self
    }

    #[must_use]
    pub fn with_episodes(mut self, episodes: i32) -> Self {
        self.set_episodes(episodes);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Stores an episode count; anything negative collapses to the -1 sentinel.
    pub fn set_episodes(&mut self, episodes: i32) {
        self.episodes = episodes.max(-1);
    }

    /// Broadcast season of the first air date.
    #[must_use]
    pub fn season(&self) -> Option<Season> {
        self.start_date.map(Season::from_date)
    }

    #[must_use]
    pub fn is_winter(&self) -> bool {
        self.season() == Some(Season::Winter)
    }

    #[must_use]
    pub fn is_spring(&self) -> bool {
        self.season() == Some(Season::Spring)
    }

    #[must_use]
    pub fn is_summer(&self) -> bool {
        self.season() == Some(Season::Summer)
    }

    #[must_use]
    pub fn is_autumn(&self) -> bool {
        self.season() == Some(Season::Autumn)
    }

    /// Stable slug: up to 12 lowercase alphanumerics of the title, then the
    /// first air date as `DDMM` when known.
    ///
    /// Computed on first use. Filling the title or start date through
    /// [`Record::fill_field`] recomputes it; assigning those fields directly
    /// does not.
    pub fn id(&self) -> &str {
        self.id.0.get_or_init(|| {
            let mut id: String = self
                .title
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .take(ID_TITLE_PREFIX_LEN)
                .collect();
            if let Some(date) = self.start_date {
                id.push_str(&format!("{:02}{:02}", date.day(), date.month()));
            }
            id
        })
    }

    #[must_use]
    pub fn is_field_empty(&self, field: Field) -> bool {
        match field {
            Field::Url => self.url.is_empty_value(),
            Field::ImgUrl => self.img_url.is_empty_value(),
            Field::Website => self.website.is_empty_value(),
            Field::Title => self.title.is_empty_value(),
            Field::Kind => self.kind.is_empty_value(),
            Field::StartDate => self.start_date.is_empty_value(),
            Field::EndDate => self.end_date.is_empty_value(),
            Field::SeasonNumber => self.season_number.is_empty_value(),
            Field::Episodes => self.episodes.is_empty_value(),
            Field::Summary => self.summary.is_empty_value(),
            Field::Director => self.director.is_empty_value(),
            Field::Writer => self.writer.is_empty_value(),
            Field::Music => self.music.is_empty_value(),
            Field::CharacterDesigner => self.character_designer.is_empty_value(),
            Field::Original => self.original.is_empty_value(),
            Field::Studio => self.studio.is_empty_value(),
            Field::AltTitles => self.alt_titles.is_empty_value(),
            Field::Populated => self.populated.is_empty_value(),
        }
    }

    /// Copies one field from `other` when ours is empty and theirs is not.
    /// Returns whether anything was copied.
    pub fn fill_field(&mut self, other: &Self, field: Field) -> bool {
        let copied = match field {
            Field::Url => fill(&mut self.url, &other.url),
            Field::ImgUrl => fill(&mut self.img_url, &other.img_url),
            Field::Website => fill(&mut self.website, &other.website),
            Field::Title => fill(&mut self.title, &other.title),
            Field::Kind => fill(&mut self.kind, &other.kind),
            Field::StartDate => fill(&mut self.start_date, &other.start_date),
            Field::EndDate => fill(&mut self.end_date, &other.end_date),
            Field::SeasonNumber => fill(&mut self.season_number, &other.season_number),
            Field::Episodes => fill(&mut self.episodes, &other.episodes),
            Field::Summary => fill(&mut self.summary, &other.summary),
            Field::Director => fill(&mut self.director, &other.director),
            Field::Writer => fill(&mut self.writer, &other.writer),
            Field::Music => fill(&mut self.music, &other.music),
            Field::CharacterDesigner => {
                fill(&mut self.character_designer, &other.character_designer)
            }
            Field::Original => fill(&mut self.original, &other.original),
            Field::Studio => fill(&mut self.studio, &other.studio),
            Field::AltTitles => fill(&mut self.alt_titles, &other.alt_titles),
            Field::Populated => fill(&mut self.populated, &other.populated),
        };

        if copied && matches!(field, Field::Title | Field::StartDate) {
            self.id = IdCache::default();
        }
        copied
    }

    /// Fills each empty field from `other`, skipping fields `allow` rejects.
    /// Returns the fields that were copied.
    pub fn fill_from_with(&mut self, other: &Self, allow: impl Fn(Field) -> bool) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&field| allow(field) && self.fill_field(other, field))
            .collect()
    }

    pub fn fill_from(&mut self, other: &Self) -> Vec<Field> {
        self.fill_from_with(other, |_| true)
    }

    /// `key: value` lines for every field, in declaration order.
    #[must_use]
    pub fn dump(&self) -> Vec<String> {
        let season = self.season().map(|s| s.to_string()).unwrap_or_default();
        let start = self
            .start_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        vec![
            format!("id: {}", self.id()),
            format!("url: {}", self.url),
            format!("img_url: {}", self.img_url),
            format!("website: {}", self.website),
            format!("title: {}", self.title),
            format!("kind: {}", self.kind),
            format!("start_date: {start}"),
            format!("end_date: {}", self.end_date),
            format!("season: {season}"),
            format!("season_number: {}", self.season_number),
            format!("episodes: {}", self.episodes),
            format!("summary: {}", self.summary),
            format!("director: {}", self.director),
            format!("writer: {}", self.writer),
            format!("music: {}", self.music),
            format!("character_designer: {}", self.character_designer),
            format!("original: {}", self.original),
            format!("studio: {}", self.studio),
            format!("alt_titles: {}", self.alt_titles.join(", ")),
            format!("populated: {}", self.populated),
        ]
    }
}

fn fill<T: Emptiness + Clone>(target: &mut T, source: &T) -> bool {
    if target.is_empty_value() && !source.is_empty_value() {
        *target = source.clone();
        true
    } else {
        false
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" [{}]", self.title, self.kind)
    }
}
