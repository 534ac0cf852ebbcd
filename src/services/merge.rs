//! Combining records for the same title scraped from different sites.
//!
//! Field-level merging only ever fills empty fields. Collection merging pairs
//! each left-hand record with the first right-hand record whose title
//! matches, greedily, and keeps everything that found no partner.

use strsim::jaro_winkler;
use tracing::{debug, info};

use crate::config::MergeConfig;
use crate::constants::defaults::SIMILARITY_THRESHOLD;
use crate::models::record::{Field, Record};

/// Decides whether two titles name the same show.
pub trait TitleMatcher: Send + Sync {
    fn matches(&self, a: &str, b: &str) -> bool;
}

impl<F> TitleMatcher for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn matches(&self, a: &str, b: &str) -> bool {
        self(a, b)
    }
}

/// Case-insensitive equality, else Jaro-Winkler similarity of the lowercased
/// titles at or above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JaroWinkler {
    pub threshold: f64,
}

impl Default for JaroWinkler {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl JaroWinkler {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn score(a: &str, b: &str) -> f64 {
        jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
    }
}

impl TitleMatcher for JaroWinkler {
    fn matches(&self, a: &str, b: &str) -> bool {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        a == b || jaro_winkler(&a, &b) >= self.threshold
    }
}

/// Fills every empty field of `a` from `b`.
#[must_use]
pub fn merge(a: Record, b: &Record) -> Record {
    merge_with(a, b, |_| true)
}

/// Like [`merge`], but `allow` can veto individual fields.
#[must_use]
pub fn merge_with(mut a: Record, b: &Record, allow: impl Fn(Field) -> bool) -> Record {
    let filled = a.fill_from_with(b, allow);
    if !filled.is_empty() {
        debug!(
            title = %a.title,
            fields = ?filled.iter().map(|f| f.name()).collect::<Vec<_>>(),
            "Merged fields"
        );
    }
    a
}

/// Merges two collections into one.
///
/// Both sides are ordered by title first. Every record of `a` appears in the
/// result, merged with at most one record of `b`; records of `b` that nobody
/// claimed follow, unmodified.
#[must_use]
pub fn merge_all(
    mut a: Vec<Record>,
    mut b: Vec<Record>,
    matcher: &dyn TitleMatcher,
    allow: &dyn Fn(Field) -> bool,
) -> Vec<Record> {
    a.sort_by(|x, y| x.title.cmp(&y.title));
    b.sort_by(|x, y| x.title.cmp(&y.title));

    let mut candidates: Vec<Option<Record>> = b.into_iter().map(Some).collect();
    let mut merged = 0_u64;
    let mut result = Vec::with_capacity(a.len() + candidates.len());

    for record in a {
        let partner = candidates.iter_mut().find(|slot| {
            slot.as_ref()
                .is_some_and(|candidate| matcher.matches(&record.title, &candidate.title))
        });

        match partner.and_then(Option::take) {
            Some(other) => {
                merged += 1;
                result.push(merge_with(record, &other, allow));
            }
            None => result.push(record),
        }
    }

    let matched_len = result.len();
    result.extend(candidates.into_iter().flatten());
    let unmatched = result.len() - matched_len;

    metrics::counter!("showscrape_records_merged_total").increment(merged);
    info!(
        event = "merge_finished",
        merged,
        unmatched,
        results = result.len(),
        "Collections merged"
    );
    result
}

/// A configured matcher plus field veto, applied to whole collections.
pub struct Merger {
    matcher: Box<dyn TitleMatcher>,
    allow: Box<dyn Fn(Field) -> bool + Send + Sync>,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new(JaroWinkler::default())
    }
}

impl Merger {
    #[must_use]
    pub fn new(matcher: impl TitleMatcher + 'static) -> Self {
        Self {
            matcher: Box::new(matcher),
            allow: Box::new(|_| true),
        }
    }

    #[must_use]
    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(JaroWinkler::new(config.similarity_threshold))
    }

    /// Skips any field for which `allow` returns `false`.
    #[must_use]
    pub fn with_filter(mut self, allow: impl Fn(Field) -> bool + Send + Sync + 'static) -> Self {
        self.allow = Box::new(allow);
        self
    }

    #[must_use]
    pub fn merge_all(&self, a: Vec<Record>, b: Vec<Record>) -> Vec<Record> {
        merge_all(a, b, self.matcher.as_ref(), &*self.allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{EndDate, Kind};
    use crate::models::staff::Staff;
    use chrono::NaiveDate;

    fn titled(title: &str) -> Record {
        Record::new(title)
    }

    fn titles(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    fn merge_default(a: Vec<Record>, b: Vec<Record>) -> Vec<Record> {
        Merger::default().merge_all(a, b)
    }

    #[test]
    fn test_merge_with_empty_record_is_noop() {
        let a = Record::new("Frieren")
            .with_url("/anime/1")
            .with_kind(Kind::Tv)
            .with_episodes(28)
            .with_start_date(NaiveDate::from_ymd_opt(2023, 9, 29));
        assert_eq!(merge(a.clone(), &Record::default()), a);
    }

    #[test]
    fn test_merge_never_overwrites() {
        let a = Record::new("Frieren").with_episodes(28);
        let b = Record::new("Sousou no Frieren")
            .with_episodes(12)
            .with_summary("An elf mage.");
        let merged = merge(a, &b);
        assert_eq!(merged.title, "Frieren");
        assert_eq!(merged.episodes, 28);
        assert_eq!(merged.summary, "An elf mage.");
    }

    #[test]
    fn test_merge_fills_staff_and_dates() {
        let mut b = Record::new("Show").with_end_date(EndDate::Ongoing);
        b.director = Staff::from("A");
        let merged = merge(Record::new("Show"), &b);
        assert_eq!(merged.director, Staff::Single("A".to_string()));
        assert_eq!(merged.end_date, EndDate::Ongoing);
    }

    #[test]
    fn test_merge_with_veto() {
        let b = Record::new("Show").with_summary("text").with_episodes(3);
        let merged = merge_with(Record::new("Show"), &b, |f| f != Field::Summary);
        assert!(merged.summary.is_empty());
        assert_eq!(merged.episodes, 3);
    }

    #[test]
    fn test_matcher_exact_ignores_case() {
        let matcher = JaroWinkler::default();
        assert!(matcher.matches("SPY x FAMILY", "spy x family"));
        assert!(matcher.matches("Spy x Family", "Spy Family"));
        assert!(!matcher.matches("One Piece", "Bleach"));
    }

    #[test]
    fn test_threshold_boundary() {
        let matcher = JaroWinkler::default();
        // 0.7777...: just below.
        assert!(JaroWinkler::score("naruto", "boruto") < SIMILARITY_THRESHOLD);
        assert!(!matcher.matches("naruto", "boruto"));
        // 0.8222...: just above.
        assert!(JaroWinkler::score("abc", "abd") > SIMILARITY_THRESHOLD);
        assert!(matcher.matches("abc", "abd"));

        let exact = JaroWinkler::new(JaroWinkler::score("naruto", "boruto"));
        assert!(exact.matches("naruto", "boruto"));
    }

    #[test]
    fn test_merge_all_keeps_below_threshold_apart() {
        let a = vec![titled("naruto").with_episodes(220)];
        let b = vec![titled("boruto").with_summary("Next generation.")];
        let result = merge_default(a, b);
        assert_eq!(titles(&result), vec!["naruto", "boruto"]);
        assert!(result[0].summary.is_empty());
        assert_eq!(result[1].episodes, -1);
    }

    #[test]
    fn test_merge_all_pairs_similar_titles() {
        let a = vec![titled("Oshi no Ko"), titled("Frieren")];
        let b = vec![
            titled("Frieren Beyond Journey's End").with_episodes(28),
            titled("Oshi no Ko Season 2").with_episodes(13),
        ];
        let result = merge_default(a, b);
        assert_eq!(titles(&result), vec!["Frieren", "Oshi no Ko"]);
        assert_eq!(result[0].episodes, 28);
        assert_eq!(result[1].episodes, 13);
    }

    #[test]
    fn test_merge_all_retains_unmatched_from_both_sides() {
        let a = vec![titled("Bleach"), titled("Monster")];
        let b = vec![titled("One Piece"), titled("bleach").with_episodes(366)];
        let result = merge_default(a, b);
        assert_eq!(titles(&result), vec!["Bleach", "Monster", "One Piece"]);
        assert_eq!(result[0].episodes, 366);
    }

    #[test]
    fn test_merge_all_one_partner_per_record() {
        let a = vec![titled("Show")];
        let b = vec![titled("show").with_episodes(1), titled("SHOW").with_episodes(2)];
        let result = merge_default(a, b);
        assert_eq!(result.len(), 2);
        // "SHOW" sorts before "show", so it is the first candidate scanned.
        assert_eq!(result[0].episodes, 2);
        assert_eq!(result[1].title, "show");
        assert_eq!(result[1].episodes, 1);
    }

    #[test]
    fn test_merge_all_with_custom_matcher() {
        let exact_only = |a: &str, b: &str| a == b;
        let merger = Merger::new(exact_only);
        let result = merger.merge_all(vec![titled("abc")], vec![titled("abd")]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_merger_filter() {
        let merger = Merger::default().with_filter(|f| f != Field::Episodes);
        let result = merger.merge_all(vec![titled("Show")], vec![titled("Show").with_episodes(5)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].episodes, -1);
    }

    #[test]
    fn test_merge_all_empty_inputs() {
        assert!(merge_default(Vec::new(), Vec::new()).is_empty());
        assert_eq!(merge_default(Vec::new(), vec![titled("Only")]).len(), 1);
    }
}
