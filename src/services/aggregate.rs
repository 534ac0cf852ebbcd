//! Runs several sources one after another and folds their listings into a
//! single merged collection.

use std::sync::Arc;
use tracing::info;

use super::merge::Merger;
use crate::clients::{ListOptions, SourceAdapter};
use crate::models::record::Record;

/// Populates every record in turn. Each call goes through the adapter's
/// pacing, so this is as slow as the site asks us to be.
pub async fn populate_all(adapter: &dyn SourceAdapter, records: Vec<Record>) -> Vec<Record> {
    let total = records.len();
    let mut populated = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        info!(
            source = adapter.name(),
            record = index + 1,
            total,
            title = %record.title,
            "Populating record"
        );
        populated.push(adapter.populate(record).await);
    }

    populated
}

/// Lists one source and, when asked, populates what it found.
pub async fn collect(
    adapter: &dyn SourceAdapter,
    options: &ListOptions,
    populate: bool,
) -> Vec<Record> {
    let records = adapter.list_records(options).await;
    if populate {
        populate_all(adapter, records).await
    } else {
        records
    }
}

pub struct Aggregator {
    sources: Vec<(Arc<dyn SourceAdapter>, ListOptions)>,
    populate: bool,
    merger: Merger,
}

impl Aggregator {
    #[must_use]
    pub const fn new(merger: Merger) -> Self {
        Self {
            sources: Vec::new(),
            populate: false,
            merger,
        }
    }

    #[must_use]
    pub fn with_source(mut self, adapter: Arc<dyn SourceAdapter>, options: ListOptions) -> Self {
        self.sources.push((adapter, options));
        self
    }

    #[must_use]
    pub const fn with_populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    /// Sources run in the order they were added; each result is merged into
    /// the running collection as the right-hand side.
    pub async fn run(&self) -> Vec<Record> {
        let mut merged: Option<Vec<Record>> = None;

        for (adapter, options) in &self.sources {
            let records = collect(adapter.as_ref(), options, self.populate).await;
            info!(
                source = adapter.name(),
                results = records.len(),
                "Source collected"
            );

            merged = Some(match merged {
                Some(acc) => self.merger.merge_all(acc, records),
                None => records,
            });
        }

        merged.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticSource {
        name: &'static str,
        records: Vec<Record>,
        populated: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn new(name: &'static str, records: Vec<Record>) -> Arc<Self> {
            Arc::new(Self {
                name,
                records,
                populated: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SourceAdapter for StaticSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn list_records(&self, _options: &ListOptions) -> Vec<Record> {
            self.records.clone()
        }

        async fn populate(&self, mut record: Record) -> Record {
            self.populated.lock().unwrap().push(record.title.clone());
            record.summary = format!("from {}", self.name);
            record.populated = true;
            record
        }
    }

    #[tokio::test]
    async fn test_run_merges_sources_in_order() {
        let ann = StaticSource::new(
            "ann",
            vec![Record::new("Frieren").with_episodes(28), Record::new("Dandadan")],
        );
        let mal = StaticSource::new(
            "mal",
            vec![
                Record::new("Frieren").with_url("https://myanimelist.net/anime/52991"),
                Record::new("Kaiju No. 8"),
            ],
        );

        let records = Aggregator::new(Merger::default())
            .with_source(ann, ListOptions::latest())
            .with_source(mal, ListOptions::latest())
            .run()
            .await;

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Dandadan", "Frieren", "Kaiju No. 8"]);
        assert_eq!(records[1].episodes, 28);
        assert_eq!(records[1].url, "https://myanimelist.net/anime/52991");
    }

    #[tokio::test]
    async fn test_run_with_populate() {
        let ann = StaticSource::new("ann", vec![Record::new("A"), Record::new("B")]);

        let records = Aggregator::new(Merger::default())
            .with_source(ann.clone(), ListOptions::latest())
            .with_populate(true)
            .run()
            .await;

        assert_eq!(*ann.populated.lock().unwrap(), vec!["A", "B"]);
        assert!(records.iter().all(|r| r.populated && r.summary == "from ann"));
    }

    #[tokio::test]
    async fn test_run_without_sources() {
        assert!(Aggregator::new(Merger::default()).run().await.is_empty());
    }
}
