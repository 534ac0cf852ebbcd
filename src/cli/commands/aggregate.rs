//! Aggregate command handler

use std::path::Path;
use std::sync::Arc;

use super::{emit, http_fetcher};
use crate::clients::{AnnAdapter, ListOptions, MalAdapter};
use crate::config::Config;
use crate::services::{Aggregator, Merger};

pub async fn cmd_aggregate(
    config: &Config,
    limit: Option<usize>,
    populate: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let fetcher = http_fetcher(config)?;
    let ann = AnnAdapter::new(config.sources.ann.clone(), &config.scraper, fetcher.clone());
    let mal = MalAdapter::new(config.sources.mal.clone(), &config.scraper, fetcher);

    let mut options = ListOptions::latest();
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }

    let records = Aggregator::new(Merger::from_config(&config.merge))
        .with_source(Arc::new(ann), options.clone())
        .with_source(Arc::new(mal), options)
        .with_populate(populate)
        .run()
        .await;

    emit(records, output)
}
