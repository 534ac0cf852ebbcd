//! Latest listing command handler

use std::path::Path;
use std::sync::Arc;

use super::{emit, http_fetcher};
use crate::cli::SourceName;
use crate::clients::{AnnAdapter, ListOptions, MalAdapter, SourceAdapter};
use crate::config::Config;
use crate::models::record::Kind;
use crate::services::collect;

pub async fn cmd_latest(
    config: &Config,
    source: SourceName,
    limit: Option<usize>,
    kinds: Vec<Kind>,
    populate: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let fetcher = http_fetcher(config)?;
    let adapter: Arc<dyn SourceAdapter> = match source {
        SourceName::Ann => Arc::new(AnnAdapter::new(
            config.sources.ann.clone(),
            &config.scraper,
            fetcher,
        )),
        SourceName::Mal => Arc::new(MalAdapter::new(
            config.sources.mal.clone(),
            &config.scraper,
            fetcher,
        )),
    };

    let mut options = ListOptions::latest().with_kinds(kinds);
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }

    let records = collect(adapter.as_ref(), &options, populate).await;
    emit(records, output)
}
