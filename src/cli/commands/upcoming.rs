//! Upcoming listing command handler

use std::path::Path;

use super::{emit, http_fetcher};
use crate::clients::{AnnAdapter, ListOptions};
use crate::config::Config;
use crate::services::collect;

pub async fn cmd_upcoming(
    config: &Config,
    populate: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let adapter = AnnAdapter::new(
        config.sources.ann.clone(),
        &config.scraper,
        http_fetcher(config)?,
    );

    let records = collect(&adapter, &ListOptions::upcoming(), populate).await;
    emit(records, output)
}
