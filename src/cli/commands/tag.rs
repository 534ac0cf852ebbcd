//! Category tag listing command handler

use std::path::Path;

use super::{emit, http_fetcher};
use crate::clients::{ListOptions, MuAdapter};
use crate::config::Config;
use crate::services::collect;

pub async fn cmd_tag(
    config: &Config,
    tag: &str,
    reject: Vec<String>,
    populate: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let adapter = MuAdapter::new(
        config.sources.mu.clone(),
        &config.scraper,
        http_fetcher(config)?,
    );

    let options = ListOptions::tag(tag).with_reject_tags(reject);
    let records = collect(&adapter, &options, populate).await;

    if records.is_empty() {
        tracing::warn!(tag, "Nothing listed under tag");
    }
    emit(records, output)
}
