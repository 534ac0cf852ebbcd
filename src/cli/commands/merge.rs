//! Merge command handler

use anyhow::bail;
use std::path::Path;

use super::emit;
use crate::config::{Config, MergeConfig};
use crate::models::ShowList;
use crate::services::Merger;

pub fn cmd_merge(
    config: &Config,
    a: &Path,
    b: &Path,
    threshold: Option<f64>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let merge_config = MergeConfig {
        similarity_threshold: threshold.unwrap_or(config.merge.similarity_threshold),
    };
    if merge_config.similarity_threshold <= 0.0 || merge_config.similarity_threshold > 1.0 {
        bail!(
            "similarity threshold must be in (0, 1], got {}",
            merge_config.similarity_threshold
        );
    }

    let left = ShowList::read_from_path(a)?;
    let right = ShowList::read_from_path(b)?;

    let merged = Merger::from_config(&merge_config).merge_all(left.shows, right.shows);
    emit(merged, output)
}
