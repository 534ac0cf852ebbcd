mod aggregate;
mod latest;
mod merge;
mod tag;
mod upcoming;

pub use aggregate::cmd_aggregate;
pub use latest::cmd_latest;
pub use merge::cmd_merge;
pub use tag::cmd_tag;
pub use upcoming::cmd_upcoming;

use std::path::Path;
use std::sync::Arc;

use crate::clients::{HttpFetcher, PageFetcher};
use crate::config::Config;
use crate::models::{Record, ShowList};

fn http_fetcher(config: &Config) -> anyhow::Result<Arc<dyn PageFetcher>> {
    Ok(Arc::new(HttpFetcher::new(config.scraper.request_timeout())?))
}

/// Writes the records as a show list, to `output` or stdout.
fn emit(records: Vec<Record>, output: Option<&Path>) -> anyhow::Result<()> {
    let list = ShowList::new(records);
    match output {
        Some(path) => list.write_to_path(path),
        None => {
            println!("{}", list.to_json()?);
            Ok(())
        }
    }
}
