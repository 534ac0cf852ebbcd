pub mod aggregate;
pub use aggregate::{Aggregator, collect, populate_all};

pub mod merge;
pub use merge::{JaroWinkler, Merger, TitleMatcher, merge, merge_all, merge_with};
