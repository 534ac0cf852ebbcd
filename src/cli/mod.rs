//! CLI module - Command-line interface for showscrape
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::record::Kind;

/// showscrape - Episodic media metadata scraper
/// Lists titles from catalog sites and merges them into one JSON document
#[derive(Parser)]
#[command(name = "showscrape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceName {
    Ann,
    Mal,
}

fn parse_kind(label: &str) -> Result<Kind, String> {
    match Kind::from_label(label) {
        Kind::Unknown => Err(format!("unknown kind '{label}' (tv, movie, ova, ona, oav, special)")),
        kind => Ok(kind),
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the most recent titles from one site
    #[command(alias = "l")]
    Latest {
        /// Site to scrape
        #[arg(long, value_enum, default_value = "ann")]
        source: SourceName,
        /// Maximum number of records
        #[arg(long)]
        limit: Option<usize>,
        /// Restrict to these kinds (repeatable)
        #[arg(long, value_parser = parse_kind)]
        kind: Vec<Kind>,
        /// Fetch every detail page as well
        #[arg(long)]
        populate: bool,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List announced titles (ANN upcoming sections)
    #[command(alias = "u")]
    Upcoming {
        /// Fetch every detail page as well
        #[arg(long)]
        populate: bool,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List every series under a category tag (MU)
    Tag {
        /// Category name
        tag: String,
        /// Drop rows with a tag starting with this prefix (repeatable)
        #[arg(long)]
        reject: Vec<String>,
        /// Fetch every detail page as well
        #[arg(long)]
        populate: bool,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge two saved show lists
    #[command(alias = "m")]
    Merge {
        /// Left-hand show list; every record here is kept
        a: PathBuf,
        /// Right-hand show list
        b: PathBuf,
        /// Override the configured similarity threshold
        #[arg(long)]
        threshold: Option<f64>,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// ANN and MAL latest listings, merged
    Aggregate {
        /// Maximum number of records per site
        #[arg(long)]
        limit: Option<usize>,
        /// Fetch every detail page as well
        #[arg(long)]
        populate: bool,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latest_args() {
        let cli = Cli::try_parse_from([
            "showscrape", "latest", "--source", "mal", "--limit", "5", "--kind", "tv", "--kind",
            "Movie", "--populate",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Latest {
                source,
                limit,
                kind,
                populate,
                output,
            }) => {
                assert_eq!(source, SourceName::Mal);
                assert_eq!(limit, Some(5));
                assert_eq!(kind, vec![Kind::Tv, Kind::Movie]);
                assert!(populate);
                assert!(output.is_none());
            }
            _ => panic!("expected latest"),
        }
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["showscrape", "latest", "--kind", "manga"]).is_err());
    }

    #[test]
    fn test_parse_tag_with_rejects() {
        let cli = Cli::try_parse_from([
            "showscrape", "tag", "Comedy", "--reject", "Yaoi", "--reject", "Shoujo Ai",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Tag { tag, reject, .. }) => {
                assert_eq!(tag, "Comedy");
                assert_eq!(reject, vec!["Yaoi", "Shoujo Ai"]);
            }
            _ => panic!("expected tag"),
        }
    }
}
