use crate::models::record::Kind;
use regex::Regex;
use std::sync::OnceLock;

/// A raw listing title split into its name and trailing annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub title: String,
    /// `None` when the title carried no annotation; the caller's kind stands.
    pub kind: Option<Kind>,
    pub season_number: u32,
}

impl ParsedTitle {
    #[must_use]
    pub fn kind_or(&self, fallback: Kind) -> Kind {
        self.kind.unwrap_or(fallback)
    }
}

fn annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r" \((?P<kind>\w+)(?: (?P<season>\d+))?\)$")
            .expect("Invalid regex pattern defined in code")
    })
}

/// Strips a trailing `" (KIND N)"` or `" (KIND)"` annotation.
///
/// `"Show Name (TV 2)"` gives `Show Name`, `Kind::Tv`, season 2. Without an
/// annotation the title is returned as-is with season 0.
#[must_use]
pub fn parse_title(raw: &str) -> ParsedTitle {
    let raw = raw.trim();
    let re = annotation_regex();

    let Some(caps) = re.captures(raw) else {
        return ParsedTitle {
            title: raw.to_string(),
            kind: None,
            season_number: 0,
        };
    };

    let kind = caps.name("kind").map(|m| Kind::from_label(m.as_str()));
    let season_number = caps
        .name("season")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let start = caps.get(0).map_or(raw.len(), |m| m.start());

    ParsedTitle {
        title: raw[..start].trim_end().to_string(),
        kind,
        season_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_season() {
        let parsed = parse_title("Show Name (TV 2)");
        assert_eq!(parsed.title, "Show Name");
        assert_eq!(parsed.kind, Some(Kind::Tv));
        assert_eq!(parsed.season_number, 2);
    }

    #[test]
    fn test_kind_only() {
        let parsed = parse_title("Show Name (OVA)");
        assert_eq!(parsed.title, "Show Name");
        assert_eq!(parsed.kind, Some(Kind::Ova));
        assert_eq!(parsed.season_number, 0);
    }

    #[test]
    fn test_no_annotation() {
        let parsed = parse_title("Show Name");
        assert_eq!(parsed.title, "Show Name");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.kind_or(Kind::Movie), Kind::Movie);
        assert_eq!(parsed.season_number, 0);
    }

    #[test]
    fn test_case_insensitive_kind() {
        assert_eq!(parse_title("Show (movie)").kind, Some(Kind::Movie));
        assert_eq!(parse_title("Show (Ona 3)").kind, Some(Kind::Ona));
    }

    #[test]
    fn test_unrecognized_kind_token() {
        let parsed = parse_title("Show Name (Pilot)");
        assert_eq!(parsed.title, "Show Name");
        assert_eq!(parsed.kind, Some(Kind::Unknown));
    }

    #[test]
    fn test_only_trailing_annotation_is_stripped() {
        let parsed = parse_title("Show (TV) Returns");
        assert_eq!(parsed.title, "Show (TV) Returns");
        assert_eq!(parsed.kind, None);

        let parsed = parse_title("Show: The Movie (TV 2)");
        assert_eq!(parsed.title, "Show: The Movie");
    }
}
