//! Minimal HTML query surface used by the site adapters.
//!
//! Adapters only select nodes, read text and read attributes; keeping them on
//! this wrapper means none of them depend on the parser's own API.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::ScrapeError;

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            let err = ScrapeError::InvalidSelector(format!("{css}: {e:?}"));
            warn!(error = %err, "Selector rejected");
            None
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns a missing node into a field-level parse error.
pub fn require<'a>(node: Option<Node<'a>>, field: &'static str) -> crate::error::Result<Node<'a>> {
    node.ok_or_else(|| ScrapeError::field(field, "node not found"))
}

pub struct Document {
    html: Html,
}

impl Document {
    #[must_use]
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    #[must_use]
    pub fn select_all(&self, css: &str) -> Vec<Node<'_>> {
        compile(css).map_or_else(Vec::new, |selector| {
            self.html.select(&selector).map(Node).collect()
        })
    }

    #[must_use]
    pub fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = compile(css)?;
        self.html.select(&selector).next().map(Node)
    }
}

#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    #[must_use]
    pub fn select_all(&self, css: &str) -> Vec<Self> {
        compile(css).map_or_else(Vec::new, |selector| {
            self.0.select(&selector).map(Node).collect()
        })
    }

    #[must_use]
    pub fn select_first(&self, css: &str) -> Option<Self> {
        let selector = compile(css)?;
        self.0.select(&selector).next().map(Node)
    }

    /// All descendant text, whitespace collapsed.
    #[must_use]
    pub fn text(&self) -> String {
        collapse_whitespace(&self.0.text().collect::<String>())
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    #[must_use]
    pub fn tag_name(&self) -> &'a str {
        self.0.value().name()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.value().classes().any(|c| c == class)
    }

    /// Direct text children only, each trimmed, empties dropped.
    #[must_use]
    pub fn own_text(&self) -> Vec<String> {
        self.0
            .children()
            .filter_map(|child| child.value().as_text())
            .map(|text| collapse_whitespace(text))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Direct text children plus the text of child elements named in `tags`,
    /// concatenated in document order.
    #[must_use]
    pub fn inline_text(&self, tags: &[&str]) -> String {
        let mut out = String::new();
        for child in self.0.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(text);
            } else if let Some(element) = ElementRef::wrap(child)
                && tags.contains(&element.value().name())
            {
                out.extend(element.text());
            }
        }
        collapse_whitespace(&out)
    }

    #[must_use]
    pub fn following_siblings(&self) -> Vec<Self> {
        self.0
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .map(Node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="box" class="info main">
            Leading text
            <span class="dark_text">Key:</span>
            <a href="/one">One</a>, <a href="/two">Two</a>
            <b>bold</b>
          </div>
          <h2>Information</h2>
          <div class="row">first</div>
          <div class="row">second</div>
        </body></html>
    "#;

    #[test]
    fn test_select_and_read() {
        let doc = Document::parse(PAGE);
        let links = doc.select_all("#box a");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text(), "One");
        assert_eq!(links[1].attr("href"), Some("/two"));
        assert!(doc.select_first("#missing").is_none());
    }

    #[test]
    fn test_own_and_inline_text() {
        let doc = Document::parse(PAGE);
        let node = doc.select_first("#box").unwrap();
        assert_eq!(node.own_text(), vec!["Leading text", ","]);
        assert_eq!(node.inline_text(&["a"]), "Leading text One, Two");
        assert!(node.has_class("main"));
        assert_eq!(node.tag_name(), "div");
    }

    #[test]
    fn test_following_siblings() {
        let doc = Document::parse(PAGE);
        let h2 = doc.select_first("h2").unwrap();
        let texts: Vec<String> = h2.following_siblings().iter().map(Node::text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Document::parse(PAGE);
        assert!(doc.select_all("div[[").is_empty());
        assert!(doc.select_first("div[[").is_none());
    }
}
