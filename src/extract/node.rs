// DOM traversal seam for the field extractor.
//
// The extractor only needs four capabilities from a snapshot tree: find the
// first/all descendants by tag + attribute filter, read an attribute, and
// read the concatenated text. Keeping that behind a trait lets the extractor
// run against `scraper` documents in production and hand-built trees in tests.

use scraper::{ElementRef, Html};

/// How a descendant element is matched in addition to its tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrFilter<'a> {
    /// Any element with the tag.
    Any,
    /// The element's `class` attribute contains this class token.
    Class(&'a str),
    /// The element has this attribute with exactly this value.
    Attr(&'a str, &'a str),
    /// The element has this attribute, whatever its value.
    Has(&'a str),
}

impl AttrFilter<'_> {
    /// Evaluate the filter against an attribute lookup function.
    pub fn matches<F>(&self, attr: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            AttrFilter::Any => true,
            AttrFilter::Class(class) => attr("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == *class)),
            AttrFilter::Attr(name, value) => attr(name).is_some_and(|v| v == *value),
            AttrFilter::Has(name) => attr(name).is_some(),
        }
    }
}

/// Minimal read-only view of an element in a captured page snapshot.
pub trait DomNode: Sized {
    /// First descendant (excluding self) in document order with the tag that passes the filter.
    fn find_child(&self, tag: &str, filter: &AttrFilter<'_>) -> Option<Self>;

    /// All descendants (excluding self) with the tag that pass the filter, in document order.
    fn find_descendants(&self, tag: &str, filter: &AttrFilter<'_>) -> Vec<Self>;

    /// Attribute value, if present.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Text content: every non-empty text node, trimmed, joined with `separator`.
    fn text_content(&self, separator: &str) -> String;
}

impl<'a> DomNode for ElementRef<'a> {
    fn find_child(&self, tag: &str, filter: &AttrFilter<'_>) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| element_matches(el, tag, filter))
    }

    fn find_descendants(&self, tag: &str, filter: &AttrFilter<'_>) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| element_matches(el, tag, filter))
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text_content(&self, separator: &str) -> String {
        self.text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn element_matches(el: &ElementRef<'_>, tag: &str, filter: &AttrFilter<'_>) -> bool {
    el.value().name().eq_ignore_ascii_case(tag)
        && filter.matches(|name| el.value().attr(name).map(str::to_string))
}

/// Parse a full page snapshot. html5ever is error-tolerant, so this never fails.
pub fn parse_snapshot(html: &str) -> Html {
    Html::parse_document(html)
}
