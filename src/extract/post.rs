// Field extractor: one post container -> best-effort structured fields.
//
// Every field is looked up independently. A container that lacks the actor
// block still yields its content and reactions, and so on. The only hard
// requirement is a resolvable activity id; without it the container is not
// yet extractable and the caller skips it.

use tracing::debug;

use super::node::{AttrFilter, DomNode};
use super::parse::{count_from_label, id_after_marker, NameDedup};
use crate::text::normalize;

/// Marker preceding the numeric activity id in links and `data-urn` attributes.
pub const ACTIVITY_MARKER: &str = "urn:li:activity:";

/// Prefix for relative profile links.
pub const PLATFORM_BASE_URL: &str = "https://www.linkedin.com";

// Current feed markup. The platform reshuffles these regularly.
pub const CONTAINER_CLASS: &str = "feed-shared-update-v2";
const DETAIL_LINK_CLASS: &str = "update-components-mini-update-v2__link-to-details-page";
const ACTOR_CLASS: &str = "update-components-actor__container";
const ACTOR_NAME_CLASS: &str = "update-components-actor__title";
const ACTOR_LINK_CLASS: &str = "update-components-actor__meta-link";
const ACTOR_TITLE_CLASS: &str = "update-components-actor__description";
const CONTENT_CLASS: &str = "update-components-text";
const SOCIAL_COUNTS_CLASS: &str = "social-details-social-counts";
const REACTIONS_ITEM_CLASS: &str = "social-details-social-counts__reactions";

/// Fields extracted from a container, before sentiment scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPost {
    pub id: String,
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_title: Option<String>,
    /// Normalized content; empty when the content element is missing.
    pub content: String,
    pub reactions: u64,
}

/// Stateless extractor configured with the name normalization rule.
#[derive(Debug, Clone, Default)]
pub struct PostExtractor {
    pub name_dedup: NameDedup,
}

impl PostExtractor {
    pub fn new(name_dedup: NameDedup) -> Self {
        Self { name_dedup }
    }

    /// All post containers in a snapshot, in document order.
    pub fn containers<N: DomNode>(&self, root: &N) -> Vec<N> {
        root.find_descendants("div", &AttrFilter::Class(CONTAINER_CLASS))
    }

    /// Resolve the container's activity id: detail link first, then `data-urn`.
    pub fn resolve_id<N: DomNode>(&self, container: &N) -> Option<String> {
        container
            .find_child("a", &AttrFilter::Class(DETAIL_LINK_CLASS))
            .and_then(|link| link.attribute("href"))
            .and_then(|href| id_after_marker(href.trim(), ACTIVITY_MARKER))
            .or_else(|| {
                container
                    .attribute("data-urn")
                    .and_then(|urn| id_after_marker(&urn, ACTIVITY_MARKER))
            })
    }

    /// Extract everything. Returns `None` only when no id can be resolved.
    pub fn extract<N: DomNode>(&self, container: &N) -> Option<ExtractedPost> {
        let id = self.resolve_id(container)?;
        Some(self.extract_fields(container, id))
    }

    /// Extract the non-id fields for an already resolved id.
    pub fn extract_fields<N: DomNode>(&self, container: &N, id: String) -> ExtractedPost {
        let mut post = ExtractedPost {
            id,
            ..Default::default()
        };

        if let Some(actor) = container.find_child("div", &AttrFilter::Class(ACTOR_CLASS)) {
            post.author_name = actor
                .find_child("span", &AttrFilter::Class(ACTOR_NAME_CLASS))
                .and_then(|title| title.find_child("span", &AttrFilter::Attr("dir", "ltr")))
                .map(|span| self.name_dedup.apply(&span.text_content(" ")))
                .filter(|name| !name.is_empty());

            post.author_profile_url = actor
                .find_child("a", &AttrFilter::Class(ACTOR_LINK_CLASS))
                .and_then(|link| link.attribute("href"))
                .map(|href| absolutize_profile_link(href.trim()))
                .filter(|href| !href.is_empty());

            post.author_title = actor
                .find_child("span", &AttrFilter::Class(ACTOR_TITLE_CLASS))
                .map(|span| normalize(&self.name_dedup.apply(&span.text_content(" "))))
                .filter(|title| !title.is_empty());
        } else {
            debug!(post_id = %post.id, "No actor block in container");
        }

        post.content = container
            .find_child("div", &AttrFilter::Class(CONTENT_CLASS))
            .map(|div| normalize(&div.text_content("\n")))
            .unwrap_or_default();

        post.reactions = container
            .find_child("div", &AttrFilter::Class(SOCIAL_COUNTS_CLASS))
            .and_then(|counts| counts.find_child("li", &AttrFilter::Class(REACTIONS_ITEM_CLASS)))
            .and_then(|item| item.find_child("button", &AttrFilter::Has("aria-label")))
            .and_then(|button| button.attribute("aria-label"))
            .map(|label| count_from_label(&label))
            .unwrap_or(0);

        post
    }
}

fn absolutize_profile_link(href: &str) -> String {
    if href.starts_with('/') {
        format!("{PLATFORM_BASE_URL}{href}")
    } else {
        href.to_string()
    }
}
