// Field extraction from captured feed snapshots.
//
// `node` is the DOM seam, `parse` holds the string-level parsers, and `post`
// maps one post container to its fields.

pub mod node;
pub mod parse;
pub mod post;

pub use node::{parse_snapshot, AttrFilter, DomNode};
pub use parse::NameDedup;
pub use post::{ExtractedPost, PostExtractor};
