//! Content module - handles posts and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, HIGHLIGHT_LINE_CLASS};
pub use post::{count_words, Post, ReadingTime};
