//! Fatal build errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build
///
/// Content problems that would silently change what a reader sees (a post
/// without a usable date, two posts claiming the same URL) fail the whole
/// build instead of being skipped.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A post has no `date` in its front-matter
    #[error("{path}: missing publish date")]
    MissingDate { path: PathBuf },

    /// A post's `date` could not be parsed as a calendar date
    #[error("{path}: malformed publish date {value:?}")]
    InvalidDate { path: PathBuf, value: String },

    /// A front-matter slug that cannot be used as a route
    #[error("{path}: invalid slug {slug:?}")]
    InvalidSlug { path: PathBuf, slug: String },

    /// Two posts resolve to the same slug
    #[error("duplicate slug {slug:?} in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    /// A post could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template rendering failed
    #[error("failed to render {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: tera::Error,
    },
}
