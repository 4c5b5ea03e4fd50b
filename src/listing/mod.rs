//! Listing view: which posts are shown, in what order, and their neighbours

use serde::Serialize;
use std::cmp::Ordering;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{display_date, date_iso, is_external, url_for};

/// Newest first; equal dates fall back to slug order so output is stable
pub fn compare_posts(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

/// Posts visible in a listing, newest first
///
/// Unpublished posts are dropped unless `include_unpublished` is set.
/// The input is left untouched.
pub fn select(posts: &[Post], include_unpublished: bool) -> Vec<&Post> {
    let mut visible: Vec<&Post> = posts
        .iter()
        .filter(|p| include_unpublished || p.published)
        .collect();
    visible.sort_by(|a, b| compare_posts(a, b));
    visible
}

/// A link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub path: String,
}

impl NavLink {
    fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            path: post.path.clone(),
        }
    }
}

/// Chronological neighbours of a post within a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// The next older post
    pub previous: Option<NavLink>,
    /// The next newer post
    pub next: Option<NavLink>,
}

impl Navigation {
    /// Neighbours of `listing[index]` in a newest-first listing
    pub fn for_index(listing: &[&Post], index: usize) -> Self {
        let previous = listing.get(index + 1).map(|p| NavLink::from_post(p));
        let next = index
            .checked_sub(1)
            .and_then(|i| listing.get(i))
            .map(|p| NavLink::from_post(p));
        Self { previous, next }
    }
}

/// One summary entry on the listing page
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub id: String,
    pub title: String,
    pub path: String,
    pub date: String,
    pub date_iso: String,
    pub excerpt: String,
    pub banner: Option<String>,
    pub reading_time: String,
    pub published: bool,
}

impl ListingEntry {
    pub fn new(config: &SiteConfig, post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            path: post.path.clone(),
            date: display_date(&post.date),
            date_iso: date_iso(&post.date),
            excerpt: post.excerpt.clone(),
            banner: banner_url(config, post),
            reading_time: post.reading_time.text.clone(),
            published: post.published,
        }
    }
}

/// URL of a post's banner image, if it has one
///
/// Absolute paths resolve under the path prefix; relative references are
/// resolved next to the post's page, where the generator copies them.
pub fn banner_url(config: &SiteConfig, post: &Post) -> Option<String> {
    let banner = post.banner.as_deref()?;
    Some(if is_external(banner) {
        banner.to_string()
    } else if banner.starts_with('/') {
        url_for(config, banner)
    } else {
        format!("{}{}", post.path, banner.trim_start_matches("./"))
    })
}
