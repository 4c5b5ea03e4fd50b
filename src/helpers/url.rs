//! URL helper functions

use percent_encoding::{AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped when a slug is placed in a URL path segment
pub const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL under the configured path prefix
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.path_prefix.trim_end_matches('/');
    let root = if root.is_empty() || root.starts_with('/') {
        root.to_string()
    } else {
        format!("/{}", root)
    };
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Absolute URL for a path that already carries the path prefix
pub fn absolute_url(config: &SiteConfig, site_path: &str) -> String {
    format!(
        "{}/{}",
        config.url.trim_end_matches('/'),
        site_path.trim_start_matches('/')
    )
}

/// Routing path of a post (`/<slug>/`)
///
/// Each `/`-separated segment of a nested slug is encoded on its own, so the
/// route mirrors the directory the page is written to.
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    let encoded = slug
        .split('/')
        .map(|segment| percent_encoding::utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    url_for(config, &format!("{}/", encoded))
}

/// Whether a reference points outside the site
pub fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}
