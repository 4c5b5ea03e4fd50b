//! Page shell: document head metadata and global styling shared by every page

mod typography;

pub use typography::{rhythm, Typography, TypographyTheme, NORIEGA, TYPOGRAPHY};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::HIGHLIGHT_LINE_CLASS;
use crate::helpers::{absolute_url, date_iso, url_for};

lazy_static! {
    /// Global stylesheet: typography base plus document resets
    pub static ref GLOBAL_STYLES: String = build_global_styles();

    /// Inline style of the centered content column
    pub static ref CONTAINER_STYLE: String = format!(
        "margin-left: auto; margin-right: auto; max-width: {}; min-width: {}; padding: {} {};",
        rhythm(26.0),
        rhythm(13.0),
        rhythm(1.5),
        rhythm(3.0 / 4.0)
    );
}

fn build_global_styles() -> String {
    format!(
        "{}\nhtml,\nbody {{\n  margin: 0;\n  padding: 0;\n}}\npre {{\n  padding: 0.5rem;\n}}\n.{} {{\n  background-color: #4f424c;\n  display: block;\n  margin-right: -1em;\n  margin-left: -1em;\n  padding-right: 1em;\n  padding-left: 1em;\n}}\n",
        TYPOGRAPHY.css(),
        HIGHLIGHT_LINE_CLASS
    )
}

/// A `<meta name=... content=...>` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

impl MetaTag {
    pub fn new(name: &str, content: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            content: content.into(),
        }
    }
}

/// Per-page values that feed the head
#[derive(Debug, Clone, Default)]
pub struct PageMeta<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub keywords: Option<&'a [String]>,
    pub date: Option<NaiveDate>,
    pub reading_time: Option<&'a str>,
    pub twitter_embed_video: Option<&'a str>,
}

/// Everything the layout template needs for `<head>`
#[derive(Debug, Clone, Serialize)]
pub struct Head {
    pub title: String,
    pub lang: String,
    pub description: String,
    pub keywords: String,
    pub meta: Vec<MetaTag>,
    pub theme_color: String,
    pub canonical: Option<String>,
    pub manifest_href: String,
    pub feed_href: Option<String>,
    pub feed_title: String,
    pub home_href: String,
    pub styles: String,
    pub container_style: String,
}

impl Head {
    /// Resolve head metadata; page description and keywords win over the
    /// site defaults when present
    pub fn resolve(config: &SiteConfig, page: &PageMeta) -> Self {
        let description = page
            .description
            .unwrap_or(config.description.as_str())
            .to_string();
        let keywords = page.keywords.unwrap_or(config.keywords.as_slice()).join(", ");

        let mut meta = vec![
            MetaTag::new("viewport", "width=device-width, initial-scale=1.0"),
            MetaTag::new("description", description.clone()),
            MetaTag::new("keywords", keywords.clone()),
            MetaTag::new("twitter:title", page.title),
            MetaTag::new("twitter:description", description.clone()),
        ];

        if let Some(reading_time) = page.reading_time {
            meta.push(MetaTag::new("twitter:label1", "Reading time"));
            meta.push(MetaTag::new("twitter:data1", reading_time));
        }

        if let Some(date) = page.date {
            meta.push(MetaTag::new("article:published_time", date_iso(&date)));
        }

        meta.extend(social_video_tags(config, page.twitter_embed_video));

        let feed_href = config
            .feed
            .enable
            .then(|| url_for(config, &config.feed.path));

        Self {
            title: page.title.to_string(),
            lang: config.language.clone(),
            description,
            keywords,
            meta,
            theme_color: config.theme_color.clone(),
            canonical: None,
            manifest_href: url_for(config, "manifest.webmanifest"),
            feed_href,
            feed_title: config.feed.title.clone(),
            home_href: url_for(config, "/"),
            styles: GLOBAL_STYLES.clone(),
            container_style: CONTAINER_STYLE.clone(),
        }
    }

    /// Set the canonical URL from a path that already carries the prefix
    pub fn with_canonical(mut self, config: &SiteConfig, site_path: &str) -> Self {
        self.canonical = Some(absolute_url(config, site_path));
        self
    }
}

/// Twitter player card entries for a post with an embeddable video
///
/// Returns all six entries when `video_url` is set and none otherwise.
/// `twitter:site` is left out when the site has no handle configured.
pub fn social_video_tags(config: &SiteConfig, video_url: Option<&str>) -> Vec<MetaTag> {
    let Some(url) = video_url else {
        return Vec::new();
    };

    let video = &config.social_video;
    let handle = config.twitter_handle();

    let mut tags = vec![MetaTag::new("twitter:card", "player")];
    if !handle.is_empty() {
        tags.push(MetaTag::new("twitter:site", handle));
    }
    tags.extend([
        MetaTag::new("twitter:player", url),
        MetaTag::new("twitter:player:width", video.width.to_string()),
        MetaTag::new("twitter:player:height", video.height.to_string()),
        MetaTag::new("twitter:image", video.preview_image.clone()),
    ]);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.description = "Mostly code.".to_string();
        config.keywords = vec!["egghead".to_string(), "rust".to_string()];
        config.twitter = "johnlindquist".to_string();
        config
    }

    fn meta<'a>(head: &'a Head, name: &str) -> Option<&'a str> {
        head.meta
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.content.as_str())
    }

    #[test]
    fn test_site_defaults() {
        let config = site();
        let head = Head::resolve(
            &config,
            &PageMeta {
                title: "Home",
                ..Default::default()
            },
        );
        assert_eq!(head.description, "Mostly code.");
        assert_eq!(head.keywords, "egghead, rust");
        assert_eq!(head.lang, "en");
        assert_eq!(
            meta(&head, "viewport"),
            Some("width=device-width, initial-scale=1.0")
        );
        assert_eq!(meta(&head, "twitter:label1"), None);
        assert_eq!(meta(&head, "article:published_time"), None);
    }

    #[test]
    fn test_page_overrides() {
        let config = site();
        let keywords = vec!["mdx".to_string()];
        let head = Head::resolve(
            &config,
            &PageMeta {
                title: "Post",
                description: Some("A post."),
                keywords: Some(&keywords),
                date: NaiveDate::from_ymd_opt(2020, 3, 1),
                reading_time: Some("3 min read"),
                twitter_embed_video: None,
            },
        );
        assert_eq!(head.description, "A post.");
        assert_eq!(head.keywords, "mdx");
        assert_eq!(meta(&head, "twitter:data1"), Some("3 min read"));
        assert_eq!(meta(&head, "article:published_time"), Some("2020-03-01"));
    }

    #[test]
    fn test_social_video_tags_present() {
        let config = site();
        let tags = social_video_tags(&config, Some("https://example.com/player"));
        assert_eq!(
            tags,
            vec![
                MetaTag::new("twitter:card", "player"),
                MetaTag::new("twitter:site", "@johnlindquist"),
                MetaTag::new("twitter:player", "https://example.com/player"),
                MetaTag::new("twitter:player:width", "1280"),
                MetaTag::new("twitter:player:height", "720"),
                MetaTag::new(
                    "twitter:image",
                    "https://johnlindquist.com/twitter-player-preview.png"
                ),
            ]
        );
    }

    #[test]
    fn test_social_video_tags_without_handle() {
        let mut config = site();
        config.twitter = String::new();
        let tags = social_video_tags(&config, Some("https://example.com/player"));
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "twitter:card",
                "twitter:player",
                "twitter:player:width",
                "twitter:player:height",
                "twitter:image"
            ]
        );
        assert!(tags.iter().all(|t| !t.content.is_empty()));
    }

    #[test]
    fn test_social_video_tags_absent() {
        let config = site();
        assert!(social_video_tags(&config, None).is_empty());

        let head = Head::resolve(
            &config,
            &PageMeta {
                title: "Post",
                ..Default::default()
            },
        );
        assert!(head.meta.iter().all(|m| !m.name.starts_with("twitter:player")
            && m.name != "twitter:card"
            && m.name != "twitter:site"
            && m.name != "twitter:image"));
    }

    #[test]
    fn test_global_styles() {
        assert!(GLOBAL_STYLES.contains("html,\nbody {\n  margin: 0;\n  padding: 0;\n}"));
        assert!(GLOBAL_STYLES.contains(".highlight-code-line {"));
        assert!(GLOBAL_STYLES.contains("background-color: #4f424c;"));
    }

    #[test]
    fn test_container_style() {
        assert_eq!(
            CONTAINER_STYLE.as_str(),
            "margin-left: auto; margin-right: auto; max-width: 40.56rem; min-width: 20.28rem; padding: 2.34rem 1.17rem;"
        );
    }
}
