//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
///
/// Unknown keys in `_config.yml` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub canonical_url: String,
    pub path_prefix: String,

    // Social
    /// Twitter handle, with or without the leading `@`
    pub twitter: String,

    // Manifest
    pub short_name: String,
    pub theme_color: String,
    pub background_color: String,
    pub icon: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub sources: Vec<ContentSource>,

    // Writing
    pub excerpt_length: usize,
    pub words_per_minute: usize,
    /// Show unpublished posts in the listing regardless of build mode
    pub show_unpublished: bool,

    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub social_video: SocialVideoConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            keywords: Vec::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            canonical_url: String::new(),
            path_prefix: "/".to_string(),

            twitter: String::new(),

            short_name: String::new(),
            theme_color: "#525dce".to_string(),
            background_color: "#fff".to_string(),
            icon: "logo.png".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            sources: vec![
                ContentSource::new("blog", "content/blog"),
                ContentSource::new("legacy", "content/legacy_blog"),
            ],

            excerpt_length: 300,
            words_per_minute: 200,
            show_unpublished: false,

            embed: EmbedConfig::default(),
            social_video: SocialVideoConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Twitter handle normalized to the `@handle` form, empty if unset
    pub fn twitter_handle(&self) -> String {
        let handle = self.twitter.trim().trim_start_matches('@');
        if handle.is_empty() {
            String::new()
        } else {
            format!("@{}", handle)
        }
    }

    /// The canonical URL, falling back to the site URL
    pub fn canonical(&self) -> &str {
        if self.canonical_url.is_empty() {
            &self.url
        } else {
            &self.canonical_url
        }
    }

    /// Host part of the canonical URL (`https://example.com/` -> `example.com`)
    pub fn host(&self) -> String {
        let canonical = self.canonical();
        let without_scheme = canonical
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(canonical);
        without_scheme.trim_end_matches('/').to_string()
    }

    /// Whether unpublished posts are listed for the given build mode
    pub fn shows_unpublished(&self, mode: BuildMode) -> bool {
        self.show_unpublished || mode == BuildMode::Development
    }
}

/// Build context. Development builds list unpublished posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Production,
    Development,
}

/// A named directory of Markdown posts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentSource {
    pub name: String,
    pub path: String,
}

impl ContentSource {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Embedded video lesson player for posts from a given source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Content source whose posts get the embedded player
    pub source: String,
    /// Embed URL, `:slug` is replaced with the post slug
    pub url_template: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            source: "egghead".to_string(),
            url_template: "https://egghead.io/lessons/:slug/embed".to_string(),
        }
    }
}

impl EmbedConfig {
    /// Embed URL for a slug
    pub fn url_for(&self, slug: &str) -> String {
        let encoded =
            percent_encoding::utf8_percent_encode(slug, crate::helpers::PATH_SEGMENT).to_string();
        self.url_template.replace(":slug", &encoded)
    }
}

/// Twitter player card settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialVideoConfig {
    pub width: u32,
    pub height: u32,
    pub preview_image: String,
}

impl Default for SocialVideoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            preview_image: "https://johnlindquist.com/twitter-player-preview.png".to_string(),
        }
    }
}

/// RSS feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    pub path: String,
    pub title: String,
    pub limit: usize,
    pub excerpt_length: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "rss.xml".to_string(),
            title: "Blog RSS Feed".to_string(),
            limit: 1000,
            excerpt_length: 250,
        }
    }
}
