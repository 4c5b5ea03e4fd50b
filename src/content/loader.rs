//! Content loader - loads posts from the configured content sources

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post, ReadingTime};
use crate::config::ContentSource;
use crate::error::BuildError;
use crate::helpers::{decode_entities, post_path, prune, strip_html};
use crate::Blog;

/// Loads posts from every content source
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        Self {
            blog,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Load all posts, published or not, in no particular order
    ///
    /// Fails on the first post with a missing or malformed date and when two
    /// posts share a slug.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for source in &self.blog.config.sources {
            let dir = self.blog.base_dir.join(&source.path);
            if !dir.exists() {
                tracing::debug!("Content source {} not found at {:?}", source.name, dir);
                continue;
            }

            let mut count = 0;
            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_markdown_file(path) {
                    posts.push(self.load_post(path, source)?);
                    count += 1;
                }
            }
            tracing::debug!("Loaded {} posts from source {}", count, source.name);
        }

        check_unique_slugs(&posts)?;

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path, source: &ContentSource) -> Result<Post> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = match fm.parse_date() {
            Some(Ok(date)) => date,
            Some(Err(value)) => {
                return Err(BuildError::InvalidDate {
                    path: path.to_path_buf(),
                    value,
                }
                .into())
            }
            None => {
                return Err(BuildError::MissingDate {
                    path: path.to_path_buf(),
                }
                .into())
            }
        };

        let stem = file_stem(path);
        let title = fm.title.clone().unwrap_or_else(|| stem.clone());

        let id = path
            .strip_prefix(&self.blog.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let slug = match fm.slug.as_deref().map(|s| s.trim_matches('/')) {
            Some(custom) if !custom.is_empty() => {
                if !is_valid_slug(custom) {
                    return Err(BuildError::InvalidSlug {
                        path: path.to_path_buf(),
                        slug: custom.to_string(),
                    }
                    .into());
                }
                custom.to_string()
            }
            _ => slug::slugify(&stem),
        };

        let content_html = self.renderer.render(body)?;
        let text = decode_entities(&strip_html(&content_html));

        let config = &self.blog.config;
        let mut post = Post::new(title, date, &source.name, id);
        post.slug = slug;
        post.path = post_path(config, &post.slug);
        post.published = fm.published;
        post.excerpt = prune(&text, config.excerpt_length);
        post.banner = fm.banner.filter(|b| !b.trim().is_empty());
        post.keywords = fm.keywords.filter(|k| !k.is_empty());
        post.description = fm.description.filter(|d| !d.trim().is_empty());
        post.twitter_embed_video = fm.twitter_embed_video.filter(|v| !v.trim().is_empty());
        post.reading_time = ReadingTime::from_text(&text, config.words_per_minute);
        post.raw = body.to_string();
        post.content = content_html;
        post.full_source = path.to_path_buf();

        Ok(post)
    }
}

/// File stem used for titles and slugs; `post/index.md` uses the directory name
fn file_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    if stem == "index" {
        if let Some(dir) = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
        {
            return dir.to_string();
        }
    }

    stem.to_string()
}

/// A slug may be nested (`2019/my-post`) but every segment must name a
/// directory below the public dir
fn is_valid_slug(slug: &str) -> bool {
    slug.split('/')
        .all(|segment| !matches!(segment, "" | "." | "..") && !segment.contains('\\'))
}

/// Exactly one post per slug
fn check_unique_slugs(posts: &[Post]) -> Result<(), BuildError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for post in posts {
        if let Some(first) = seen.insert(&post.slug, &post.id) {
            return Err(BuildError::DuplicateSlug {
                slug: post.slug.clone(),
                first: first.to_string(),
                second: post.id.clone(),
            });
        }
    }
    Ok(())
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx" || e == "markdown")
        .unwrap_or(false)
}
