//! Post model

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// Estimated time to read a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
    pub text: String,
}

impl ReadingTime {
    /// Estimate from a word count; never less than one minute
    pub fn from_words(words: usize, words_per_minute: usize) -> Self {
        let words_per_minute = words_per_minute.max(1);
        let minutes = words.div_ceil(words_per_minute).max(1);
        Self {
            words,
            minutes,
            text: format!("{} min read", minutes),
        }
    }

    /// Estimate from plain text
    pub fn from_text(text: &str, words_per_minute: usize) -> Self {
        Self::from_words(count_words(text), words_per_minute)
    }
}

/// Count words in plain text, treating each CJK character as a word
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if c == '\'' || c == '’' {
            // contractions stay one word
        } else {
            in_word = false;
        }
    }

    count
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Unique id: source file path relative to the site directory
    pub id: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Slug (URL-friendly name), unique across the site
    pub slug: String,

    /// URL path (`/<slug>/` under the path prefix)
    pub path: String,

    /// Whether the post appears in production listings
    pub published: bool,

    /// Plain-text excerpt
    pub excerpt: String,

    /// Optional banner image
    pub banner: Option<String>,

    /// Per-post keywords, overriding the site keywords when present
    pub keywords: Option<Vec<String>>,

    /// Per-post description, overriding the site description when present
    pub description: Option<String>,

    /// Twitter player URL
    pub twitter_embed_video: Option<String>,

    /// Name of the content source this post came from
    pub source: String,

    /// Reading time estimate
    pub reading_time: ReadingTime,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: NaiveDate, source: &str, id: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            path: format!("/{}/", slug),
            full_source: PathBuf::from(&id),
            id,
            title,
            date,
            slug,
            published: true,
            excerpt: String::new(),
            banner: None,
            keywords: None,
            description: None,
            twitter_embed_video: None,
            source: source.to_string(),
            reading_time: ReadingTime::from_words(0, 200),
            raw: String::new(),
            content: String::new(),
        }
    }
}
