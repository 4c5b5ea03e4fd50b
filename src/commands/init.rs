//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Blog
description: ''
keywords: []
author: John Doe
language: en
twitter: ''

# URL
url: http://example.com
canonical_url: ''
path_prefix: /

# Web manifest
short_name: ''
theme_color: '#525dce'
background_color: '#fff'
icon: logo.png

# Directories
public_dir: public
static_dir: static
sources:
  - name: blog
    path: content/blog
  - name: legacy
    path: content/legacy_blog

# Writing
excerpt_length: 300
words_per_minute: 200
show_unpublished: false

# Posts from this source get an embedded video player
embed:
  source: egghead
  url_template: https://egghead.io/lessons/:slug/embed

social_video:
  width: 1280
  height: 720
  preview_image: https://johnlindquist.com/twitter-player-preview.png

feed:
  enable: true
  path: rss.xml
  title: Blog RSS Feed
  limit: 1000
  excerpt_length: 250
"#;

/// Scaffold a blog: config, content sources, static directory and a first post
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already contains a _config.yml", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::create_dir_all(target_dir.join("content/legacy_blog"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
description: The first post on this blog
---

This is your very first post. Posts live under `content/blog` and start with
a front-matter block; `title` and `date` are all a post needs.

## Writing

```bash
$ blog-rs new "My New Post"
```

New posts start with `published: false` and only show up in the preview
server until you flip the flag.

## Highlighting code

```js{{2}}
const greeting = "hello"
console.log(greeting) // highlighted through the info string
const done = true // highlight-line
```

## Previewing and building

```bash
$ blog-rs server
$ blog-rs generate
```
"#,
        today
    );

    fs::write(target_dir.join("content/blog/hello-world.md"), sample_post)?;

    tracing::debug!("Scaffolded site in {:?}", target_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::loader::ContentLoader;
    use crate::Blog;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_matches_defaults() {
        let parsed: SiteConfig = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.sources, defaults.sources);
        assert_eq!(parsed.embed.url_template, defaults.embed.url_template);
        assert_eq!(parsed.feed.limit, defaults.feed.limit);
        assert_eq!(parsed.theme_color, defaults.theme_color);
    }

    #[test]
    fn test_init_site_builds() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        assert!(tmp.path().join("static").is_dir());
        let blog = Blog::new(tmp.path()).unwrap();
        let posts = ContentLoader::new(&blog).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");
        assert!(posts[0].content.contains("highlight-code-line"));
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();
        assert!(init_site(tmp.path()).is_err());
    }
}
