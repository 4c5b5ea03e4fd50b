//! Generator module - renders the listing, post pages, feed and manifest
//! into the public directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{
    absolute_url, date_rfc2822, decode_entities, escape_xml, full_url_for, is_external, prune,
    strip_html, url_for,
};
use crate::layout::{rhythm, Head, PageMeta};
use crate::listing::{self, ListingEntry, Navigation};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Static site generator using the embedded Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
        })
    }

    fn config(&self) -> &SiteConfig {
        &self.blog.config
    }

    /// Generate the entire site
    ///
    /// Only posts visible in the listing get a page; unpublished posts stay
    /// out of a production build entirely.
    pub fn generate(&self, posts: &[Post]) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_static_assets()?;

        let visible = listing::select(posts, self.blog.shows_unpublished());

        let index = self.render_index(&visible)?;
        self.write_output(Path::new("index.html"), &index)?;

        for (i, post) in visible.iter().enumerate() {
            let navigation = Navigation::for_index(&visible, i);
            let html = self.render_post(post, &navigation)?;
            self.write_output(&Path::new(&post.slug).join("index.html"), &html)?;
            self.copy_post_assets(post)?;
        }
        tracing::info!("Generated {} post pages", visible.len());

        if self.config().feed.enable {
            let feed = self.render_feed(posts);
            self.write_output(Path::new(&self.config().feed.path), &feed)?;
            tracing::info!("Generated {}", self.config().feed.path);
        }

        self.write_output(Path::new("manifest.webmanifest"), &self.render_manifest()?)?;

        Ok(())
    }

    /// Render the listing page for posts already filtered and ordered
    pub fn render_index(&self, listing: &[&Post]) -> Result<String> {
        let config = self.config();
        let head = Head::resolve(
            config,
            &PageMeta {
                title: &config.title,
                ..Default::default()
            },
        )
        .with_canonical(config, &url_for(config, "/"));

        let entries: Vec<ListingEntry> = listing
            .iter()
            .map(|post| ListingEntry::new(config, post))
            .collect();

        let mut context = Context::new();
        context.insert("head", &head);
        context.insert("site_host", &config.host());
        context.insert("posts", &entries);
        context.insert("entry_spacing", &rhythm(2.0));

        Ok(self.renderer.render("index.html", &context)?)
    }

    /// Render a single post page
    pub fn render_post(&self, post: &Post, navigation: &Navigation) -> Result<String> {
        let config = self.config();
        let head = Head::resolve(
            config,
            &PageMeta {
                title: &post.title,
                description: post.description.as_deref(),
                keywords: post.keywords.as_deref(),
                date: Some(post.date),
                reading_time: Some(&post.reading_time.text),
                twitter_embed_video: post.twitter_embed_video.as_deref(),
            },
        )
        .with_canonical(config, &post.path);

        let embed_url = (post.source == config.embed.source).then(|| config.embed.url_for(&post.slug));

        let mut context = Context::new();
        context.insert("head", &head);
        context.insert("site_host", &config.host());
        context.insert("post", &ListingEntry::new(config, post));
        context.insert("heading_spacing", &rhythm(0.5));
        context.insert("banner_alt", &config.keywords.join(", "));
        context.insert("embed_url", &embed_url);
        context.insert("content", &post.content);
        context.insert("navigation", navigation);

        Ok(self.renderer.render("post.html", &context)?)
    }

    /// Render the RSS 2.0 feed
    ///
    /// Always limited to published posts, whatever the build mode.
    pub fn render_feed(&self, posts: &[Post]) -> String {
        let config = self.config();
        let feed = &config.feed;
        let items: Vec<&Post> = listing::select(posts, false)
            .into_iter()
            .take(feed.limit)
            .collect();
        let site_url = full_url_for(config, "/");

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<rss version=\"2.0\" xmlns:content=\"http://purl.org/rss/1.0/modules/content/\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
        xml.push_str("  <channel>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&feed.title)));
        xml.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(&config.description)
        ));
        xml.push_str(&format!("    <link>{}</link>\n", escape_xml(&site_url)));
        xml.push_str(&format!(
            "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
            escape_xml(&full_url_for(config, &feed.path))
        ));
        xml.push_str("    <generator>blog-rs</generator>\n");
        // Newest post date keeps the output stable across rebuilds
        if let Some(newest) = items.first() {
            xml.push_str(&format!(
                "    <lastBuildDate>{}</lastBuildDate>\n",
                date_rfc2822(&newest.date)
            ));
        }

        for post in items {
            let link = absolute_url(config, &post.path);
            let description = prune(&decode_entities(&strip_html(&post.content)), feed.excerpt_length);
            let site_root = config.url.trim_end_matches('/');
            let content = strip_invalid_xml_chars(&absolutize_urls(&post.content, site_root));

            xml.push_str("    <item>\n");
            xml.push_str(&format!("      <title>{}</title>\n", escape_xml(&post.title)));
            xml.push_str(&format!(
                "      <description>{}</description>\n",
                escape_xml(&description)
            ));
            xml.push_str(&format!("      <link>{}</link>\n", escape_xml(&link)));
            xml.push_str(&format!(
                "      <guid isPermaLink=\"false\">{}</guid>\n",
                escape_xml(&link)
            ));
            xml.push_str(&format!(
                "      <pubDate>{}</pubDate>\n",
                date_rfc2822(&post.date)
            ));
            xml.push_str(&format!(
                "      <content:encoded><![CDATA[{}]]></content:encoded>\n",
                content.replace("]]>", "]]]]><![CDATA[>")
            ));
            xml.push_str("    </item>\n");
        }

        xml.push_str("  </channel>\n");
        xml.push_str("</rss>\n");
        xml
    }

    /// Render the web app manifest
    pub fn render_manifest(&self) -> Result<String> {
        let config = self.config();
        let short_name = if config.short_name.is_empty() {
            &config.title
        } else {
            &config.short_name
        };

        let manifest = serde_json::json!({
            "name": config.title,
            "short_name": short_name,
            "start_url": url_for(config, "/"),
            "background_color": config.background_color,
            "theme_color": config.theme_color,
            "display": "standalone",
            "icons": [{
                "src": url_for(config, &config.icon),
                "sizes": "512x512",
                "type": icon_mime(&config.icon),
            }],
        });

        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    /// Write a file below the public directory
    fn write_output(&self, relative: &Path, contents: &str) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated {:?}", output_path);
        Ok(())
    }

    /// Copy everything under the static directory into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                copy_file(path, &self.blog.public_dir.join(relative))?;
            }
        }

        Ok(())
    }

    /// Copy files a post references relatively so they resolve next to its page
    ///
    /// A post stored as `<dir>/index.md` owns its directory and every
    /// non-markdown file in it is copied; a standalone post only has its
    /// relative banner copied.
    fn copy_post_assets(&self, post: &Post) -> Result<()> {
        let Some(post_dir) = post.full_source.parent() else {
            return Ok(());
        };
        let page_dir = self.blog.public_dir.join(&post.slug);

        let is_source_root = self
            .config()
            .sources
            .iter()
            .any(|source| self.blog.base_dir.join(&source.path) == post_dir);
        let owns_dir = !is_source_root
            && post
                .full_source
                .file_stem()
                .map(|stem| stem == "index")
                .unwrap_or(false);

        if owns_dir {
            for entry in WalkDir::new(post_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && !is_markdown(path) {
                    let relative = path.strip_prefix(post_dir)?;
                    copy_file(path, &page_dir.join(relative))?;
                }
            }
        } else if let Some(banner) = post.banner.as_deref() {
            if is_external(banner) || banner.starts_with('/') {
                return Ok(());
            }
            let relative = banner.trim_start_matches("./");
            let source = post_dir.join(relative);
            if source.is_file() {
                copy_file(&source, &page_dir.join(relative))?;
            } else {
                tracing::warn!("Banner {:?} of post {} not found", source, post.slug);
            }
        }

        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)
        .map_err(|e| anyhow::anyhow!("Failed to copy {:?} to {:?}: {}", from, to, e))?;
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("mdx") | Some("markdown")
    )
}

fn icon_mime(icon: &str) -> &'static str {
    match Path::new(icon).extension().and_then(|e| e.to_str()) {
        Some("svg") => "image/svg+xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        _ => "image/png",
    }
}

/// Point root-relative links at the site so they survive feed readers
fn absolutize_urls(content: &str, site_root: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", site_root))
        .replace("src=\"/", &format!("src=\"{}/", site_root))
        .replace("href='/", &format!("href='{}/", site_root))
        .replace("src='/", &format!("src='{}/", site_root))
}

/// Drop characters that are not allowed anywhere in an XML document
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use crate::content::loader::ContentLoader;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(dir: &Path) {
        write(
            dir,
            "_config.yml",
            "title: Test Blog\ndescription: Notes\nkeywords: [egghead, rust]\nurl: https://johnlindquist.com\ntwitter: johnlindquist\n",
        );
        write(
            dir,
            "content/blog/first.md",
            "---\ntitle: First & Best\ndate: 2020-03-01\nbanner: ./banner.png\ntwitterEmbedVideo: https://example.com/player\n---\nFirst body.\n",
        );
        write(dir, "content/blog/banner.png", "png");
        write(
            dir,
            "content/legacy_blog/older/index.md",
            "---\ntitle: Older\ndate: 2019-01-01\n---\nOlder body ![pic](./pic.jpg)\n",
        );
        write(dir, "content/legacy_blog/older/pic.jpg", "jpg");
        write(
            dir,
            "content/blog/draft.md",
            "---\ntitle: Draft\ndate: 2021-01-01\npublished: false\n---\nNot yet.\n",
        );
        write(dir, "static/logo.png", "logo");
    }

    fn build(blog: &Blog) -> Vec<Post> {
        let posts = ContentLoader::new(blog).load_posts().unwrap();
        Generator::new(blog).unwrap().generate(&posts).unwrap();
        posts
    }

    fn read(blog: &Blog, rel: &str) -> String {
        fs::read_to_string(blog.public_dir.join(rel)).unwrap()
    }

    #[test]
    fn test_generate_site() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let index = read(&blog, "index.html");
        assert!(index.contains("<h1>johnlindquist.com</h1>"));
        assert!(index.contains("First &amp; Best"));
        assert!(index.contains("March 1st, 2020"));
        assert!(index.contains("Continue reading..."));
        assert!(!index.contains("Draft"));
        assert!(index.find("First &amp; Best").unwrap() < index.find("Older").unwrap());

        assert!(blog.public_dir.join("first/index.html").exists());
        assert!(blog.public_dir.join("older/index.html").exists());
        assert!(!blog.public_dir.join("draft/index.html").exists());

        assert!(blog.public_dir.join("logo.png").exists());
        assert!(blog.public_dir.join("first/banner.png").exists());
        assert!(blog.public_dir.join("older/pic.jpg").exists());
    }

    #[test]
    fn test_post_page() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let first = read(&blog, "first/index.html");
        assert!(first.contains("&lt;- johnlindquist.com"));
        assert!(first.contains("<img src=\"/first/banner.png\" alt=\"egghead, rust\""));
        assert!(first.contains("<meta name=\"twitter:card\" content=\"player\">"));
        assert!(first.contains("<meta name=\"twitter:site\" content=\"@johnlindquist\">"));
        assert!(first.contains("<meta name=\"twitter:player:width\" content=\"1280\">"));
        assert!(first.contains("<meta name=\"twitter:label1\" content=\"Reading time\">"));
        assert!(first.contains("<link rel=\"canonical\" href=\"https://johnlindquist.com/first/\">"));
        assert!(first.contains("rel=\"prev\""));
        assert!(!first.contains("rel=\"next\""));

        let older = read(&blog, "older/index.html");
        assert!(!older.contains("<img src=\"/older/"));
        assert!(!older.contains("twitter:card"));
        assert!(older.contains("rel=\"next\""));
        assert!(!older.contains("rel=\"prev\""));
    }

    #[test]
    fn test_social_video_tags_appear_once() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let first = read(&blog, "first/index.html");
        for name in [
            "twitter:card",
            "twitter:site",
            "twitter:player",
            "twitter:player:width",
            "twitter:player:height",
            "twitter:image",
            "twitter:title",
            "twitter:description",
        ] {
            assert_eq!(
                first.matches(&format!("name=\"{}\"", name)).count(),
                1,
                "{} should appear exactly once",
                name
            );
        }
        assert!(first.contains(
            "<meta name=\"twitter:image\" content=\"https://johnlindquist.com/twitter-player-preview.png\">"
        ));
    }

    #[test]
    fn test_post_page_without_twitter_handle() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        write(tmp.path(), "_config.yml", "title: Test Blog\nurl: https://johnlindquist.com\n");
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let first = read(&blog, "first/index.html");
        assert!(first.contains("<meta name=\"twitter:card\" content=\"player\">"));
        assert!(first.contains("<meta name=\"twitter:player\" content=\"https://example.com/player\">"));
        assert!(!first.contains("name=\"twitter:site\""));
        assert!(!first.contains("content=\"@\""));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "_config.yml",
            "title: T\nsources:\n  - name: egghead\n    path: content/egghead\nembed:\n  source: egghead\n  url_template: https://egghead.io/lessons/:slug/embed?autoplay=1&mute=1\n",
        );
        write(
            tmp.path(),
            "content/egghead/lesson.md",
            "---\ntitle: Lesson\ndate: 2020-01-01\nbanner: 'https://cdn.example.com/a\".png?x=1&y=2'\n---\nBody\n",
        );
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let banner = "src=\"https://cdn.example.com/a&quot;.png?x=1&amp;y=2\"";
        assert!(read(&blog, "index.html").contains(banner));

        let lesson = read(&blog, "lesson/index.html");
        assert!(lesson.contains(banner));
        assert!(lesson.contains(
            "<iframe src=\"https://egghead.io/lessons/lesson/embed?autoplay=1&amp;mute=1\""
        ));
    }

    #[test]
    fn test_embed_only_for_embed_source() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        write(
            tmp.path(),
            "_config.yml",
            "title: Test Blog\nsources:\n  - name: egghead\n    path: content/egghead\n",
        );
        write(
            tmp.path(),
            "content/egghead/lesson.md",
            "---\ntitle: Lesson\ndate: 2020-01-01\n---\nWatch this.\n",
        );
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let lesson = read(&blog, "lesson/index.html");
        assert!(lesson.contains("<iframe src=\"https://egghead.io/lessons/lesson/embed\""));
        assert!(lesson.contains("padding-top: 56.25%"));
    }

    #[test]
    fn test_development_mode_shows_drafts() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path())
            .unwrap()
            .with_mode(BuildMode::Development);
        build(&blog);

        assert!(read(&blog, "index.html").contains("Draft"));
        assert!(blog.public_dir.join("draft/index.html").exists());
        // The feed never carries unpublished posts
        assert!(!read(&blog, "rss.xml").contains("Draft"));
    }

    #[test]
    fn test_feed() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let feed = read(&blog, "rss.xml");
        assert!(feed.contains("<title>Blog RSS Feed</title>"));
        assert!(feed.contains("<title>First &amp; Best</title>"));
        assert!(feed.contains("<link>https://johnlindquist.com/first/</link>"));
        assert!(feed.contains("<pubDate>Sun, 1 Mar 2020 00:00:00 +0000</pubDate>"));
        assert!(feed.contains("<content:encoded><![CDATA[<p>First body.</p>"));
        assert!(!feed.contains("Not yet."));
        assert!(feed.find("First &amp; Best").unwrap() < feed.find("<title>Older</title>").unwrap());
    }

    #[test]
    fn test_feed_limit() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let mut blog = Blog::new(tmp.path()).unwrap();
        blog.config.feed.limit = 1;
        let posts = ContentLoader::new(&blog).load_posts().unwrap();
        let feed = Generator::new(&blog).unwrap().render_feed(&posts);
        assert_eq!(feed.matches("<item>").count(), 1);
    }

    #[test]
    fn test_manifest() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let manifest: serde_json::Value =
            serde_json::from_str(&read(&blog, "manifest.webmanifest")).unwrap();
        assert_eq!(manifest["name"], "Test Blog");
        assert_eq!(manifest["short_name"], "Test Blog");
        assert_eq!(manifest["start_url"], "/");
        assert_eq!(manifest["display"], "standalone");
        assert_eq!(manifest["theme_color"], "#525dce");
        assert_eq!(manifest["icons"][0]["src"], "/logo.png");
    }

    #[test]
    fn test_generate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path());
        let blog = Blog::new(tmp.path()).unwrap();

        build(&blog);
        let first = (read(&blog, "index.html"), read(&blog, "first/index.html"), read(&blog, "rss.xml"));
        build(&blog);
        let second = (read(&blog, "index.html"), read(&blog, "first/index.html"), read(&blog, "rss.xml"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_slug_link_matches_output() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "content/blog/nested.md",
            "---\ntitle: Nested\ndate: 2019-05-01\nslug: 2019/my-post\nbanner: ./cover.png\n---\nBody\n",
        );
        write(tmp.path(), "content/blog/cover.png", "png");
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        let index = read(&blog, "index.html");
        assert!(index.contains("<a href=\"/2019/my-post/\">Nested</a>"));
        assert!(blog.public_dir.join("2019/my-post/index.html").exists());
        assert!(blog.public_dir.join("2019/my-post/cover.png").exists());
        assert!(read(&blog, "rss.xml").contains("<link>http://example.com/2019/my-post/</link>"));
    }

    #[test]
    fn test_slug_outside_public_dir_fails_build() {
        let tmp = TempDir::new().unwrap();
        let site_dir = tmp.path().join("site");
        write(
            &site_dir,
            "content/blog/escape.md",
            "---\ntitle: Escape\ndate: 2020-01-01\nslug: ../../outside\n---\nBody\n",
        );
        let blog = Blog::new(&site_dir).unwrap();

        assert!(ContentLoader::new(&blog).load_posts().is_err());
        assert!(!tmp.path().join("outside/index.html").exists());
    }

    #[test]
    fn test_empty_site() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();
        build(&blog);

        assert!(read(&blog, "index.html").contains("<html lang=\"en\">"));
        assert_eq!(read(&blog, "rss.xml").matches("<item>").count(), 0);
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("a\u{0008}b\nc"), "ab\nc");
    }
}
