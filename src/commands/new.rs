//! Create a new post

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Front-matter written into a new post
#[derive(Debug, Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    published: bool,
}

/// Create a new post in the named content source, or the first configured one
///
/// The post starts unpublished so it only shows up in development builds.
/// Returns the path of the created file.
pub fn create_post(blog: &Blog, title: &str, source: Option<&str>) -> Result<PathBuf> {
    let content_source = match source {
        Some(name) => blog
            .config
            .sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                let known: Vec<&str> = blog.config.sources.iter().map(|s| s.name.as_str()).collect();
                anyhow::anyhow!("Unknown source: {}. Available: {}", name, known.join(", "))
            })?,
        None => blog
            .config
            .sources
            .first()
            .ok_or_else(|| anyhow::anyhow!("No content sources configured"))?,
    };

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable slug", title);
    }

    let target_dir = blog.base_dir.join(&content_source.path);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        published: false,
    };
    let content = format!("---\n{}---\n\n", serde_yaml::to_string(&scaffold)?);

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(blog: &Blog, title: &str, source: Option<&str>) -> Result<()> {
    let path = create_post(blog, title, source)?;
    println!("Created: {}", path.display());
    Ok(())
}
