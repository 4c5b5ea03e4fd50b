//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::helpers::date_iso;
use crate::listing;
use crate::Blog;

/// Print every post in listing order, unpublished ones included and marked
pub fn run(blog: &Blog) -> Result<()> {
    let posts = ContentLoader::new(blog).load_posts()?;
    let lines = format_listing(&posts);

    println!("Posts ({}):", lines.len());
    for line in lines {
        println!("  {}", line);
    }

    Ok(())
}

/// One line per post, newest first
pub fn format_listing(posts: &[Post]) -> Vec<String> {
    listing::select(posts, true)
        .into_iter()
        .map(|post| {
            format!(
                "{} - {} [{}] ({}){}",
                date_iso(&post.date),
                post.title,
                post.source,
                post.reading_time.text,
                if post.published { "" } else { " unpublished" }
            )
        })
        .collect()
}
