//! Generate static files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Blog;

/// Load every post and render the whole site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let posts = ContentLoader::new(blog).load_posts()?;
    let unpublished = posts.iter().filter(|p| !p.published).count();
    tracing::info!(
        "Loaded {} posts ({} unpublished, {:?} mode)",
        posts.len(),
        unpublished,
        blog.mode
    );

    Generator::new(blog)?.generate(&posts)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Reload the configuration from disk and rebuild in the same mode
///
/// Picks up edits to `_config.yml` made while watching.
pub fn rebuild(blog: &Blog) -> Result<Blog> {
    let fresh = Blog::new(&blog.base_dir)?.with_mode(blog.mode);
    run(&fresh)?;
    Ok(fresh)
}

/// Paths whose changes require a rebuild, with how to watch each one
pub fn watched_paths(blog: &Blog) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths: Vec<(PathBuf, RecursiveMode)> = blog
        .config
        .sources
        .iter()
        .map(|source| blog.base_dir.join(&source.path))
        .chain(std::iter::once(blog.static_dir.clone()))
        .filter(|dir| dir.exists())
        .map(|dir| (dir, RecursiveMode::Recursive))
        .collect();

    let config_path = blog.base_dir.join("_config.yml");
    if config_path.exists() {
        paths.push((config_path, RecursiveMode::NonRecursive));
    }

    paths
}

/// Whether a changed path is worth a rebuild (editor and VCS noise is not)
pub fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// Watch content, static files and the config, regenerating on change
///
/// Changes are debounced on the trailing edge: a rebuild starts once the
/// watched files have been quiet for 500ms, so multi-step saves are picked
/// up in their final state. Blocks until the watcher shuts down.
pub fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for (path, mode) in watched_paths(blog) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    rebuild_on_change(blog.clone(), &rx, |_| {});
    Ok(())
}

/// Rebuild once per debounced batch of relevant changes until the watcher
/// goes away, calling `on_rebuilt` after every successful build
///
/// A failed build is logged and the previous configuration kept. Returns
/// the site as of the last successful build.
pub fn rebuild_on_change(
    mut blog: Blog,
    rx: &Receiver<DebounceEventResult>,
    mut on_rebuilt: impl FnMut(&Blog),
) -> Blog {
    while let Ok(result) = rx.recv() {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed: Vec<_> = events
            .iter()
            .filter(|e| is_relevant_change(&e.path))
            .collect();
        if changed.is_empty() {
            continue;
        }
        for event in &changed {
            tracing::info!("File changed: {}", event.path.display());
        }

        match rebuild(&blog) {
            Ok(fresh) => {
                blog = fresh;
                on_rebuilt(&blog);
            }
            Err(e) => tracing::error!("Generation failed: {:#}", e),
        }
    }

    blog
}
