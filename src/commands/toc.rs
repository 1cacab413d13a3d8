use crate::pdf::outline::read_outline;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let bookmarks = read_outline(&path)?;

    if bookmarks.is_empty() {
        println!("No bookmarks found.");
        return Ok(());
    }

    for bookmark in bookmarks {
        let indent = "  ".repeat(bookmark.level as usize);
        let page_str = bookmark
            .page
            .map(|p| format!(" (p. {})", p))
            .unwrap_or_default();
        println!("{}{}{}", indent, bookmark.title, page_str);
    }

    Ok(())
}
