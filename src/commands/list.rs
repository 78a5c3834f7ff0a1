//! List published posts

use anyhow::Result;

use crate::Site;

/// Print every post the content store would pre-generate
pub async fn run(site: &Site) -> Result<()> {
    let builder = site.builder()?;
    let paths = builder.enumerate_post_paths().await?;

    println!("Posts ({}):", paths.len());
    for path in paths {
        println!("  /post/{}/ [{}]", path.slug, path.id);
    }

    Ok(())
}
