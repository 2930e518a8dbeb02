//! List media command handler

use crate::config::Config;
use crate::parser::size::format_size;
use crate::store::FileStore;

pub async fn cmd_list_media(config: &Config) -> anyhow::Result<()> {
    let store = FileStore::new(&config.storage.media_dir, &config.storage.database_file);
    let files = store.list().await?;

    if files.is_empty() {
        println!("No media files in {}.", store.root().display());
        println!();
        println!("Generate samples with: cks-ai synth video");
        return Ok(());
    }

    println!("Media Files ({} total)", files.len());
    println!("{:-<70}", "");

    for file in files {
        println!(
            "{:<40} {:>12}  {:<6} {}",
            file.name,
            format_size(file.size),
            file.media_type.as_str(),
            file.modified_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
