//! Synth command handler

use crate::config::Config;
use crate::parser::size::format_size;
use crate::services::MediaService;
use crate::state::build_shared_http_client;
use crate::store::FileStore;
use crate::synth::SynthKind;

pub async fn cmd_synth(config: &Config, kind: &str, name: Option<&str>) -> anyhow::Result<()> {
    let kind: SynthKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            println!("{e}");
            println!("Use one of: video, image, audio");
            return Ok(());
        }
    };

    let store = FileStore::new(&config.storage.media_dir, &config.storage.database_file);
    let http = build_shared_http_client(config.search.request_timeout_seconds)?;
    let media = MediaService::new(store, http, &config.media);

    let (filename, size) = if let Some(name) = name {
        if SynthKind::from_filename(name) != Some(kind) {
            println!("Filename must end in .{} for {} samples", kind.extension(), kind.label());
            return Ok(());
        }
        let file = media.fetch_or_synthesize(name).await?;
        if !file.synthesized {
            println!("{name} already exists; left unchanged.");
        }
        (name.to_string(), u64::try_from(file.bytes.len()).unwrap_or(u64::MAX))
    } else {
        let info = media.synthesize_sample(kind).await?;
        (info.name, info.size)
    };

    println!(
        "✓ {} ({}) in {}",
        filename,
        format_size(size),
        media.store().root().display()
    );

    Ok(())
}
