//! Ask command handler

use crate::config::Config;
use crate::services::{ChatService, ProviderRegistry};
use crate::state::build_shared_http_client;

pub async fn cmd_ask(config: &Config, question: &str) -> anyhow::Result<()> {
    let question = question.trim();
    if question.is_empty() {
        println!("Usage: cks-ai ask <question>");
        return Ok(());
    }

    let http = build_shared_http_client(config.search.request_timeout_seconds)?;
    let registry = ProviderRegistry::from_config(config, &http);
    let chat = ChatService::new(registry, &config.chat);

    let reply = chat.respond(question).await;

    println!("{}", reply.response);

    if !reply.sources.is_empty() {
        println!();
        println!("{:-<60}", "");
        for source in &reply.sources {
            println!("[{}] {}", source.position, source.title);
            println!("    {}", source.url);
        }
    }

    Ok(())
}
