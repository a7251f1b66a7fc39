//! Write-then-execute code loop against a live OpenAI-compatible server.
//!
//! Usage: cargo run --example code_chat -- "Print the first ten square numbers."

use roundtable_chat::factory;
use roundtable_core::{init_logging, load_config_or_default};
use roundtable_llm::create_provider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_or_default("roundtable.toml");
    init_logging(&config.logging);

    let task = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Print the first ten square numbers.".to_string());

    let provider = create_provider(&config.llm)?;
    let work_dir = config
        .execution
        .work_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("roundtable_workdir"));
    let executor = factory::code_executor(&work_dir, &config.execution).await?;

    let manager = factory::code_group_chat_manager(
        provider,
        executor,
        None,
        config.chat.max_consecutive_auto_reply,
        config.chat.max_round,
    )?;

    let transcript = manager.run(&task).await?;
    for message in &transcript {
        println!("[{}] {}", message.name, message.content);
    }

    Ok(())
}
