//! Full roster demo: general knowledge, human proxy and the code chat
//! manager, coordinated by LLM-driven speaker selection.
//!
//! Usage: cargo run --example main_chat -- "How many lines are in /etc/hosts?"

use roundtable_chat::{factory, Agent};
use roundtable_core::{init_logging, load_config_or_default};
use roundtable_llm::create_provider;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_or_default("roundtable.toml");
    init_logging(&config.logging);

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "How many lines are in /etc/hosts?".to_string());

    let provider = create_provider(&config.llm)?;
    let work_dir = config
        .execution
        .work_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("roundtable_workdir"));
    let executor = factory::code_executor(&work_dir, &config.execution).await?;

    let max_reply = config.chat.max_consecutive_auto_reply;
    let code_manager = factory::code_group_chat_manager(
        Arc::clone(&provider),
        executor,
        None,
        max_reply,
        config.chat.max_round,
    )?;
    let knowledge = factory::general_knowledge_agent(Arc::clone(&provider), max_reply)?;
    let proxy = factory::human_proxy_agent(Arc::clone(&provider), max_reply)?;

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(knowledge),
        Arc::new(proxy),
        Arc::new(code_manager),
    ];

    let manager =
        factory::main_group_chat_manager(provider, &prompt, agents, config.chat.max_round)?;

    let transcript = manager.run(&prompt).await?;
    for message in &transcript {
        println!("[{}] {}", message.name, message.content);
    }

    Ok(())
}
