//! End-to-end group chat tests with scripted LLM replies and real local
//! code execution (sh only, so no interpreter setup is required).

use async_trait::async_trait;
use roundtable_chat::{
    factory, ConversableAgent, GroupChat, GroupChatManager, SpeakerSelectionMethod,
};
use roundtable_exec::LocalCommandLineExecutor;
use roundtable_llm::{LLMProvider, Message, Response, Result as LlmResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Provider that replays a fixed sequence of completions
struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Arc<dyn LLMProvider> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn send_message(&self, _messages: Vec<Message>) -> LlmResult<Response> {
        let content = self.replies.lock().unwrap().pop().unwrap_or_default();
        Ok(Response {
            content,
            model: "scripted".to_string(),
            usage: None,
            finish_reason: None,
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn local_executor(dir: &tempfile::TempDir) -> Arc<LocalCommandLineExecutor> {
    Arc::new(LocalCommandLineExecutor::new(Duration::from_secs(10), dir.path()).unwrap())
}

#[tokio::test]
async fn code_chat_writes_executes_and_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let writer_llm = ScriptedProvider::new(&[
        "Run this:\n```sh\necho roundtable\n```",
        "The output looks right. TERMINATE",
    ]);

    let manager = factory::code_group_chat_manager(
        writer_llm,
        local_executor(&dir),
        None,
        1,
        10,
    )
    .unwrap();

    let transcript = manager.run("Echo the word roundtable.").await.unwrap();

    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[0].name, "code_group_chat_manager");
    assert_eq!(transcript[1].name, "code_writer_agent");
    assert_eq!(transcript[2].name, "code_executor_agent");
    assert!(transcript[2].content.contains("exitcode: 0 (execution succeeded)"));
    assert!(transcript[2].content.contains("roundtable"));
    assert!(transcript[3].content.contains("TERMINATE"));

    // the group chat keeps the log of the latest run
    assert_eq!(manager.messages().await, transcript);
}

#[tokio::test]
async fn code_chat_without_code_blocks_ends_on_empty_reply() {
    let dir = tempfile::tempdir().unwrap();
    let writer_llm = ScriptedProvider::new(&["I could not come up with any code for this."]);

    let manager = factory::code_group_chat_manager(
        writer_llm,
        local_executor(&dir),
        None,
        1,
        10,
    )
    .unwrap();

    let transcript = manager.run("Do something impossible.").await.unwrap();

    // executor had nothing to run, its empty reply terminates the chat
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2].name, "code_executor_agent");
    assert_eq!(transcript[2].content, "");
}

#[tokio::test]
async fn main_chat_selects_speakers_until_empty_role() {
    let gk_llm = ScriptedProvider::new(&["The capital of France is Paris."]);
    let proxy_llm = ScriptedProvider::new(&[]);

    let knowledge = factory::general_knowledge_agent(gk_llm, 1).unwrap();
    let proxy = factory::human_proxy_agent(proxy_llm, 1).unwrap();

    // the selection model picks the knowledge agent, then declares the
    // request answered with an empty role name
    let selector_llm = ScriptedProvider::new(&["general_knowledge_agent", ""]);

    let manager = factory::main_group_chat_manager(
        selector_llm,
        "What is the capital of France?",
        vec![Arc::new(knowledge), Arc::new(proxy)],
        10,
    )
    .unwrap();

    let transcript = manager.run("What is the capital of France?").await.unwrap();

    assert_eq!(transcript.len(), 3);
    // introductions make the roster visible to everyone
    assert!(transcript[0].content.contains("general_knowledge_agent"));
    assert!(transcript[0].content.contains("human_proxy_agent"));
    assert_eq!(transcript[2].name, "general_knowledge_agent");
    assert!(transcript[2].content.contains("Paris"));
}

#[tokio::test]
async fn code_manager_participates_in_main_chat() {
    let dir = tempfile::tempdir().unwrap();
    let writer_llm = ScriptedProvider::new(&["```sh\necho nested\n```", "TERMINATE"]);

    // round-robin selection never consults the manager's provider, so the
    // writer's script is the only LLM traffic inside the nested chat
    let code_manager = factory::code_group_chat_manager(
        writer_llm,
        local_executor(&dir),
        None,
        1,
        10,
    )
    .unwrap();

    let outer_selector = ScriptedProvider::new(&["code_group_chat_manager", ""]);
    let manager = factory::main_group_chat_manager(
        outer_selector,
        "Echo the word nested.",
        vec![Arc::new(code_manager)],
        10,
    )
    .unwrap();

    let transcript = manager.run("Echo the word nested.").await.unwrap();

    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2].name, "code_group_chat_manager");
    assert!(transcript[2].content.contains("exitcode: 0 (execution succeeded)"));
    assert!(transcript[2].content.contains("nested"));
}

#[tokio::test]
async fn round_robin_chat_stops_at_max_round() {
    let alice_llm = ScriptedProvider::new(&["a1", "a2", "a3"]);
    let bob_llm = ScriptedProvider::new(&["b1", "b2", "b3"]);

    let alice = ConversableAgent::builder("alice")
        .provider(alice_llm)
        .max_consecutive_auto_reply(5)
        .build()
        .unwrap();
    let bob = ConversableAgent::builder("bob")
        .provider(bob_llm)
        .max_consecutive_auto_reply(5)
        .build()
        .unwrap();

    let group = GroupChat::builder()
        .agent(Arc::new(alice))
        .agent(Arc::new(bob))
        .max_round(4)
        .selection(SpeakerSelectionMethod::RoundRobin)
        .build()
        .unwrap();

    let manager = GroupChatManager::builder("debate_manager")
        .group(group)
        .provider(ScriptedProvider::new(&[]))
        .build()
        .unwrap();

    let transcript = manager.run("Discuss.").await.unwrap();

    // task message plus exactly max_round replies, alternating speakers
    assert_eq!(transcript.len(), 5);
    let speakers: Vec<&str> = transcript[1..].iter().map(|m| m.name.as_str()).collect();
    assert_eq!(speakers, vec!["alice", "bob", "alice", "bob"]);
}

#[tokio::test]
async fn consecutive_reply_budget_ends_chat() {
    let alice_llm = ScriptedProvider::new(&["first thought", "second thought"]);

    let alice = ConversableAgent::builder("alice")
        .provider(alice_llm)
        .max_consecutive_auto_reply(1)
        .build()
        .unwrap();

    let group = GroupChat::builder()
        .agent(Arc::new(alice))
        .max_round(10)
        .selection(SpeakerSelectionMethod::Auto)
        .build()
        .unwrap();

    // the selector keeps naming the same agent; its budget of one
    // consecutive reply ends the chat after the first turn
    let manager = GroupChatManager::builder("loop_manager")
        .group(group)
        .provider(ScriptedProvider::new(&["alice", "alice", "alice"]))
        .build()
        .unwrap();

    let transcript = manager.run("Think out loud.").await.unwrap();

    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].name, "alice");
    assert_eq!(transcript[1].content, "first thought");
}
