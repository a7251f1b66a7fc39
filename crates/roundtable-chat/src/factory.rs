//! Factory functions for the stock agent roster
//!
//! Builds the pre-configured personas and the two group-chat managers:
//! a fixed round-robin write-then-execute code loop, and an LLM-driven
//! chat that distributes an arbitrary roster over a user request.

use roundtable_core::ExecutionSettings;
use roundtable_exec::{
    running_inside_ide, CodeExecutor, CommandGuard, DockerCommandLineExecutor,
    LocalCommandLineExecutor, VenvOptions, VirtualEnv,
};
use roundtable_llm::LLMProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    agent::{Agent, ConversableAgent},
    group::{GroupChat, SpeakerSelectionMethod},
    manager::{is_termination_message, GroupChatManager},
    Result,
};

/// System message for the code writer when the caller supplies none
pub const DEFAULT_CODE_WRITER_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant. \
Solve tasks using your coding and language skills. \
Suggest python code (in a python coding block) or shell script (in a sh coding block) for the user to execute. \
Write one code block per reply and make it complete; the user cannot modify your code. \
Check the execution result returned by the user. \
If the result indicates there is an error, fix the error and output the code again. \
Reply 'TERMINATE' when the task is done.";

const GENERAL_KNOWLEDGE_SYSTEM_MESSAGE: &str = "You answer the question or request provided \
with natural language only. You cannot generate or execute code. You cannot talk to the web. \
You are good at chatting.";

const GENERAL_KNOWLEDGE_DESCRIPTION: &str = "This agent is able to answer general knowledge \
questions based on its own memory or past conversation context. Only answers with natural \
language. It can not execute code. It can not generate code examples. It is only good at \
chatting and answering simple questions.";

const HUMAN_PROXY_SYSTEM_MESSAGE: &str = "You act as the user who made the request. You are \
interested in seeing whether your request or message is answered or delivered by the other \
agents.";

const CODE_MANAGER_SYSTEM_MESSAGE: &str = "You are able to generate and execute code. You can \
talk to the web. You can solve complex tasks using coding (python and shell scripting) and \
language skills.";

const CODE_MANAGER_DESCRIPTION: &str = "Completes simple or complex tasks via python or sh \
coding. Complex tasks can involve many coding operations and web search. It can both generate \
and execute the code. This agent has to be picked for any coding related task or tasks that \
are more complex than just chatting or simple question answering.";

const MAIN_SELECT_SPEAKER_TEMPLATE: &str = "You are in a role play game. The following roles \
are available: {roles}. Read the following conversation. Then select the next role from \
{agentlist} to play. Only return the role name. Important: This is the user prompt: {prompt} \
If you think that the user request is answered, return an empty string as the role name.";

/// Selection template for the main chat with the user prompt filled in
pub(crate) fn main_select_speaker_template(prompt: &str) -> String {
    MAIN_SELECT_SPEAKER_TEMPLATE.replace("{prompt}", prompt)
}

/// Build the code execution backend described by `settings`
///
/// Docker-backed when `run_code_in_docker` is set; otherwise a local
/// executor wrapping a freshly created virtual environment. Inside an IDE
/// harness the virtual environment step is skipped with a warning and the
/// system interpreter is used. Restriction level 2 and above arms the
/// command guard on the local backend.
pub async fn code_executor(
    work_dir: impl Into<PathBuf>,
    settings: &ExecutionSettings,
) -> Result<Arc<dyn CodeExecutor>> {
    let work_dir = work_dir.into();
    let timeout = Duration::from_secs(settings.timeout_secs);

    if settings.run_code_in_docker {
        let executor =
            DockerCommandLineExecutor::new(&settings.docker_image, timeout, &work_dir)?;
        return Ok(Arc::new(executor));
    }

    let venv = if running_inside_ide() {
        tracing::warn!(
            "IDE harness detected, skipping virtual environment; using the system interpreter"
        );
        None
    } else {
        let venv_dir = settings
            .venv_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!(".venv_{}", Uuid::new_v4())));
        let options = VenvOptions {
            system_site_packages: settings.system_site_packages,
            with_pip: true,
            symlinks: true,
        };
        Some(VirtualEnv::create(venv_dir, &options).await?)
    };

    let mut executor = LocalCommandLineExecutor::new(timeout, work_dir)?.with_virtual_env(venv);
    if settings.restrictions_level >= 2 {
        executor = executor.with_guard(CommandGuard::strict());
    }

    Ok(Arc::new(executor))
}

/// Agent that executes code blocks it receives; no LLM attached
pub fn code_executor_agent(
    executor: Arc<dyn CodeExecutor>,
    max_consecutive_auto_reply: usize,
) -> Result<ConversableAgent> {
    ConversableAgent::builder("code_executor_agent")
        .executor(executor)
        .max_consecutive_auto_reply(max_consecutive_auto_reply)
        .build()
}

/// Agent that writes code for others to execute; code execution off
pub fn code_writer_agent(
    provider: Arc<dyn LLMProvider>,
    system_prompt: Option<&str>,
    max_consecutive_auto_reply: usize,
) -> Result<ConversableAgent> {
    ConversableAgent::builder("code_writer_agent")
        .system_message(system_prompt.unwrap_or(DEFAULT_CODE_WRITER_SYSTEM_MESSAGE))
        .provider(provider)
        .max_consecutive_auto_reply(max_consecutive_auto_reply)
        .build()
}

/// Agent answering general knowledge questions with natural language only
pub fn general_knowledge_agent(
    provider: Arc<dyn LLMProvider>,
    max_consecutive_auto_reply: usize,
) -> Result<ConversableAgent> {
    ConversableAgent::builder("general_knowledge_agent")
        .system_message(GENERAL_KNOWLEDGE_SYSTEM_MESSAGE)
        .description(GENERAL_KNOWLEDGE_DESCRIPTION)
        .provider(provider)
        .max_consecutive_auto_reply(max_consecutive_auto_reply)
        .build()
}

/// Agent emulating the requesting user
pub fn human_proxy_agent(
    provider: Arc<dyn LLMProvider>,
    max_consecutive_auto_reply: usize,
) -> Result<ConversableAgent> {
    ConversableAgent::builder("human_proxy_agent")
        .system_message(HUMAN_PROXY_SYSTEM_MESSAGE)
        .provider(provider)
        .max_consecutive_auto_reply(max_consecutive_auto_reply)
        .build()
}

/// Manager for the write-then-execute code loop
///
/// Wires a code writer and a code executor agent into a round-robin group
/// chat: the writer speaks first, the executor runs what it wrote, and so
/// on until the writer says TERMINATE or a round produces no output.
pub fn code_group_chat_manager(
    provider: Arc<dyn LLMProvider>,
    executor: Arc<dyn CodeExecutor>,
    code_writer_system_prompt: Option<&str>,
    max_consecutive_auto_reply: usize,
    max_round: usize,
) -> Result<GroupChatManager> {
    let writer = code_writer_agent(
        Arc::clone(&provider),
        code_writer_system_prompt,
        max_consecutive_auto_reply,
    )?;
    let runner = code_executor_agent(executor, max_consecutive_auto_reply)?;

    let group = GroupChat::builder()
        .agent(Arc::new(writer))
        .agent(Arc::new(runner))
        .max_round(max_round)
        .selection(SpeakerSelectionMethod::RoundRobin)
        .build()?;

    GroupChatManager::builder("code_group_chat_manager")
        .system_message(CODE_MANAGER_SYSTEM_MESSAGE)
        .description(CODE_MANAGER_DESCRIPTION)
        .group(group)
        .provider(provider)
        .termination(is_termination_message)
        .build()
}

/// Manager distributing an arbitrary roster over a user request
///
/// Uses the LLM to select the next speaker each round; the selection
/// template embeds the user's original `prompt` and instructs the model to
/// return an empty role name once the request is answered. Agents are
/// introduced to each other and may speak in consecutive rounds.
pub fn main_group_chat_manager(
    provider: Arc<dyn LLMProvider>,
    prompt: &str,
    agents: Vec<Arc<dyn Agent>>,
    max_round: usize,
) -> Result<GroupChatManager> {
    let group = GroupChat::builder()
        .agents(agents)
        .max_round(max_round)
        .allow_repeat_speaker(true)
        .send_introductions(true)
        .selection(SpeakerSelectionMethod::Auto)
        .select_speaker_message_template(main_select_speaker_template(prompt))
        .build()?;

    GroupChatManager::builder("main_group_chat_manager")
        .group(group)
        .provider(provider)
        .termination(is_termination_message)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roundtable_llm::{Message, Response, Result as LlmResult};

    struct SilentProvider;

    #[async_trait]
    impl LLMProvider for SilentProvider {
        async fn send_message(&self, _messages: Vec<Message>) -> LlmResult<Response> {
            Ok(Response {
                content: String::new(),
                model: "silent".to_string(),
                usage: None,
                finish_reason: None,
            })
        }

        fn model(&self) -> &str {
            "silent"
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    fn provider() -> Arc<dyn LLMProvider> {
        Arc::new(SilentProvider)
    }

    // serializes the tests that toggle PYCHARM_HOSTED
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[tokio::test]
    async fn test_docker_flag_selects_docker_backend() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExecutionSettings {
            run_code_in_docker: true,
            ..Default::default()
        };

        let executor = code_executor(dir.path(), &settings).await.unwrap();
        assert_eq!(executor.name(), "docker_command_line");
    }

    #[tokio::test]
    async fn test_local_backend_inside_ide_skips_venv() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // simulate the IDE harness so no interpreter or venv is required
        std::env::set_var("PYCHARM_HOSTED", "1");
        let dir = tempfile::tempdir().unwrap();
        let settings = ExecutionSettings::default();

        let executor = code_executor(dir.path(), &settings).await.unwrap();
        std::env::remove_var("PYCHARM_HOSTED");

        assert_eq!(executor.name(), "local_command_line");
    }

    #[test]
    fn test_writer_agent_defaults() {
        let agent = code_writer_agent(provider(), None, 1).unwrap();
        assert_eq!(agent.name(), "code_writer_agent");
        assert_eq!(agent.max_consecutive_auto_reply(), 1);
    }

    #[test]
    fn test_general_knowledge_agent_description() {
        let agent = general_knowledge_agent(provider(), 1).unwrap();
        assert_eq!(agent.name(), "general_knowledge_agent");
        assert!(agent.description().unwrap().contains("general knowledge"));
    }

    #[test]
    fn test_human_proxy_agent_name() {
        let agent = human_proxy_agent(provider(), 2).unwrap();
        assert_eq!(agent.name(), "human_proxy_agent");
        assert_eq!(agent.max_consecutive_auto_reply(), 2);
    }

    #[tokio::test]
    async fn test_code_manager_wiring() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("PYCHARM_HOSTED", "1");
        let dir = tempfile::tempdir().unwrap();
        let executor = code_executor(dir.path(), &ExecutionSettings::default())
            .await
            .unwrap();
        std::env::remove_var("PYCHARM_HOSTED");

        let manager = code_group_chat_manager(provider(), executor, None, 1, 10).unwrap();
        assert_eq!(manager.name(), "code_group_chat_manager");
        assert!(manager.system_message().unwrap().contains("generate and execute"));
        assert!(manager.description().unwrap().contains("python or sh"));
    }

    #[test]
    fn test_main_template_embeds_prompt() {
        let rendered = main_select_speaker_template("plot the population of Tokyo");
        assert!(rendered.contains("plot the population of Tokyo"));
        // roster placeholders are substituted later, at selection time
        assert!(rendered.contains("{roles}"));
        assert!(rendered.contains("{agentlist}"));
        assert!(rendered.contains("return an empty string"));
    }

    #[test]
    fn test_main_manager_requires_agents() {
        let result = main_group_chat_manager(provider(), "prompt", vec![], 10);
        assert!(result.is_err());
    }
}
