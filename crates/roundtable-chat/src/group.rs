//! Group chat state and speaker selection

use roundtable_llm::{LLMProvider, Message};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    agent::Agent,
    error::{ChatError, Result},
    message::ChatMessage,
};

/// How the next speaker is chosen each round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerSelectionMethod {
    /// Call agents in roster order, wrapping around
    RoundRobin,
    /// Ask an LLM to pick the next role from the roster
    Auto,
}

/// Template used for LLM-driven selection when none is supplied
const DEFAULT_SELECT_SPEAKER_TEMPLATE: &str = "You are in a role play game. \
The following roles are available: {roles}. \
Read the following conversation. \
Then select the next role from {agentlist} to play. Only return the role name. \
If you think that the task is done, return an empty string as the role name.";

/// A roster of agents plus the conversation they share
///
/// The chat owns the mutable message log; a [`crate::GroupChatManager`]
/// drives the rounds.
pub struct GroupChat {
    agents: Vec<Arc<dyn Agent>>,
    messages: Mutex<Vec<ChatMessage>>,
    max_round: usize,
    allow_repeat_speaker: bool,
    send_introductions: bool,
    selection: SpeakerSelectionMethod,
    select_speaker_message_template: Option<String>,
}

impl GroupChat {
    /// Create a builder
    pub fn builder() -> GroupChatBuilder {
        GroupChatBuilder::new()
    }

    /// Agents in roster order
    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Maximum number of reply rounds
    pub fn max_round(&self) -> usize {
        self.max_round
    }

    /// Whether the roster is introduced at the start of a run
    pub fn send_introductions(&self) -> bool {
        self.send_introductions
    }

    /// Snapshot of the current message log
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }

    pub(crate) async fn set_messages(&self, messages: Vec<ChatMessage>) {
        *self.messages.lock().await = messages;
    }

    /// One line per agent: `name: description`
    fn roles(agents: &[&Arc<dyn Agent>]) -> String {
        agents
            .iter()
            .map(|agent| match agent.description() {
                Some(description) => format!("{}: {}", agent.name(), description),
                None => agent.name().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Introduction message seeded when `send_introductions` is on
    pub(crate) fn introduction_message(&self) -> String {
        let everyone: Vec<&Arc<dyn Agent>> = self.agents.iter().collect();
        format!(
            "Hello everyone. We have assembled a team to answer questions and complete tasks. In attendance are:\n{}",
            Self::roles(&everyone)
        )
    }

    /// Next speaker in roster order after `last_speaker`
    fn next_round_robin(&self, last_speaker: Option<&str>) -> Arc<dyn Agent> {
        let next_index = last_speaker
            .and_then(|name| self.agents.iter().position(|a| a.name() == name))
            .map(|i| (i + 1) % self.agents.len())
            .unwrap_or(0);
        Arc::clone(&self.agents[next_index])
    }

    /// Pick the next speaker, or `None` when the conversation is finished
    pub(crate) async fn select_speaker(
        &self,
        last_speaker: Option<&str>,
        provider: &Arc<dyn LLMProvider>,
        history: &[ChatMessage],
    ) -> Result<Option<Arc<dyn Agent>>> {
        match self.selection {
            SpeakerSelectionMethod::RoundRobin => Ok(Some(self.next_round_robin(last_speaker))),
            SpeakerSelectionMethod::Auto => {
                self.select_speaker_auto(last_speaker, provider, history).await
            }
        }
    }

    async fn select_speaker_auto(
        &self,
        last_speaker: Option<&str>,
        provider: &Arc<dyn LLMProvider>,
        history: &[ChatMessage],
    ) -> Result<Option<Arc<dyn Agent>>> {
        let mut candidates: Vec<&Arc<dyn Agent>> = self
            .agents
            .iter()
            .filter(|a| self.allow_repeat_speaker || Some(a.name()) != last_speaker)
            .collect();
        if candidates.is_empty() {
            // repeat exclusion left nobody; fall back to the whole roster
            candidates = self.agents.iter().collect();
        }

        let selection_prompt = self.render_select_speaker_message(&candidates);

        let mut messages = vec![Message::system(selection_prompt)];
        for msg in history {
            messages.push(Message::user(&msg.content).with_name(&msg.name));
        }

        let response = provider.send_message(messages).await?;
        let answer = response
            .content
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();

        if answer.is_empty() {
            return Ok(None);
        }

        // exact name first, then the longest name mentioned in the answer
        if let Some(agent) = candidates
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(answer))
        {
            return Ok(Some(Arc::clone(agent)));
        }
        if let Some(agent) = candidates
            .iter()
            .filter(|a| answer.contains(a.name()))
            .max_by_key(|a| a.name().len())
        {
            return Ok(Some(Arc::clone(agent)));
        }

        tracing::warn!(
            "Speaker selection returned unknown role {:?}, falling back to roster order",
            answer
        );
        Ok(Some(self.next_round_robin(last_speaker)))
    }

    /// Substitute `{roles}` and `{agentlist}` in the selection template
    fn render_select_speaker_message(&self, candidates: &[&Arc<dyn Agent>]) -> String {
        let template = self
            .select_speaker_message_template
            .as_deref()
            .unwrap_or(DEFAULT_SELECT_SPEAKER_TEMPLATE);

        let agentlist = candidates
            .iter()
            .map(|a| a.name())
            .collect::<Vec<_>>()
            .join(", ");

        template
            .replace("{roles}", &Self::roles(candidates))
            .replace("{agentlist}", &agentlist)
    }
}

/// Builder for [`GroupChat`]
pub struct GroupChatBuilder {
    agents: Vec<Arc<dyn Agent>>,
    max_round: usize,
    allow_repeat_speaker: bool,
    send_introductions: bool,
    selection: SpeakerSelectionMethod,
    select_speaker_message_template: Option<String>,
}

impl GroupChatBuilder {
    /// Create a builder with round-robin selection and 10 rounds
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            max_round: 10,
            allow_repeat_speaker: true,
            send_introductions: false,
            selection: SpeakerSelectionMethod::RoundRobin,
            select_speaker_message_template: None,
        }
    }

    /// Add one agent to the roster
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents to the roster
    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Set the maximum number of reply rounds
    pub fn max_round(mut self, max_round: usize) -> Self {
        self.max_round = max_round;
        self
    }

    /// Allow the same agent to speak in consecutive rounds
    pub fn allow_repeat_speaker(mut self, allow: bool) -> Self {
        self.allow_repeat_speaker = allow;
        self
    }

    /// Seed the chat with a roster introduction
    pub fn send_introductions(mut self, send: bool) -> Self {
        self.send_introductions = send;
        self
    }

    /// Set the speaker selection method
    pub fn selection(mut self, selection: SpeakerSelectionMethod) -> Self {
        self.selection = selection;
        self
    }

    /// Override the speaker selection template
    ///
    /// `{roles}` and `{agentlist}` are substituted at selection time.
    pub fn select_speaker_message_template(mut self, template: impl Into<String>) -> Self {
        self.select_speaker_message_template = Some(template.into());
        self
    }

    /// Build the group chat
    pub fn build(self) -> Result<GroupChat> {
        if self.agents.is_empty() {
            return Err(ChatError::config("group chat needs at least one agent"));
        }
        if self.max_round == 0 {
            return Err(ChatError::config("max_round must be at least 1"));
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if self.agents[..i].iter().any(|a| a.name() == agent.name()) {
                return Err(ChatError::config(format!(
                    "duplicate agent name in roster: {}",
                    agent.name()
                )));
            }
        }

        Ok(GroupChat {
            agents: self.agents,
            messages: Mutex::new(Vec::new()),
            max_round: self.max_round,
            allow_repeat_speaker: self.allow_repeat_speaker,
            send_introductions: self.send_introductions,
            selection: self.selection,
            select_speaker_message_template: self.select_speaker_message_template,
        })
    }
}

impl Default for GroupChatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ConversableAgent;
    use async_trait::async_trait;
    use roundtable_llm::{Response, Result as LlmResult};
    use std::sync::Mutex as StdMutex;

    fn agent(name: &str, description: Option<&str>) -> Arc<dyn Agent> {
        let mut builder = ConversableAgent::builder(name);
        if let Some(d) = description {
            builder = builder.description(d);
        }
        Arc::new(builder.build().unwrap())
    }

    /// Provider that replies with a scripted sequence of answers
    struct ScriptedProvider {
        replies: StdMutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Arc<dyn LLMProvider> {
            Arc::new(Self {
                replies: StdMutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
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

    #[test]
    fn test_empty_roster_rejected() {
        assert!(GroupChat::builder().build().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = GroupChat::builder()
            .agent(agent("twin", None))
            .agent(agent("twin", None))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_round_robin_order() {
        let chat = GroupChat::builder()
            .agent(agent("writer", None))
            .agent(agent("executor", None))
            .build()
            .unwrap();

        assert_eq!(chat.next_round_robin(None).name(), "writer");
        assert_eq!(chat.next_round_robin(Some("writer")).name(), "executor");
        assert_eq!(chat.next_round_robin(Some("executor")).name(), "writer");
        // unknown last speaker restarts at the top
        assert_eq!(chat.next_round_robin(Some("stranger")).name(), "writer");
    }

    #[test]
    fn test_template_rendering() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", Some("Answers questions.")))
            .agent(agent("scribe", None))
            .select_speaker_message_template(
                "Roles: {roles}. Pick from {agentlist}. The request was: count to three.",
            )
            .build()
            .unwrap();

        let candidates: Vec<&Arc<dyn Agent>> = chat.agents().iter().collect();
        let rendered = chat.render_select_speaker_message(&candidates);
        assert!(rendered.contains("oracle: Answers questions."));
        assert!(rendered.contains("Pick from oracle, scribe."));
        assert!(rendered.contains("count to three"));
    }

    #[test]
    fn test_introduction_message_lists_roster() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", Some("Answers questions.")))
            .agent(agent("scribe", None))
            .send_introductions(true)
            .build()
            .unwrap();

        let intro = chat.introduction_message();
        assert!(intro.contains("oracle: Answers questions."));
        assert!(intro.contains("scribe"));
    }

    #[tokio::test]
    async fn test_auto_selection_by_name() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", None))
            .agent(agent("scribe", None))
            .selection(SpeakerSelectionMethod::Auto)
            .build()
            .unwrap();

        let provider = ScriptedProvider::new(&["scribe"]);
        let picked = chat
            .select_speaker(None, &provider, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.name(), "scribe");
    }

    #[tokio::test]
    async fn test_auto_selection_empty_means_done() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", None))
            .selection(SpeakerSelectionMethod::Auto)
            .build()
            .unwrap();

        let provider = ScriptedProvider::new(&[""]);
        let picked = chat.select_speaker(None, &provider, &[]).await.unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_auto_selection_unknown_falls_back_to_order() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", None))
            .agent(agent("scribe", None))
            .selection(SpeakerSelectionMethod::Auto)
            .build()
            .unwrap();

        let provider = ScriptedProvider::new(&["nobody_here"]);
        let picked = chat
            .select_speaker(Some("oracle"), &provider, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.name(), "scribe");
    }

    #[tokio::test]
    async fn test_auto_selection_respects_no_repeat() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", None))
            .agent(agent("scribe", None))
            .selection(SpeakerSelectionMethod::Auto)
            .allow_repeat_speaker(false)
            .build()
            .unwrap();

        // the model names the previous speaker; with repeats disallowed the
        // candidate list no longer contains it, so roster order wins
        let provider = ScriptedProvider::new(&["oracle"]);
        let picked = chat
            .select_speaker(Some("oracle"), &provider, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.name(), "scribe");
    }

    #[tokio::test]
    async fn test_auto_selection_quoted_answer() {
        let chat = GroupChat::builder()
            .agent(agent("oracle", None))
            .agent(agent("scribe", None))
            .selection(SpeakerSelectionMethod::Auto)
            .build()
            .unwrap();

        let provider = ScriptedProvider::new(&["\"oracle\""]);
        let picked = chat
            .select_speaker(None, &provider, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.name(), "oracle");
    }
}
