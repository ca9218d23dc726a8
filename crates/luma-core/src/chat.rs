//! Chat gateway
//!
//! Owns the conversation with the assistant: the broadcast chat history,
//! prompt rendering and the round trip through an [`AIClient`].
//!
//! ```rust,ignore
//! let gateway = ChatGateway::new(client, &config).with_store(store.clone());
//! let _sub = gateway.subscribe_history(|h| println!("{} messages", h.len()));
//! let reply = gateway.send_message("Qual foi minha maior compra?", None).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::ai::{AIClient, ChatBackend, ChatMessage, ChatRequest};
use crate::config::{AssistantConfig, ChatConfig};
use crate::context::{format_dashboard_context, ContextPayload};
use crate::error::Result;
use crate::prompts::{PromptId, PromptLibrary};
use crate::store::{DashboardStore, Subject, Subscription};

/// Assistant message appended when a request fails
pub const APOLOGY_MESSAGE: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Por favor, tente novamente.";

/// A prompt rendered and ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f32>,
}

/// Conversation front end for the assistant
pub struct ChatGateway {
    client: AIClient,
    prompts: Arc<RwLock<PromptLibrary>>,
    history: Subject<Vec<ChatMessage>>,
    store: Option<Arc<DashboardStore>>,
    config: ChatConfig,
}

impl ChatGateway {
    /// Create a gateway using the default prompt library
    pub fn new(client: AIClient, config: &AssistantConfig) -> Self {
        let config = config.chat.clone();
        Self {
            client,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            history: Subject::new(vec![ChatMessage::assistant(&config.welcome_message)]),
            store: None,
            config,
        }
    }

    /// Share a prompt library (e.g. one with a custom override dir)
    pub fn with_prompts(mut self, prompts: Arc<RwLock<PromptLibrary>>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Attach a dashboard store; its context is used when a message has none
    pub fn with_store(mut self, store: Arc<DashboardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    pub fn store(&self) -> Option<&Arc<DashboardStore>> {
        self.store.as_ref()
    }

    /// Current chat history, welcome message first
    pub fn history(&self) -> Arc<Vec<ChatMessage>> {
        self.history.get()
    }

    /// Observe history changes; the current history is delivered immediately
    pub fn subscribe_history<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<Vec<ChatMessage>>) + Send + Sync + 'static,
    {
        self.history.subscribe(listener)
    }

    /// Reset history to just the welcome message
    pub fn clear_history(&self) {
        self.history
            .next(vec![ChatMessage::assistant(&self.config.welcome_message)]);
        debug!("Chat history cleared");
    }

    /// Send a user message and record both sides in the history
    ///
    /// Without an explicit context, the attached store's dashboard summary is
    /// sent. On failure an apology is recorded and the error returned.
    pub async fn send_message(
        &self,
        text: &str,
        context: Option<ContextPayload>,
    ) -> Result<ChatMessage> {
        let previous = self.history.get();
        self.push(ChatMessage::user(text));

        let context = context.or_else(|| {
            self.store
                .as_ref()
                .map(|store| ContextPayload::Text(format_dashboard_context(store)))
        });

        let result = match self.build_chat_request(text, context.as_ref(), &previous) {
            Ok(request) => self.client.complete(&request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => {
                let message = ChatMessage::assistant(reply);
                self.push(message.clone());
                info!(
                    model = %self.client.model(),
                    chars = message.content.len(),
                    "Assistant replied"
                );
                Ok(message)
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.push(ChatMessage::assistant(APOLOGY_MESSAGE));
                Err(e)
            }
        }
    }

    /// One-shot monthly report; not recorded in the history
    pub async fn generate_report(&self, context: &ContextPayload) -> Result<String> {
        self.one_shot(PromptId::MonthlyReport, context).await
    }

    /// One-shot optimization suggestions; not recorded in the history
    pub async fn optimization_suggestions(&self, context: &ContextPayload) -> Result<String> {
        self.one_shot(PromptId::OptimizationSuggestions, context).await
    }

    /// Render a prompt's user section with the Luma system instruction
    pub fn render_prompt(&self, id: PromptId, vars: &HashMap<&str, &str>) -> Result<RenderedPrompt> {
        let mut prompts = self.prompts.write().unwrap_or_else(PoisonError::into_inner);

        let system = prompts
            .get(PromptId::LumaSystem)?
            .system_section()
            .map(str::to_string);
        let prompt = prompts.get(id)?;

        Ok(RenderedPrompt {
            system: system.or_else(|| prompt.system_section().map(str::to_string)),
            user: prompt.render_user(vars),
            temperature: prompt.metadata.temperature,
        })
    }

    async fn one_shot(&self, id: PromptId, context: &ContextPayload) -> Result<String> {
        let rendered_context = context.render();
        let vars = HashMap::from([("context", rendered_context.as_str())]);
        let rendered = self.render_prompt(id, &vars)?;

        let request = ChatRequest {
            system: rendered.system,
            messages: vec![ChatMessage::user(rendered.user)],
            temperature: rendered.temperature,
            max_output_tokens: None,
        };

        debug!(prompt = id.as_str(), "Sending one-shot request");
        self.client.complete(&request).await
    }

    fn build_chat_request(
        &self,
        text: &str,
        context: Option<&ContextPayload>,
        previous: &[ChatMessage],
    ) -> Result<ChatRequest> {
        let rendered_context = context.map(ContextPayload::render);
        let mut vars = HashMap::from([("message", text)]);
        if let Some(ref ctx) = rendered_context {
            vars.insert("context", ctx.as_str());
        }
        let rendered = self.render_prompt(PromptId::Chat, &vars)?;

        let mut messages = bounded_history(previous, self.config.history_limit);
        messages.push(ChatMessage::user(rendered.user));

        Ok(ChatRequest {
            system: rendered.system,
            messages,
            temperature: rendered.temperature,
            max_output_tokens: None,
        })
    }

    fn push(&self, message: ChatMessage) {
        let mut history = self.history.get().as_ref().clone();
        history.push(message);
        self.history.next(history);
    }
}

/// Last `limit` messages, starting at a user turn
fn bounded_history(history: &[ChatMessage], limit: usize) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .skip_while(|m| !m.is_user())
        .cloned()
        .collect()
}
