//! Luma Core Library
//!
//! Shared functionality for the Luma financial dashboard assistant:
//! - Dashboard store with change notification
//! - Insight aggregation over spending records
//! - Assistant context formatting
//! - Chat gateway over a pluggable AI backend (Gemini)
//! - Prompt library for customizable assistant prompts

pub mod ai;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod insights;
pub mod models;
pub mod prompts;
pub mod store;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, ChatBackend, ChatMessage, ChatRequest, ChatRole, GeminiBackend, MockBackend};
pub use assistant::InsightAssistant;
pub use chat::{ChatGateway, RenderedPrompt};
pub use config::{AssistantConfig, BackendKind};
pub use context::{format_dashboard_context, render_context, ContextPayload};
pub use error::{Error, Result};
pub use models::{
    Client, ClientStats, DashboardSnapshot, DashboardStats, Transaction, TransactionDate,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use store::{DashboardStore, Subject, Subscription};
