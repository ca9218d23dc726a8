//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `assistant` - Luma commands (ask, analyze, report, compare, unusual, predict, suggest, explain)
//! - `core` - Shared utilities (snapshot loading, config, argument parsing)
//! - `dashboard` - Offline commands (context, insights, client, transactions)
//! - `prompts` - Prompt library management commands
//! - `status` - Health check

pub mod assistant;
pub mod core;
pub mod dashboard;
pub mod prompts;
pub mod status;

// Re-export command functions for main.rs
pub use assistant::*;
pub use core::*;
pub use dashboard::*;
pub use prompts::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
