//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Luma - Financial dashboard assistant
#[derive(Parser)]
#[command(name = "luma")]
#[command(about = "Dashboard context, spending insights and the Luma assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dashboard snapshot (JSON with transactions, clients and stats)
    #[arg(long, default_value = "dashboard.json", global = true)]
    pub data: PathBuf,

    /// Assistant config file (defaults to the data dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the AI model for this run
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the dashboard context sent to the assistant
    Context,

    /// Show spending insights (totals, categories, patterns)
    Insights {
        /// Restrict to a month (MM/YYYY)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Look up a client by name and show their statistics
    Client {
        /// Name or part of it (case-insensitive)
        name: String,
    },

    /// List transactions, optionally filtered
    Transactions {
        /// Start date (DD/MM/YYYY, inclusive)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date (DD/MM/YYYY, inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Minimum amount (inclusive)
        #[arg(long)]
        min: Option<f64>,

        /// Maximum amount (inclusive)
        #[arg(long)]
        max: Option<f64>,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Ask Luma a question
    Ask {
        /// The message to send
        message: String,

        /// Do not attach the dashboard context
        #[arg(long)]
        no_context: bool,
    },

    /// Ask Luma to analyze all transactions
    Analyze,

    /// Generate a monthly report
    Report {
        /// Month (1-12)
        month: u32,
        /// Year (e.g. 2024)
        year: i32,
    },

    /// Compare spending between two months
    Compare {
        /// Current month (MM/YYYY)
        current: String,

        /// Previous month (MM/YYYY, defaults to the month before `current`)
        #[arg(long)]
        previous: Option<String>,
    },

    /// Check recent transactions for unusual spending
    Unusual {
        /// Number of most recent transactions to check
        #[arg(short, long, default_value = "10")]
        recent: usize,
    },

    /// Forecast next month's spending
    Predict,

    /// Ask for personalized optimization suggestions
    Suggest {
        /// User profile as JSON (e.g. '{"renda": 5000}')
        #[arg(long)]
        profile: Option<String>,

        /// Financial goals as JSON
        #[arg(long)]
        goals: Option<String>,
    },

    /// Ask Luma to explain one transaction
    Explain {
        /// Transaction ID
        id: i64,
    },

    /// Manage assistant prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Check assistant configuration and backend availability
    Health,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,
    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., chat, monthly_report)
        prompt_id: String,
    },
    /// Show the path where prompt overrides should be placed
    Path,
}
