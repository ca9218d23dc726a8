//! Luma CLI - Financial dashboard assistant
//!
//! Usage:
//!   luma --data dashboard.json context       Print the assistant's dashboard context
//!   luma --data dashboard.json insights      Spending insights, no AI needed
//!   luma --data dashboard.json ask "..."     Ask Luma a question
//!   luma health                              Check assistant configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data = cli.data.as_path();
    let config = || commands::load_config(cli.config.as_deref(), cli.model.as_deref());

    match cli.command {
        Commands::Context => commands::cmd_context(data),
        Commands::Insights { month } => commands::cmd_insights(data, month.as_deref()),
        Commands::Client { name } => commands::cmd_client(data, &name),
        Commands::Transactions {
            from,
            to,
            min,
            max,
            limit,
        } => commands::cmd_transactions(data, from.as_deref(), to.as_deref(), min, max, limit),
        Commands::Ask {
            message,
            no_context,
        } => commands::cmd_ask(data, &config()?, &message, no_context).await,
        Commands::Analyze => commands::cmd_analyze(data, &config()?).await,
        Commands::Report { month, year } => {
            commands::cmd_report(data, &config()?, month, year).await
        }
        Commands::Compare { current, previous } => {
            commands::cmd_compare(data, &config()?, &current, previous.as_deref()).await
        }
        Commands::Unusual { recent } => commands::cmd_unusual(data, &config()?, recent).await,
        Commands::Predict => commands::cmd_predict(data, &config()?).await,
        Commands::Suggest { profile, goals } => {
            commands::cmd_suggest(data, &config()?, profile.as_deref(), goals.as_deref()).await
        }
        Commands::Explain { id } => commands::cmd_explain(data, &config()?, id).await,
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Health => commands::cmd_health(&config()?).await,
    }
}
