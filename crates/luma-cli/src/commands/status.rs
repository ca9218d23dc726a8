//! Health command implementation

use anyhow::Result;
use luma_core::config::default_config_path;
use luma_core::prompts::default_prompts_dir;
use luma_core::{AIClient, AssistantConfig, ChatBackend};

/// Show the resolved assistant config and check the backend
pub async fn cmd_health(config: &AssistantConfig) -> Result<()> {
    println!("🔍 Checking Luma assistant...\n");

    let source = config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    println!("  Config:   {}", source);
    if config.source.is_none() {
        if let Some(path) = default_config_path() {
            println!("            (override with {})", path.display());
        }
    }
    println!(
        "  Prompts:  {}",
        default_prompts_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!("  Backend:  {}", config.backend);
    println!("  Model:    {}", config.gemini.model);
    println!("  Host:     {}", config.gemini.host);
    println!(
        "  API key:  {}",
        if config.gemini.api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!();

    let Some(client) = AIClient::from_config(config) else {
        println!("⚠️  No AI backend available.");
        println!("\nTo set up Gemini:");
        println!("  1. Create an API key at https://aistudio.google.com/app/apikey");
        println!("  2. export GEMINI_API_KEY=<your key>");
        println!("\nOr run offline with: export AI_BACKEND=mock");
        return Ok(());
    };

    print!("Checking {} availability... ", client.backend_name());
    if client.health_check().await {
        println!("✅ Connected ({} @ {})", client.model(), client.host());
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {} at {}", client.model(), client.host());
    }

    Ok(())
}
