//! Prompt Library for the assistant
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/luma/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Each prompt is Markdown with YAML frontmatter and `# System` / `# User`
//! sections. Variables use `{{name}}`; `{{#if name}}...{{/if}}` blocks are kept
//! only when the variable is present and non-empty.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const LUMA_SYSTEM: &str = include_str!("../../../prompts/luma_system.md");
    pub const CHAT: &str = include_str!("../../../prompts/chat.md");
    pub const ANALYZE_TRANSACTIONS: &str = include_str!("../../../prompts/analyze_transactions.md");
    pub const MONTHLY_REPORT: &str = include_str!("../../../prompts/monthly_report.md");
    pub const OPTIMIZATION_SUGGESTIONS: &str =
        include_str!("../../../prompts/optimization_suggestions.md");
    pub const COMPARE_PERIODS: &str = include_str!("../../../prompts/compare_periods.md");
    pub const EXPLAIN_TRANSACTION: &str = include_str!("../../../prompts/explain_transaction.md");
    pub const PREDICT_SPENDING: &str = include_str!("../../../prompts/predict_spending.md");
    pub const UNUSUAL_SPENDING: &str = include_str!("../../../prompts/unusual_spending.md");
    pub const SPENDING_CHECK: &str = include_str!("../../../prompts/spending_check.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Assistant persona, sent as the system instruction
    LumaSystem,
    /// Free-form chat message with optional context
    Chat,
    AnalyzeTransactions,
    MonthlyReport,
    OptimizationSuggestions,
    ComparePeriods,
    ExplainTransaction,
    PredictSpending,
    /// Some recent transactions were flagged as unusual
    UnusualSpending,
    /// Nothing was flagged
    SpendingCheck,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LumaSystem => "luma_system",
            Self::Chat => "chat",
            Self::AnalyzeTransactions => "analyze_transactions",
            Self::MonthlyReport => "monthly_report",
            Self::OptimizationSuggestions => "optimization_suggestions",
            Self::ComparePeriods => "compare_periods",
            Self::ExplainTransaction => "explain_transaction",
            Self::PredictSpending => "predict_spending",
            Self::UnusualSpending => "unusual_spending",
            Self::SpendingCheck => "spending_check",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::LumaSystem,
            Self::Chat,
            Self::AnalyzeTransactions,
            Self::MonthlyReport,
            Self::OptimizationSuggestions,
            Self::ComparePeriods,
            Self::ExplainTransaction,
            Self::PredictSpending,
            Self::UnusualSpending,
            Self::SpendingCheck,
        ]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::LumaSystem => defaults::LUMA_SYSTEM,
            Self::Chat => defaults::CHAT,
            Self::AnalyzeTransactions => defaults::ANALYZE_TRANSACTIONS,
            Self::MonthlyReport => defaults::MONTHLY_REPORT,
            Self::OptimizationSuggestions => defaults::OPTIMIZATION_SUGGESTIONS,
            Self::ComparePeriods => defaults::COMPARE_PERIODS,
            Self::ExplainTransaction => defaults::EXPLAIN_TRANSACTION,
            Self::PredictSpending => defaults::PREDICT_SPENDING,
            Self::UnusualSpending => defaults::UNUSUAL_SPENDING,
            Self::SpendingCheck => defaults::SPENDING_CHECK,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown prompt: {}", s))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Sampling temperature override for this prompt
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Text under `# System`, used as the Gemini system instruction
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the `# User` section (or the whole body when it has none)
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(self.user_section().unwrap_or(&self.content), vars)
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Library reading overrides from [`default_prompts_dir`]
    pub fn new() -> Self {
        Self::at(default_prompts_dir())
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self::at(Some(path))
    }

    /// Embedded defaults only, ignoring any override files
    pub fn embedded_only() -> Self {
        Self::at(None)
    }

    fn at(override_dir: Option<PathBuf>) -> Self {
        Self {
            override_dir,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, parsing it on first use
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let override_file = self.override_file(id);
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => Ok(&*entry.insert(load_prompt(id, override_file)?)),
        }
    }

    /// Every known prompt with its version and override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_file(id);
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map_or(0, |p| p.metadata.version),
                    temperature: prompt.and_then(|p| p.metadata.temperature),
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_file(id).is_some()
    }

    /// Path of the override for `id`, if one exists on disk
    fn override_file(&self, id: PromptId) -> Option<PathBuf> {
        let path = self
            .override_dir
            .as_ref()?
            .join(format!("{}.md", id.as_str()));
        path.exists().then_some(path)
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    /// Temperature override, if any
    pub temperature: Option<f32>,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("luma").join("prompts").join("overrides"))
}

fn load_prompt(id: PromptId, override_file: Option<PathBuf>) -> Result<Prompt> {
    let Some(path) = override_file else {
        let (metadata, content) = parse_prompt(id.default_content())?;
        return Ok(Prompt {
            metadata,
            content,
            is_override: false,
            override_path: None,
        });
    };

    let raw = fs::read_to_string(&path)
        .map_err(|e| Error::Prompt(format!("Failed to read {}: {}", path.display(), e)))?;
    let (metadata, content) = parse_prompt(&raw)?;
    tracing::debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
    Ok(Prompt {
        metadata,
        content,
        is_override: true,
        override_path: Some(path),
    })
}

/// Split `---` YAML frontmatter from the Markdown body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let rest = content
        .trim()
        .strip_prefix("---")
        .ok_or_else(|| Error::Prompt("Prompt must start with YAML frontmatter (---)".into()))?;
    let (frontmatter, body) = rest
        .split_once("---")
        .ok_or_else(|| Error::Prompt("Prompt frontmatter not closed (missing second ---)".into()))?;

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter.trim())
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.trim().to_string()))
}

/// Text between `header` and the next top-level heading
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let (_, after) = content.split_once(header)?;
    let section = after.split_once("\n# ").map_or(after, |(section, _)| section);
    Some(section.trim())
}

/// Replace `{{var}}` placeholders, then resolve conditional blocks
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    remove_unmatched_conditionals(&result, vars).trim().to_string()
}

/// Keep `{{#if var}}` blocks whose variable is set, drop the rest
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = &result[var_start..var_start + var_end];
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = &result[block_start..block_start + endif_pos];
        let full_end = block_start + endif_pos + 7;

        let should_include = vars.get(var_name).is_some_and(|v| !v.is_empty());

        result = if should_include {
            format!(
                "{}{}{}",
                &result[..if_start],
                block_content,
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}
