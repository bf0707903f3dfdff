//! Everything an engine run needs, resolved up front.
//!
//! An [`EngineInvocation`] is built once per job and handed to the engine by
//! reference. It carries all per-job options explicitly, including network
//! settings, so concurrent jobs never share process-global state.

use std::path::PathBuf;

use serde::Serialize;

/// User prompt used when only a system prompt override is supplied.
pub const DEFAULT_USER_PROMPT: &str =
    "Please translate the following text into {language}:\n\n{text}";

/// Single-language or side-by-side output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Original paragraph followed by its translation.
    Bilingual,
    /// Translation only.
    Single,
}

/// Model generation within the OpenAI family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAiGeneration {
    Gpt35,
    Gpt4,
    Gpt4oMini,
    Gpt4o,
    O1Preview,
    O1,
    O1Mini,
    O3Mini,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeminiTier {
    Flash,
    Pro,
}

/// Provider family sub-selection derived from the model id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    OpenAi(OpenAiGeneration),
    /// `snapshot` names a specific model, e.g. `claude-3-5-sonnet-latest`.
    Claude { snapshot: Option<String> },
    Gemini(GeminiTier),
    /// Provider without generation sub-selection (DeepL, Google, Groq, ...).
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSelection {
    /// Catalog model id as submitted.
    pub model: String,
    pub family: ModelFamily,
    /// Explicit provider model names; empty means the family default.
    pub custom_models: Vec<String>,
    /// Azure-style deployment id.
    pub deployment_id: Option<String>,
    /// Seconds between requests for quota-limited providers.
    pub request_interval: Option<f64>,
}

/// Per-invocation network settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub proxy: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptConfig {
    pub system: Option<String>,
    pub user: String,
}

impl PromptConfig {
    /// Build prompt overrides; `None` when neither override is supplied.
    pub fn from_overrides(system: Option<&str>, user: Option<&str>) -> Option<Self> {
        let system = system.map(str::trim).filter(|s| !s.is_empty());
        let user = user.map(str::trim).filter(|s| !s.is_empty());
        if system.is_none() && user.is_none() {
            return None;
        }
        Some(Self {
            system: system.map(str::to_string),
            user: user.unwrap_or(DEFAULT_USER_PROMPT).to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextOptions {
    pub enabled: bool,
    pub paragraph_limit: u32,
}

/// Which parts of a document are translated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentFilters {
    pub translate_tags: Vec<String>,
    pub exclude_translate_tags: Vec<String>,
    pub only_files: Vec<String>,
    pub exclude_files: Vec<String>,
    pub allow_navigable_strings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineInvocation {
    /// Uploaded document; the artifact is written next to it.
    pub book_path: PathBuf,
    pub model: ModelSelection,
    pub api_key: Option<String>,
    pub resume: bool,
    /// Target language display name (e.g. `Simplified Chinese`).
    pub language: String,
    pub network: NetworkConfig,
    pub prompt: Option<PromptConfig>,
    pub output_mode: OutputMode,
    pub context: ContextOptions,
    pub temperature: f64,
    /// Fan-out hint for engines that translate units in parallel.
    pub parallel_workers: u32,
    pub filters: ContentFilters,
    pub accumulated_num: Option<u32>,
    pub translation_style: Option<String>,
    pub batch_size: Option<u32>,
    pub block_size: Option<u32>,
    /// Dry-run: translate at most this many units.
    pub test_limit: Option<u32>,
}
