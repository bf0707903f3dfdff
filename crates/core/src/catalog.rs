//! Static catalogs: translation models, target languages and supported
//! document formats.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// File formats
// ---------------------------------------------------------------------------

/// Document extensions the engine knows how to load.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["epub", "txt", "srt", "md"];

/// Lower-cased extension of `filename` (text after the last dot).
///
/// A name without a dot has no extension and yields an empty string.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

/// Validate that `filename` has a supported extension.
pub fn validate_file_type(filename: &str) -> Result<String, CoreError> {
    let ext = file_extension(filename);
    if ext.is_empty() {
        return Err(CoreError::Validation(format!(
            "File has no extension: {filename}"
        )));
    }
    if is_supported_extension(&ext) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!("Unsupported file type: {ext}")))
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Model used when the configuration does not name one.
pub const DEFAULT_MODEL: &str = "chatgptapi";

/// Prefix accepted for any Anthropic model snapshot (e.g. `claude-3-5-sonnet-latest`).
pub const CLAUDE_SNAPSHOT_PREFIX: &str = "claude-";

/// Credential key types, as used in the `api_keys` configuration map.
pub const KEY_OPENAI: &str = "openai_key";
pub const KEY_CLAUDE: &str = "claude_key";
pub const KEY_GEMINI: &str = "gemini_key";
pub const KEY_GROQ: &str = "groq_key";
pub const KEY_XAI: &str = "xai_key";
pub const KEY_DEEPL: &str = "deepl_key";
pub const KEY_CAIYUN: &str = "caiyun_key";
pub const KEY_CUSTOM_API: &str = "custom_api";
pub const KEY_LITELLM: &str = "litellm_key";

/// A translation model as exposed by `GET /api/models`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub value: &'static str,
    pub label: &'static str,
    pub requires_api_key: bool,
    pub api_key_type: Option<&'static str>,
}

const fn keyed(value: &'static str, label: &'static str, key: &'static str) -> ModelInfo {
    ModelInfo {
        value,
        label,
        requires_api_key: true,
        api_key_type: Some(key),
    }
}

const fn free(value: &'static str, label: &'static str) -> ModelInfo {
    ModelInfo {
        value,
        label,
        requires_api_key: false,
        api_key_type: None,
    }
}

/// Every model the engine can drive.
pub const MODELS: &[ModelInfo] = &[
    keyed("chatgptapi", "ChatGPT API (GPT-3.5)", KEY_OPENAI),
    keyed("gpt4", "GPT-4", KEY_OPENAI),
    keyed("gpt4omini", "GPT-4o Mini", KEY_OPENAI),
    keyed("gpt4o", "GPT-4o", KEY_OPENAI),
    keyed("o1preview", "O1 Preview", KEY_OPENAI),
    keyed("o1", "O1", KEY_OPENAI),
    keyed("o1mini", "O1 Mini", KEY_OPENAI),
    keyed("o3mini", "O3 Mini", KEY_OPENAI),
    keyed("openai", "Custom OpenAI Model", KEY_OPENAI),
    keyed("claude", "Claude", KEY_CLAUDE),
    keyed("claude-2", "Claude 2", KEY_CLAUDE),
    keyed("claude-3", "Claude 3", KEY_CLAUDE),
    keyed("gemini", "Gemini Flash", KEY_GEMINI),
    keyed("geminipro", "Gemini Pro", KEY_GEMINI),
    keyed("groq", "Groq", KEY_GROQ),
    keyed("xai", "xAI Grok", KEY_XAI),
    keyed("deepl", "DeepL Pro", KEY_DEEPL),
    free("deeplfree", "DeepL Free"),
    free("google", "Google Translate"),
    keyed("caiyun", "Caiyun Translate", KEY_CAIYUN),
    free("tencentransmart", "Tencent TranSmart"),
    keyed("customapi", "Custom API", KEY_CUSTOM_API),
    keyed("litellm", "LiteLLM", KEY_LITELLM),
];

/// Resolve a model id against the catalog.
///
/// Unlisted `claude-*` ids resolve to an Anthropic entry carrying the
/// caller's id, so specific snapshots can be requested.
pub fn find_model(value: &str) -> Option<ModelInfo> {
    if let Some(model) = MODELS.iter().find(|m| m.value == value) {
        return Some(*model);
    }
    if value.starts_with(CLAUDE_SNAPSHOT_PREFIX) {
        return Some(keyed("claude", "Claude", KEY_CLAUDE));
    }
    None
}

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// Language used when the configuration does not name one.
pub const DEFAULT_LANGUAGE: &str = "zh-hans";

/// A target language as exposed by `GET /api/languages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub value: &'static str,
    pub label: &'static str,
}

const fn lang(value: &'static str, label: &'static str) -> LanguageInfo {
    LanguageInfo { value, label }
}

pub const LANGUAGES: &[LanguageInfo] = &[
    lang("zh-hans", "Simplified Chinese"),
    lang("zh-hant", "Traditional Chinese"),
    lang("en", "English"),
    lang("ja", "Japanese"),
    lang("ko", "Korean"),
    lang("fr", "French"),
    lang("de", "German"),
    lang("es", "Spanish"),
    lang("it", "Italian"),
    lang("pt", "Portuguese"),
    lang("ru", "Russian"),
    lang("ar", "Arabic"),
    lang("hi", "Hindi"),
    lang("th", "Thai"),
    lang("vi", "Vietnamese"),
    lang("nl", "Dutch"),
    lang("sv", "Swedish"),
    lang("da", "Danish"),
    lang("no", "Norwegian"),
    lang("fi", "Finnish"),
    lang("pl", "Polish"),
    lang("tr", "Turkish"),
    lang("he", "Hebrew"),
    lang("cs", "Czech"),
    lang("hu", "Hungarian"),
    lang("ro", "Romanian"),
    lang("bg", "Bulgarian"),
    lang("hr", "Croatian"),
    lang("sk", "Slovak"),
    lang("sl", "Slovenian"),
    lang("et", "Estonian"),
    lang("lv", "Latvian"),
    lang("lt", "Lithuanian"),
];

/// Map a language code or display name to the display name the engine
/// expects in its prompts. Matching is case-insensitive.
pub fn resolve_language(input: &str) -> Option<&'static str> {
    let needle = input.trim();
    LANGUAGES
        .iter()
        .find(|l| l.value.eq_ignore_ascii_case(needle) || l.label.eq_ignore_ascii_case(needle))
        .map(|l| l.label)
}
