//! The job configuration payload submitted alongside a document.
//!
//! Every key is optional; unknown keys are ignored so older and newer
//! clients can share the endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::catalog::{DEFAULT_LANGUAGE, DEFAULT_MODEL};
use crate::error::CoreError;

pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_PARALLEL_WORKERS: u32 = 1;
pub const DEFAULT_TEST_NUM: u32 = 10;

/// Parsed `settings` form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub model: String,
    /// Credentials keyed by key type (`openai_key`, `claude_key`, ...).
    pub api_keys: HashMap<String, String>,
    pub language: String,
    pub proxy: Option<String>,
    pub api_base: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub single_translate: bool,
    pub use_context: bool,
    pub context_paragraph_limit: u32,
    pub temperature: f64,
    pub parallel_workers: u32,
    #[serde(deserialize_with = "string_list")]
    pub translate_tags: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub exclude_translate_tags: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub exclude_filelist: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub only_filelist: Vec<String>,
    pub allow_navigable_strings: bool,
    pub accumulated_num: u32,
    pub translation_style: Option<String>,
    pub batch_size: Option<u32>,
    pub block_size: i64,
    pub deployment_id: Option<String>,
    /// Comma-separated list of provider model names.
    pub custom_model_list: Option<String>,
    /// Seconds between provider requests (quota-limited providers).
    pub interval: Option<f64>,
    pub resume: bool,
    /// Dry-run mode: only translate the first `test_num` units.
    pub test: bool,
    pub test_num: u32,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_keys: HashMap::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            proxy: None,
            api_base: None,
            system_prompt: None,
            user_prompt: None,
            single_translate: false,
            use_context: false,
            context_paragraph_limit: 0,
            temperature: DEFAULT_TEMPERATURE,
            parallel_workers: DEFAULT_PARALLEL_WORKERS,
            translate_tags: Vec::new(),
            exclude_translate_tags: Vec::new(),
            exclude_filelist: Vec::new(),
            only_filelist: Vec::new(),
            allow_navigable_strings: false,
            accumulated_num: 1,
            translation_style: None,
            batch_size: None,
            block_size: -1,
            deployment_id: None,
            custom_model_list: None,
            interval: None,
            resume: false,
            test: false,
            test_num: DEFAULT_TEST_NUM,
        }
    }
}

impl TranslationSettings {
    /// Parse the raw JSON text of the `settings` form field.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid settings JSON: {e}")))
    }

    /// Credential for `key_type`, ignoring blank values.
    pub fn api_key(&self, key_type: &str) -> Option<&str> {
        self.api_keys
            .get(key_type)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    /// `custom_model_list` split on commas, trimmed, blanks dropped.
    pub fn custom_models(&self) -> Vec<String> {
        self.custom_model_list
            .as_deref()
            .map(split_csv)
            .unwrap_or_default()
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept either a JSON array of strings or a comma-separated string.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Csv(String),
        List(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Csv(raw) => split_csv(&raw),
        OneOrMany::List(items) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        OneOrMany::Null(()) => Vec::new(),
    })
}
