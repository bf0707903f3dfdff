//! Resolve a submitted configuration into an [`EngineInvocation`].
//!
//! All validation that needs the catalog happens here, on the worker
//! thread, before the engine is touched. Any failure is a
//! [`WorkerError::Configuration`].

use std::path::Path;

use bbm_core::catalog::{self, ModelInfo, CLAUDE_SNAPSHOT_PREFIX};
use bbm_core::settings::TranslationSettings;
use bbm_engine::invocation::{
    ContentFilters, ContextOptions, EngineInvocation, GeminiTier, ModelFamily, ModelSelection,
    NetworkConfig, OpenAiGeneration, OutputMode, PromptConfig,
};

use crate::error::WorkerError;

/// Validate `settings` for the document at `book_path` and build the engine
/// invocation.
pub fn build_invocation(
    book_path: &Path,
    settings: &TranslationSettings,
) -> Result<EngineInvocation, WorkerError> {
    let file_name = book_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    catalog::validate_file_type(&file_name)
        .map_err(|_| config_error(format!("Unsupported file type: {}", catalog::file_extension(&file_name))))?;

    let model_id = settings.model.trim();
    let model = catalog::find_model(model_id)
        .ok_or_else(|| config_error(format!("Unsupported model: {model_id}")))?;

    let api_key = resolve_api_key(model_id, &model, settings)?;

    let language = catalog::resolve_language(&settings.language)
        .ok_or_else(|| config_error(format!("Unsupported language: {}", settings.language)))?;

    Ok(EngineInvocation {
        book_path: book_path.to_path_buf(),
        model: select_model(model_id, settings),
        api_key,
        resume: settings.resume,
        language: language.to_string(),
        network: NetworkConfig {
            proxy: non_blank(settings.proxy.as_deref()),
            api_base: non_blank(settings.api_base.as_deref()),
        },
        prompt: PromptConfig::from_overrides(
            settings.system_prompt.as_deref(),
            settings.user_prompt.as_deref(),
        ),
        output_mode: if settings.single_translate {
            OutputMode::Single
        } else {
            OutputMode::Bilingual
        },
        context: ContextOptions {
            enabled: settings.use_context,
            paragraph_limit: settings.context_paragraph_limit,
        },
        temperature: settings.temperature,
        parallel_workers: settings.parallel_workers.max(1),
        filters: ContentFilters {
            translate_tags: settings.translate_tags.clone(),
            exclude_translate_tags: settings.exclude_translate_tags.clone(),
            only_files: settings.only_filelist.clone(),
            exclude_files: settings.exclude_filelist.clone(),
            allow_navigable_strings: settings.allow_navigable_strings,
        },
        accumulated_num: Some(settings.accumulated_num).filter(|n| *n > 1),
        translation_style: non_blank(settings.translation_style.as_deref()),
        batch_size: settings.batch_size.filter(|n| *n > 0),
        block_size: u32::try_from(settings.block_size).ok().filter(|n| *n > 0),
        test_limit: settings.test.then_some(settings.test_num),
    })
}

fn config_error(message: String) -> WorkerError {
    WorkerError::Configuration(message)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolve_api_key(
    model_id: &str,
    model: &ModelInfo,
    settings: &TranslationSettings,
) -> Result<Option<String>, WorkerError> {
    let key = model
        .api_key_type
        .and_then(|key_type| settings.api_key(key_type))
        .map(str::to_string);
    if key.is_none() && model.requires_api_key {
        return Err(config_error(format!(
            "API key required for model: {model_id}"
        )));
    }
    Ok(key)
}

/// Derive the provider sub-selection for `model_id`.
///
/// Fixed-generation models ignore `custom_model_list`; `gemini` uses it in
/// place of its default flash models. Request intervals only apply to the
/// Gemini family.
fn select_model(model_id: &str, settings: &TranslationSettings) -> ModelSelection {
    let family = match model_id {
        "chatgptapi" => ModelFamily::OpenAi(OpenAiGeneration::Gpt35),
        "gpt4" => ModelFamily::OpenAi(OpenAiGeneration::Gpt4),
        "gpt4omini" => ModelFamily::OpenAi(OpenAiGeneration::Gpt4oMini),
        "gpt4o" => ModelFamily::OpenAi(OpenAiGeneration::Gpt4o),
        "o1preview" => ModelFamily::OpenAi(OpenAiGeneration::O1Preview),
        "o1" => ModelFamily::OpenAi(OpenAiGeneration::O1),
        "o1mini" => ModelFamily::OpenAi(OpenAiGeneration::O1Mini),
        "o3mini" => ModelFamily::OpenAi(OpenAiGeneration::O3Mini),
        "claude" => ModelFamily::Claude { snapshot: None },
        id if id.starts_with(CLAUDE_SNAPSHOT_PREFIX) => ModelFamily::Claude {
            snapshot: Some(id.to_string()),
        },
        "gemini" => ModelFamily::Gemini(GeminiTier::Flash),
        "geminipro" => ModelFamily::Gemini(GeminiTier::Pro),
        _ => ModelFamily::Other,
    };

    let custom_models = match family {
        ModelFamily::OpenAi(_) | ModelFamily::Gemini(GeminiTier::Pro) => Vec::new(),
        _ => settings.custom_models(),
    };
    let request_interval = match family {
        ModelFamily::Gemini(_) => settings.interval.filter(|s| *s > 0.0),
        _ => None,
    };

    ModelSelection {
        model: model_id.to_string(),
        family,
        custom_models,
        deployment_id: non_blank(settings.deployment_id.as_deref()),
        request_interval,
    }
}
