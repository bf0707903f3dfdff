//! Identity engine for local development and dry runs.
//!
//! Treats every non-blank text line as a translation unit and "translates"
//! it to itself. It exercises the full engine contract (unit counting,
//! per-unit observation, output naming, single/bilingual layout, dry-run
//! limit) without calling any provider.

use std::path::Path;

use crate::error::EngineError;
use crate::invocation::{EngineInvocation, OutputMode};
use crate::naming::output_path;
use crate::observer::UnitObserver;
use crate::TranslationEngine;

/// Formats [`PassthroughEngine`] can read as plain text.
pub const TEXT_FORMATS: &[&str] = &["txt", "md", "srt"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEngine;

impl PassthroughEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TranslationEngine for PassthroughEngine {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn make_bilingual_book(
        &self,
        invocation: &EngineInvocation,
        observer: Option<&dyn UnitObserver>,
    ) -> Result<(), EngineError> {
        let path = invocation.book_path.as_path();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !TEXT_FORMATS.contains(&ext.as_str()) {
            return Err(EngineError::UnsupportedFormat(ext));
        }

        let source = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let is_subtitle = ext == "srt";

        let unit_count = source
            .lines()
            .filter(|line| is_unit(line, is_subtitle))
            .count() as u64;
        let limit = invocation
            .test_limit
            .map_or(unit_count, |n| unit_count.min(u64::from(n)));

        if let Some(obs) = observer {
            obs.on_total(limit);
        }
        tracing::debug!(path = %path.display(), units = limit, "Passthrough engine started");

        let mut translated = 0u64;
        let mut out = Vec::new();
        for line in source.lines() {
            if !is_unit(line, is_subtitle) || translated >= limit {
                out.push(line.to_string());
                continue;
            }
            let rendered = translate_unit(line);
            match invocation.output_mode {
                OutputMode::Bilingual => {
                    out.push(line.to_string());
                    out.push(rendered);
                }
                OutputMode::Single => out.push(rendered),
            }
            translated += 1;
            if let Some(obs) = observer {
                obs.on_unit_processed(line);
            }
        }

        let mut body = out.join("\n");
        if source.ends_with('\n') {
            body.push('\n');
        }
        write_artifact(&output_path(path, invocation.output_mode), &body)
    }
}

/// Subtitle cue numbers and timing lines are structure, not text.
fn is_unit(line: &str, is_subtitle: bool) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if is_subtitle && (trimmed.contains("-->") || trimmed.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }
    true
}

fn translate_unit(line: &str) -> String {
    line.to_string()
}

fn write_artifact(path: &Path, body: &str) -> Result<(), EngineError> {
    std::fs::write(path, body).map_err(|e| EngineError::io(path, e))
}
