//! Deterministic artifact naming shared by engines and the worker.
//!
//! An engine writes its result next to the input document as
//! `{stem}_translated.{ext}` (single-language) or `{stem}_bilingual.{ext}`.

use std::path::{Path, PathBuf};

use crate::invocation::OutputMode;

pub const SINGLE_SUFFIX: &str = "_translated";
pub const BILINGUAL_SUFFIX: &str = "_bilingual";

/// File name of the artifact produced for `book_path`.
pub fn output_file_name(book_path: &Path, mode: OutputMode) -> String {
    let stem = book_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = book_path
        .extension()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let suffix = match mode {
        OutputMode::Single => SINGLE_SUFFIX,
        OutputMode::Bilingual => BILINGUAL_SUFFIX,
    };
    format!("{stem}{suffix}.{ext}")
}

/// Full path of the artifact, in the input document's directory.
pub fn output_path(book_path: &Path, mode: OutputMode) -> PathBuf {
    let name = output_file_name(book_path, mode);
    match book_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_name() {
        assert_eq!(
            output_file_name(Path::new("/up/abc_novel.epub"), OutputMode::Bilingual),
            "abc_novel_bilingual.epub"
        );
    }

    #[test]
    fn single_name_keeps_inner_dots_in_stem() {
        assert_eq!(
            output_file_name(Path::new("/up/vol.1.txt"), OutputMode::Single),
            "vol.1_translated.txt"
        );
    }

    #[test]
    fn path_is_next_to_input() {
        assert_eq!(
            output_path(Path::new("/up/book.md"), OutputMode::Single),
            PathBuf::from("/up/book_translated.md")
        );
    }
}
