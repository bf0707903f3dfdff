//! Storage of uploaded documents.

use std::path::{Path, PathBuf};

use bbm_core::types::JobId;

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps the last component of either separator style, replaces anything
/// outside `[A-Za-z0-9._-]` with `_` and strips leading dots. May return an
/// empty string.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let replaced: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    replaced.trim_start_matches('.').to_string()
}

/// Write `data` to `{upload_dir}/{job_id}/{filename}` and return the path.
pub async fn store_upload(
    upload_dir: &Path,
    job_id: JobId,
    filename: &str,
    data: &[u8],
) -> std::io::Result<PathBuf> {
    let job_dir = upload_dir.join(job_id.to_string());
    tokio::fs::create_dir_all(&job_dir).await?;
    let dest = job_dir.join(filename);
    tokio::fs::write(&dest, data).await?;
    Ok(dest)
}
