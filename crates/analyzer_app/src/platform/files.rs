use std::fs;
use std::path::Path;

use analyzer_core::ResumeFile;
use analyzer_logging::analyzer_info;
use anyhow::{Context, Result};

/// Reads the whole resume into memory, as a browser file input would.
pub(crate) fn load_resume(path: &Path) -> Result<ResumeFile> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read resume {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    analyzer_info!("Loaded resume {} ({} bytes)", file_name, bytes.len());
    Ok(ResumeFile::new(file_name, bytes))
}
