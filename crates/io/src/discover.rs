// Input discovery: which files in a directory belong to the data owner

use std::path::{Path, PathBuf};

/// Office writes `~$name.xlsx` lock files next to open workbooks.
const LOCK_FILE_PREFIX: &str = "~$";

/// Files in `dir` matching `pattern` whose file name contains
/// `owner_marker`, sorted by path. An empty marker accepts every match.
pub fn discover(dir: &Path, pattern: &str, owner_marker: &str) -> Result<Vec<PathBuf>, String> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&base).join(pattern);
    let entries = glob::glob(&full.to_string_lossy())
        .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?;
        if !path.is_file() {
            continue;
        }
        let name = source_name(&path);
        if name.starts_with(LOCK_FILE_PREFIX) {
            log::debug!("skipping lock file {}", path.display());
            continue;
        }
        if !name.contains(owner_marker) {
            log::debug!("skipping {} (no '{}' in name)", path.display(), owner_marker);
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// File name used as the source identity of a workbook.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
