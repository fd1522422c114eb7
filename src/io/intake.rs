use std::fs;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::{info, instrument, warn};

use crate::error::{Result, ToolError};

/// File-name pattern of the spreadsheets accepted into the intake.
pub const SPREADSHEET_GLOB: &str = "*.xls*";

/// Lists the spreadsheets directly inside `dir`, sorted by path.
///
/// A missing or unreadable directory is reported as empty: there is simply
/// nothing to consolidate.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub fn scan_intake(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!("intake directory is missing or not a directory");
        return Vec::new();
    }

    let pattern = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        SPREADSHEET_GLOB
    );
    let entries = match glob(&pattern) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(%pattern, %error, "invalid intake pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(%error, "unreadable intake entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

/// Describes why `dir` cannot be listed, or `None` when it can.
///
/// [`scan_intake`] treats such a directory as empty; callers use this to
/// tell that case apart from an intake that simply holds no workbooks.
pub fn intake_problem(dir: &Path) -> Option<String> {
    fs::read_dir(dir)
        .err()
        .map(|error| format!("{}: {error}", dir.display()))
}

/// True when the file name carries a spreadsheet extension.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            Pattern::new(SPREADSHEET_GLOB)
                .map(|pattern| pattern.matches(name))
                .unwrap_or(false)
        })
}

/// Copies uploaded workbooks into the intake directory, creating it when
/// needed. Returns the staged paths.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), count = files.len()))]
pub fn stage_workbooks(dir: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    for file in files {
        if !file.is_file() {
            return Err(ToolError::MissingInput(file.clone()));
        }
        if !is_spreadsheet(file) {
            return Err(ToolError::UnsupportedFile(file.clone()));
        }
    }

    fs::create_dir_all(dir)?;
    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let Some(name) = file.file_name() else {
            return Err(ToolError::UnsupportedFile(file.clone()));
        };
        let target = dir.join(name);
        fs::copy(file, &target)?;
        staged.push(target);
    }
    info!(staged = staged.len(), "workbooks staged");
    Ok(staged)
}

/// Deletes every spreadsheet in the intake directory and returns how many
/// were removed.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn clear_intake(dir: &Path) -> Result<usize> {
    let files = scan_intake(dir);
    for file in &files {
        fs::remove_file(file)?;
    }
    info!(removed = files.len(), "intake cleared");
    Ok(files.len())
}
