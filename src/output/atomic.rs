//! Atomic CSV file writes.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::error::{EngineError, EngineResult};

/// Writes a CSV file through a sibling temp file that is renamed into place.
///
/// Readers of `path` see either the previous complete file or the new
/// complete file. The closure writes every record, header included; nothing
/// is written implicitly. On failure the temp file is removed and `path` is
/// left untouched.
///
/// # Errors
///
/// Returns `OutputWrite` if the directory, temp file, any record or the
/// final rename fails.
pub fn write_csv_atomically<F>(path: &Path, write: F) -> EngineResult<()>
where
    F: FnOnce(&mut Writer<File>) -> csv::Result<()>,
{
    let output_error = |message: String| EngineError::OutputWrite {
        path: path.display().to_string(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| output_error(e.to_string()))?;
    }

    let tmp = temp_path(path);
    let result = write_to(&tmp, write).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| format!("rename failed: {}", e))
    });

    result.map_err(|message| {
        let _ = fs::remove_file(&tmp);
        output_error(message)
    })
}

fn write_to<F>(tmp: &Path, write: F) -> Result<(), String>
where
    F: FnOnce(&mut Writer<File>) -> csv::Result<()>,
{
    let file = File::create(tmp).map_err(|e| e.to_string())?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    write(&mut writer).map_err(|e| e.to_string())?;
    let file = writer.into_inner().map_err(|e| e.to_string())?;
    file.sync_all().map_err(|e| e.to_string())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
