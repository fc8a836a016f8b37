//! Alter script sources: single files, zip archives, and directories.
//!
//! Archives and directories contribute their alter files ordered by name,
//! so `001_x.yml` always runs before `002_y.yml`.

use crate::alter::Alter;
use crate::error::{CoreError, CoreResult};
use std::io::Read;
use std::path::Path;

const ALTER_SUFFIXES: &[&str] = &[".yml", ".yaml"];
const ARCHIVE_SUFFIX: &str = ".zip";

/// Whether a file or entry name looks like a serialized alter.
pub fn is_alter_file(name: &str) -> bool {
    ALTER_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Load alters from each source in order, expanding archives and directories.
pub fn load_alters<P: AsRef<Path>>(sources: &[P]) -> CoreResult<Vec<Alter>> {
    let mut alters = Vec::with_capacity(sources.len());
    for source in sources {
        let path = source.as_ref();
        let name = path.to_string_lossy();
        if path.is_dir() {
            alters.extend(load_directory(path)?);
        } else if is_alter_file(&name) {
            alters.push(load_file(path)?);
        } else if name.ends_with(ARCHIVE_SUFFIX) {
            alters.extend(load_archive(path)?);
        } else {
            return Err(CoreError::UnknownFileType {
                path: name.into_owned(),
            });
        }
    }
    Ok(alters)
}

/// Load a single alter file.
pub fn load_file(path: &Path) -> CoreResult<Alter> {
    if !path.exists() {
        return Err(CoreError::AlterNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Alter::from_yaml(&path.to_string_lossy(), &content)
}

/// Load every alter entry of a zip archive, ordered by entry name.
///
/// Directory entries and entries without an alter suffix are skipped.
pub fn load_archive(path: &Path) -> CoreResult<Vec<Alter>> {
    let archive_error = |message: String| CoreError::ArchiveError {
        path: path.display().to_string(),
        message,
    };

    let file = std::fs::File::open(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;

    let mut entries: Vec<(String, usize)> = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| archive_error(e.to_string()))?;
        if entry.is_dir() || !is_alter_file(entry.name()) {
            continue;
        }
        entries.push((entry.name().to_string(), index));
    }
    entries.sort();

    let mut alters = Vec::with_capacity(entries.len());
    for (name, index) in entries {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| archive_error(e.to_string()))?;
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| archive_error(format!("{}: {}", name, e)))?;
        log::debug!("Loaded archive entry {}", name);
        alters.push(Alter::from_yaml(&name, &content)?);
    }
    Ok(alters)
}

/// Load every alter file directly inside `dir`, ordered by file name.
pub fn load_directory(dir: &Path) -> CoreResult<Vec<Alter>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_alter_file(&entry.file_name().to_string_lossy()) {
            files.push(path);
        } else {
            log::debug!("Skipping {}", path.display());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    files.iter().map(|p| load_file(p)).collect()
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
