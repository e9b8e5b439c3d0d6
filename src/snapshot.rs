//! Declaration snapshot loading.
//!
//! A snapshot on disk is either a single `.json` file (one module or an
//! array of modules) or a directory tree of `.json` files. Loading is
//! deterministic: directory entries are walked in sorted path order, and
//! the snapshot ID is derived from the (path, content) pairs so identical
//! input always produces the identical ID.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use finch_core::error::FinchError;
use finch_core::hash::SnapshotId;
use finch_python::decl::Module;

/// A loaded declaration snapshot.
#[derive(Debug)]
pub struct Snapshot {
    /// Stable identity of the loaded input.
    pub id: SnapshotId,
    /// Modules in load order (sorted file paths, source order within).
    pub modules: Vec<Module>,
}

/// Load a snapshot from a `.json` file or a directory of `.json` files.
pub fn load(path: &Path) -> Result<Snapshot, FinchError> {
    let metadata = fs::metadata(path)
        .map_err(|_| FinchError::snapshot_not_found(path.display().to_string()))?;

    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    if metadata.is_dir() {
        let mut files: Vec<_> = WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(FinchError::invalid_args(format!(
                "no .json snapshot files under {}",
                path.display()
            )));
        }
        for file in files {
            let content = fs::read(&file)?;
            entries.push((file.display().to_string(), content));
        }
    } else {
        let content = fs::read(path)?;
        entries.push((path.display().to_string(), content));
    }

    let id = SnapshotId::derive(
        entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_slice())),
    );

    let mut modules = Vec::new();
    for (file, content) in &entries {
        let text = std::str::from_utf8(content)
            .map_err(|_| FinchError::snapshot_parse(file.clone(), "not valid UTF-8"))?;
        let decoded = Module::decode_many(text)
            .map_err(|e| FinchError::snapshot_parse(file.clone(), e.to_string()))?;
        debug!(file = %file, modules = decoded.len(), "loaded snapshot file");
        modules.extend(decoded);
    }

    Ok(Snapshot { id, modules })
}

// ============================================================================
// Tests
// ============================================================================
