use crate::upload::RawFile;
use ignore::Walk;
use std::path::Path;

/// Loads every regular file below `folder`, honouring `.gitignore` and hidden-file rules.
///
/// Unreadable entries are skipped with a warning. The result is sorted by path.
pub fn collect_folder(folder: &Path) -> Vec<RawFile> {
    let mut paths: Vec<_> = Walk::new(folder)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                tracing::warn!("Skipping entry in {}: {}", folder.display(), e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| match RawFile::from_path(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
