use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub only_dirs: bool,
    /// Directories whose absolute path matches are listed but not descended into.
    pub exclude: Arc<[Regex]>,
}

impl ScanOptions {
    fn is_excluded(&self, dir: &Path) -> bool {
        let dir = dir.to_string_lossy();
        self.exclude.iter().any(|pattern| pattern.is_match(&dir))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    /// Path relative to the scanned root.
    pub display_text: String,
    pub abspath: PathBuf,
    pub is_dir: bool,
}

/// Walk `root` depth-first, handing every entry to `emit`. Stops early once
/// `cancel` is set. Returns the number of entries emitted.
pub fn scan_dir(
    root: &Path,
    options: &ScanOptions,
    cancel: &AtomicBool,
    mut emit: impl FnMut(ScannedEntry),
) -> usize {
    let mut emitted = 0;
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(options.max_depth.max(1))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(result) = walker.next() {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("scan of {} cancelled after {emitted} entries", root.display());
            break;
        }
        let entry = match result {
            Ok(v) => v,
            Err(e) => {
                log::warn!("skipping unreadable entry during scan: {e}");
                continue;
            }
        };

        let path = entry.path();
        let is_dir =
            entry.file_type().is_dir() || (entry.path_is_symlink() && path.is_dir());
        if entry.file_type().is_dir() && options.is_excluded(path) {
            walker.skip_current_dir();
        }
        if options.only_dirs && !is_dir {
            continue;
        }

        let display_text = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        emit(ScannedEntry {
            display_text,
            abspath: path.to_path_buf(),
            is_dir,
        });
        emitted += 1;
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/nested/deeper")).unwrap();
        fs::create_dir_all(dir.path().join("skipme/inner")).unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();
        fs::write(dir.path().join("src/main.rs"), "").unwrap();
        fs::write(dir.path().join("src/nested/deeper/leaf.rs"), "").unwrap();
        fs::write(dir.path().join("skipme/inner/hidden.txt"), "").unwrap();
        dir
    }

    fn options(max_depth: usize, only_dirs: bool, exclude: &[&str]) -> ScanOptions {
        ScanOptions {
            max_depth,
            only_dirs,
            exclude: exclude.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    fn collect(root: &Path, options: &ScanOptions) -> Vec<ScannedEntry> {
        let mut out = Vec::new();
        scan_dir(root, options, &AtomicBool::new(false), |e| out.push(e));
        out
    }

    fn names(entries: &[ScannedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.display_text.as_str()).collect()
    }

    #[test]
    fn relative_display_and_absolute_paths() {
        let dir = tree();
        let entries = collect(dir.path(), &options(4, false, &[]));
        let readme = entries
            .iter()
            .find(|e| e.display_text == "readme.txt")
            .unwrap();
        assert_eq!(readme.abspath, dir.path().join("readme.txt"));
        assert!(!readme.is_dir);
        assert!(names(&entries).contains(&"src/nested/deeper/leaf.rs"));
    }

    #[test]
    fn depth_limited() {
        let dir = tree();
        let entries = collect(dir.path(), &options(2, false, &[]));
        let names = names(&entries);
        assert!(names.contains(&"src/nested"));
        assert!(!names.contains(&"src/nested/deeper"));
    }

    #[test]
    fn excluded_dirs_listed_but_not_entered() {
        let dir = tree();
        let entries = collect(dir.path(), &options(4, false, &["/skipme$"]));
        let names = names(&entries);
        assert!(names.contains(&"skipme"));
        assert!(!names.iter().any(|n| n.starts_with("skipme/")));
    }

    #[test]
    fn dirs_only() {
        let dir = tree();
        let entries = collect(dir.path(), &options(4, true, &[]));
        assert!(entries.iter().all(|e| e.is_dir));
        assert!(names(&entries).contains(&"src/nested/deeper"));
    }

    #[test]
    fn cancelled_scan_emits_nothing() {
        let dir = tree();
        let cancel = AtomicBool::new(true);
        let count = scan_dir(dir.path(), &options(4, false, &[]), &cancel, |_| {});
        assert_eq!(count, 0);
    }
}
