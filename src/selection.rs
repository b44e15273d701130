use std::path::{Path, PathBuf};

/// Chosen absolute paths, in the order they were chosen, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    paths: Vec<PathBuf>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the path was not already selected.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn toggle(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let before = self.paths.len();
        self.paths.retain(|p| *p != path);
        if self.paths.len() == before {
            self.paths.push(path);
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }

    pub fn last(&self) -> Option<&Path> {
        self.paths.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_true_once_per_path() {
        let mut sel = Selections::new();
        assert!(sel.add("/a"));
        assert!(!sel.add("/a"));
        assert!(sel.add("/b"));
        assert!(!sel.add(PathBuf::from("/b")));
        assert_eq!(sel.snapshot(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn toggle_twice_restores_contents() {
        let mut sel = Selections::new();
        sel.add("/a");
        sel.add("/b");
        let before = sel.clone();

        sel.toggle("/c");
        assert_eq!(sel.len(), 3);
        sel.toggle("/c");
        assert_eq!(sel, before);

        sel.toggle("/a");
        assert_eq!(sel.snapshot(), vec![PathBuf::from("/b")]);
        assert!(!sel.contains(Path::new("/a")));
    }

    #[test]
    fn toggle_appends_at_end() {
        let mut sel = Selections::new();
        sel.toggle("/a");
        sel.toggle("/b");
        sel.toggle("/a");
        sel.toggle("/a");
        assert_eq!(sel.snapshot(), vec![PathBuf::from("/b"), PathBuf::from("/a")]);
        assert_eq!(sel.last(), Some(Path::new("/a")));
    }
}
