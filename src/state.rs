use crate::mode::Mode;
use crate::score_rules::ScoreRules;
use crate::selection::Selections;
use crate::utils;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Browsing,
    /// One-shot sub-screen for naming the file or directory to save.
    SaveFileName,
}

/// Mutable state of a single picking session.
///
/// Fields are private: every mutation goes through a setter so that the
/// search text, cursor and current directory stay consistent.
#[derive(Debug, Clone)]
pub struct State {
    base_dir: PathBuf,
    current_dir: Option<PathBuf>,
    search_text: String,
    current_idx: usize,
    selections: Selections,
    mode: Mode,
    screen: Screen,
    score_rules: ScoreRules,
    suggested_save_file_name: Option<String>,
    window_title: Option<String>,
    save_file_dir: Option<PathBuf>,
}

impl State {
    pub fn new(base_dir: PathBuf, mode: Mode, score_rules: ScoreRules) -> Self {
        State {
            base_dir: utils::absolutize(&base_dir),
            current_dir: None,
            search_text: String::new(),
            current_idx: 0,
            selections: Selections::new(),
            mode,
            screen: Screen::Browsing,
            score_rules,
            suggested_save_file_name: None,
            window_title: None,
            save_file_dir: None,
        }
    }

    pub fn with_suggested_save_file_name(mut self, name: Option<String>) -> Self {
        self.suggested_save_file_name = name.filter(|n| !n.is_empty());
        self
    }

    pub fn with_window_title(mut self, title: Option<String>) -> Self {
        self.window_title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn current_dir(&self) -> &Path {
        self.current_dir.as_deref().unwrap_or(&self.base_dir)
    }

    pub fn set_current_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = utils::absolutize(dir.as_ref());
        if self.current_dir() != dir.as_path() {
            log::debug!("changing directory to {}", dir.display());
            self.search_text.clear();
            self.current_idx = 0;
            self.current_dir = Some(dir);
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.search_text != text {
            self.search_text = text;
            self.current_idx = 0;
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_idx
    }

    /// Negative indices clamp to the first item.
    pub fn set_current_index(&mut self, idx: isize) {
        self.current_idx = idx.max(0).unsigned_abs();
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn add_selection(&mut self, path: impl Into<PathBuf>) -> bool {
        self.selections.add(path)
    }

    pub fn toggle_selection(&mut self, path: impl Into<PathBuf>) {
        self.selections.toggle(path)
    }

    /// Hand the current selections to the save-name screen, leaving a fresh
    /// set that will receive the named path.
    pub fn take_selections(&mut self) -> Selections {
        std::mem::take(&mut self.selections)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Switch to the save-name screen. There is no way back to browsing.
    pub fn enter_save_file_name(&mut self, dir: PathBuf) {
        self.save_file_dir = Some(dir);
        self.screen = Screen::SaveFileName;
    }

    pub fn save_file_dir(&self) -> &Path {
        self.save_file_dir
            .as_deref()
            .unwrap_or_else(|| self.current_dir())
    }

    pub fn score_rules(&self) -> &ScoreRules {
        &self.score_rules
    }

    pub fn suggested_save_file_name(&self) -> Option<&str> {
        self.suggested_save_file_name.as_deref()
    }

    pub fn window_title(&self) -> &str {
        self.window_title
            .as_deref()
            .unwrap_or_else(|| self.mode.window_title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        State::new(PathBuf::from("/base"), Mode::SingleFile, ScoreRules::default())
    }

    #[test]
    fn current_dir_defaults_to_base() {
        let s = state();
        assert_eq!(s.current_dir(), Path::new("/base"));
        assert_eq!(s.base_dir(), Path::new("/base"));
    }

    #[test]
    fn search_text_change_resets_cursor() {
        let mut s = state();
        s.set_current_index(7);
        s.set_search_text("abc");
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.search_text(), "abc");

        s.set_current_index(3);
        s.set_search_text("abc");
        assert_eq!(s.current_index(), 3, "unchanged text must not reset");
        s.set_search_text(String::from("abc"));
        assert_eq!(s.current_index(), 3);
    }

    #[test]
    fn dir_change_clears_search_and_cursor() {
        let mut s = state();
        s.set_search_text("query");
        s.set_current_index(4);
        s.set_current_dir("/base");
        assert_eq!(s.search_text(), "query", "same dir is a no-op");
        assert_eq!(s.current_index(), 4);

        s.set_current_dir("/elsewhere");
        assert_eq!(s.current_dir(), Path::new("/elsewhere"));
        assert_eq!(s.search_text(), "");
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn relative_dir_is_made_absolute() {
        let mut s = state();
        s.set_current_dir("some/relative");
        assert!(s.current_dir().is_absolute());
        assert!(s.current_dir().ends_with("some/relative"));
    }

    #[test]
    fn parent_components_are_folded() {
        let s = State::new(PathBuf::from("/base/sub/.."), Mode::SingleFile, ScoreRules::default());
        assert_eq!(s.base_dir(), Path::new("/base"));

        let mut s = state();
        s.set_search_text("query");
        s.set_current_dir("/base/sub/../.");
        assert_eq!(s.current_dir(), Path::new("/base"));
        assert_eq!(s.search_text(), "query", "same dir is a no-op");

        s.set_current_dir("/a/b/..");
        assert_eq!(s.current_dir(), Path::new("/a"));
    }

    #[test]
    fn index_clamps_at_zero() {
        let mut s = state();
        s.set_current_index(-5);
        assert_eq!(s.current_index(), 0);
        s.set_current_index(12);
        assert_eq!(s.current_index(), 12);
    }

    #[test]
    fn window_title_override() {
        let s = state();
        assert_eq!(s.window_title(), Mode::SingleFile.window_title());
        let s = state().with_window_title(Some("Pick one".into()));
        assert_eq!(s.window_title(), "Pick one");
        let s = state().with_window_title(Some(String::new()));
        assert_eq!(s.window_title(), Mode::SingleFile.window_title());
    }

    #[test]
    fn save_screen_is_one_way() {
        let mut s = state();
        assert_eq!(s.screen(), Screen::Browsing);
        assert_eq!(s.save_file_dir(), Path::new("/base"));
        s.add_selection("/base/a");
        let taken = s.take_selections();
        assert_eq!(taken.len(), 1);
        assert!(s.selections().is_empty());
        s.enter_save_file_name(PathBuf::from("/tmp"));
        assert_eq!(s.screen(), Screen::SaveFileName);
        assert_eq!(s.save_file_dir(), Path::new("/tmp"));
    }
}
