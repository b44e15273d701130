//! Session controller.
//!
//! [`Handler`] is the only place that mutates the session [`State`], queries
//! the match engine and asks the front end to draw. Every loop event is
//! handled to completion, and every handler ends with a redraw unless the
//! event ended the session.

use super::event_handler::LoopEvent;
use super::frontend::{Frontend, ScreenSize};
use super::line_editor::{EditOutcome, LineEditor};
use super::ui_renderer::{self, RenderGeometry};
use crate::matcher::{MatchEngine, MatchQuery, MatchResults};
use crate::state::{Screen, State};
use crate::utils;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::{Path, PathBuf};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Absolute paths, in the order they were chosen.
    Accepted(Vec<PathBuf>),
    Aborted,
    /// SIGINT, SIGTERM or SIGHUP.
    Signalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Status(i32),
    Signal,
}

pub struct Handler<E: MatchEngine, F: Frontend> {
    state: State,
    screen_size: ScreenSize,
    geometry: RenderGeometry,
    engine: E,
    frontend: F,
    editor: LineEditor,
    exit: Option<Exit>,
}

impl<E: MatchEngine, F: Frontend> Handler<E, F> {
    pub fn new(state: State, engine: E, frontend: F) -> Self {
        Handler {
            state,
            screen_size: ScreenSize::default(),
            geometry: RenderGeometry::default(),
            engine,
            frontend,
            editor: LineEditor::new(),
            exit: None,
        }
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    pub fn into_outcome(self) -> SessionOutcome {
        match self.exit {
            Some(Exit::Status(0)) => SessionOutcome::Accepted(self.state.selections().snapshot()),
            Some(Exit::Signal) => SessionOutcome::Signalled,
            Some(Exit::Status(_)) | None => SessionOutcome::Aborted,
        }
    }

    /// Seed the selection before the terminal is taken over. Runs the same
    /// completion step as an interactive confirmation, so a non-save mode
    /// finishes right away.
    pub fn preselect(&mut self, path: PathBuf) {
        log::debug!("preselecting {}", path.display());
        if self.state.add_selection(path) {
            self.complete_selection();
        }
    }

    pub fn handle_event(&mut self, event: LoopEvent) -> Result<()> {
        match event {
            LoopEvent::Key(key) => self.on_key_event(&key),
            LoopEvent::Text(text) => self.on_text(&text),
            LoopEvent::Resize => self.on_resize(),
            LoopEvent::Wakeup => self.on_wakeup(),
            LoopEvent::InputClosed => {
                self.quit(1);
                Ok(())
            }
            LoopEvent::Terminated => {
                log::info!("session terminated by signal");
                self.exit = Some(Exit::Signal);
                Ok(())
            }
        }
    }

    pub fn on_initialize(&mut self) -> Result<()> {
        self.frontend.prepare()?;
        self.screen_size = self.frontend.size()?;
        log::debug!(
            "browsing from {} at screen size {}x{}",
            self.state.base_dir().display(),
            self.screen_size.width,
            self.screen_size.height
        );
        self.draw_screen()
    }

    pub fn on_resize(&mut self) -> Result<()> {
        self.screen_size = self.frontend.size()?;
        log::debug!(
            "screen resized to {}x{}",
            self.screen_size.width,
            self.screen_size.height
        );
        self.frontend.resized()?;
        self.draw_screen()
    }

    /// New results from the match engine. State is left alone.
    pub fn on_wakeup(&mut self) -> Result<()> {
        self.draw_screen()
    }

    pub fn on_key_event(&mut self, key: &KeyEvent) -> Result<()> {
        if is_abort_key(key) {
            self.quit(1);
            return Ok(());
        }
        match self.state.screen() {
            Screen::Browsing => self.browsing_handle_key(key),
            Screen::SaveFileName => self.save_file_name_handle_key(key),
        }
    }

    pub fn on_text(&mut self, text: &str) -> Result<()> {
        match self.state.screen() {
            Screen::Browsing => {
                let typed: String = text.chars().filter(|c| !c.is_control()).collect();
                if !typed.is_empty() {
                    let search = format!("{}{typed}", self.state.search_text());
                    self.state.set_search_text(search);
                }
            }
            Screen::SaveFileName => self.editor.insert_str(text),
        }
        self.draw_screen()
    }

    fn browsing_handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        if self.handle_edit_keys(key) || self.handle_result_list_keys(key) {
            return self.draw_screen();
        }
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        let save_mode = self.state.mode().can_select_nonexistent();
        match key.code {
            KeyCode::Char('s') if save_mode && key.modifiers == KeyModifiers::CONTROL => {
                self.finish_selection()
            }
            KeyCode::BackTab => self.change_to_parent_dir(),
            KeyCode::Tab if shifted => self.change_to_parent_dir(),
            KeyCode::Tab => self.change_to_current_dir_if_possible(),
            KeyCode::Enter if shifted => self.toggle_current(),
            KeyCode::Enter => self.confirm_current(),
            _ => self.draw_screen(),
        }
    }

    /// Backspace, word and line deletion on the search text.
    fn handle_edit_keys(&mut self, key: &KeyEvent) -> bool {
        let is_search_edit = matches!(
            (key.code, key.modifiers),
            (KeyCode::Backspace, _) | (KeyCode::Char('w' | 'u'), KeyModifiers::CONTROL)
        );
        if !is_search_edit {
            return false;
        }
        let mut editor = LineEditor::new();
        editor.set_text(self.state.search_text());
        if editor.handle_key(key) == EditOutcome::Changed {
            self.state.set_search_text(editor.text());
        }
        true
    }

    /// Cursor movement over the grid laid out by the last render.
    fn handle_result_list_keys(&mut self, key: &KeyEvent) -> bool {
        let to_isize = |n: usize| isize::try_from(n).unwrap_or(isize::MAX);
        let idx = to_isize(self.state.current_index());
        let last = to_isize(self.geometry.num_matches) - 1;
        let column = to_isize(self.geometry.slots_per_column);
        let page = to_isize(self.geometry.page_size());
        let target = match key.code {
            KeyCode::Up => idx - 1,
            KeyCode::Down => idx + 1,
            KeyCode::Left => idx - column,
            KeyCode::Right => idx + column,
            KeyCode::PageUp => idx - page,
            KeyCode::PageDown => idx + page,
            KeyCode::Home => 0,
            KeyCode::End => last,
            _ => return false,
        };
        self.state.set_current_index(target.min(last));
        true
    }

    fn get_results(&mut self) -> MatchResults {
        let query = MatchQuery {
            search_text: self.state.search_text(),
            current_dir: self.state.current_dir(),
            only_dirs: self.state.mode().only_dirs(),
            score_rules: self.state.score_rules(),
        };
        self.engine.results(&query)
    }

    /// The item under the cursor, once the result list has settled.
    fn current_abspath(&mut self) -> Option<PathBuf> {
        let results = self.get_results();
        if results.in_progress {
            return None;
        }
        results
            .matches
            .get(self.state.current_index())
            .map(|m| m.abspath.clone())
    }

    fn change_to_parent_dir(&mut self) -> Result<()> {
        match self.state.current_dir().parent().map(Path::to_path_buf) {
            Some(parent) => {
                self.state.set_current_dir(parent);
                self.draw_screen()
            }
            None => self.beep(),
        }
    }

    fn change_to_current_dir_if_possible(&mut self) -> Result<()> {
        let Some(path) = self.current_abspath() else {
            return self.beep();
        };
        match fs::metadata(&path) {
            Ok(meta) => {
                let dir = if meta.is_dir() {
                    path
                } else {
                    path.parent().map_or_else(|| path.clone(), Path::to_path_buf)
                };
                self.state.set_current_dir(dir);
                self.draw_screen()
            }
            Err(e) => {
                log::debug!("cannot open {}: {e}", path.display());
                self.beep()
            }
        }
    }

    fn toggle_current(&mut self) -> Result<()> {
        let Some(path) = self.current_abspath() else {
            return self.beep();
        };
        self.state.toggle_selection(path);
        log::debug!("{} item(s) selected", self.state.selections().len());
        if !self.state.mode().allows_multiple_selection() && !self.state.selections().is_empty() {
            return self.finish_selection();
        }
        self.draw_screen()
    }

    fn confirm_current(&mut self) -> Result<()> {
        let mode = self.state.mode();
        let Some(path) = self.current_abspath() else {
            return self.beep();
        };
        if mode.select_files() {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => return self.change_to_current_dir_if_possible(),
                Ok(_) => {}
                Err(e) => {
                    log::debug!("cannot select {}: {e}", path.display());
                    return self.beep();
                }
            }
        }
        if self.state.add_selection(path) {
            return self.finish_selection();
        }
        self.beep()
    }

    fn complete_selection(&mut self) {
        if self.state.mode().can_select_nonexistent() {
            self.initialize_save_file_name();
        } else {
            self.quit(0);
        }
    }

    fn finish_selection(&mut self) -> Result<()> {
        self.complete_selection();
        if self.is_finished() {
            return Ok(());
        }
        self.draw_screen()
    }

    fn initialize_save_file_name(&mut self) {
        let chosen = self.state.take_selections();
        let (dir, name) = match chosen.last() {
            Some(path) => (
                path.parent().unwrap_or(self.state.current_dir()).to_path_buf(),
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
            None => {
                let name = match self.state.search_text() {
                    "" => self.state.suggested_save_file_name().unwrap_or_default(),
                    text => text,
                };
                (self.state.current_dir().to_path_buf(), name.to_string())
            }
        };
        log::debug!("asking for a name to save in {}", dir.display());
        self.editor.set_text(&name);
        self.state.enter_save_file_name(dir);
    }

    fn save_file_name_handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        match self.editor.handle_key(key) {
            EditOutcome::Accept => self.accept_save_file_name(),
            EditOutcome::Changed | EditOutcome::Ignored => self.draw_screen(),
        }
    }

    fn accept_save_file_name(&mut self) -> Result<()> {
        let name = self.editor.text();
        if name.trim().is_empty() {
            return self.beep();
        }
        let name = utils::expand_user(Path::new(name));
        let path = utils::absolutize(&self.state.save_file_dir().join(name));
        self.state.add_selection(path);
        self.quit(0);
        Ok(())
    }

    /// Content first, cursor second.
    fn draw_screen(&mut self) -> Result<()> {
        match self.state.screen() {
            Screen::Browsing => {
                let results = self.get_results();
                self.frontend.set_window_title(self.state.window_title())?;
                let state = &self.state;
                let mut geometry = self.geometry;
                self.frontend.draw(|frame| {
                    geometry = ui_renderer::draw_browse_content(frame, state, &results);
                    ui_renderer::place_search_cursor(frame, state);
                })?;
                self.geometry = geometry;
            }
            Screen::SaveFileName => {
                let (state, editor) = (&self.state, &self.editor);
                self.frontend.draw(|frame| {
                    ui_renderer::draw_save_file_name_content(frame, state, editor);
                    ui_renderer::place_editor_cursor(frame, editor);
                })?;
            }
        }
        Ok(())
    }

    fn beep(&mut self) -> Result<()> {
        Ok(self.frontend.beep()?)
    }

    fn quit(&mut self, status: i32) {
        log::info!("session ended with status {status}");
        self.exit = Some(Exit::Status(status));
    }
}

fn is_abort_key(key: &KeyEvent) -> bool {
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL)
    )
}
