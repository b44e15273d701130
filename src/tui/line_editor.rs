//! Single-line text editing for the save-name screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Accept,
    Changed,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    text: String,
    /// Character index, not byte index.
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = single_line(text);
        self.cursor = self.text.chars().count();
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert_str(&mut self, text: &str) {
        let text = single_line(text);
        let at = self.byte_index();
        self.text.insert_str(at, &text);
        self.cursor += text.chars().count();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        let at = self.byte_index();
        if at >= self.text.len() {
            return false;
        }
        self.text.remove(at);
        true
    }

    pub fn delete_word_before_cursor(&mut self) -> bool {
        let end = self.byte_index();
        let before = &self.text[..end];
        let trimmed = before.trim_end_matches(is_word_separator);
        let start = trimmed
            .rfind(is_word_separator)
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        if start == end {
            return false;
        }
        let removed = self.text[start..end].chars().count();
        self.text.replace_range(start..end, "");
        self.cursor -= removed;
        true
    }

    pub fn delete_to_start(&mut self) -> bool {
        let end = self.byte_index();
        if end == 0 {
            return false;
        }
        self.text.replace_range(..end, "");
        self.cursor = 0;
        true
    }

    fn move_to(&mut self, cursor: usize) -> bool {
        let cursor = cursor.min(self.text.chars().count());
        let moved = cursor != self.cursor;
        self.cursor = cursor;
        moved
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditOutcome {
        let changed = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => return EditOutcome::Accept,
            (KeyCode::Backspace, KeyModifiers::ALT | KeyModifiers::CONTROL)
            | (KeyCode::Char('w'), KeyModifiers::CONTROL) => self.delete_word_before_cursor(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.delete_to_start(),
            (KeyCode::Left, _) => self.move_to(self.cursor.saturating_sub(1)),
            (KeyCode::Right, _) => self.move_to(self.cursor + 1),
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.move_to(0),
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.move_to(usize::MAX)
            }
            _ => return EditOutcome::Ignored,
        };
        if changed {
            EditOutcome::Changed
        } else {
            EditOutcome::Ignored
        }
    }
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || c == '/'
}

fn single_line(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn insert_in_the_middle() {
        let mut ed = LineEditor::new();
        ed.set_text("outtxt");
        ed.handle_key(&press(KeyCode::Left, KeyModifiers::NONE));
        ed.handle_key(&press(KeyCode::Left, KeyModifiers::NONE));
        ed.handle_key(&press(KeyCode::Left, KeyModifiers::NONE));
        ed.insert_str(".");
        assert_eq!(ed.text(), "out.txt");
        assert_eq!(ed.cursor(), 4);
    }

    #[test]
    fn multibyte_editing() {
        let mut ed = LineEditor::new();
        ed.insert_str("héllo");
        assert!(ed.backspace());
        assert_eq!(ed.text(), "héll");
        ed.handle_key(&press(KeyCode::Home, KeyModifiers::NONE));
        ed.handle_key(&press(KeyCode::Right, KeyModifiers::NONE));
        assert!(ed.delete());
        assert_eq!(ed.text(), "hll");
    }

    #[test]
    fn pasted_newlines_are_dropped() {
        let mut ed = LineEditor::new();
        ed.insert_str("a\nb\r\n");
        assert_eq!(ed.text(), "ab");
    }

    #[test]
    fn word_and_line_deletion() {
        let mut ed = LineEditor::new();
        ed.set_text("some dir/file name");
        assert_eq!(
            ed.handle_key(&press(KeyCode::Char('w'), KeyModifiers::CONTROL)),
            EditOutcome::Changed
        );
        assert_eq!(ed.text(), "some dir/file ");
        ed.delete_word_before_cursor();
        assert_eq!(ed.text(), "some dir/");
        ed.delete_word_before_cursor();
        assert_eq!(ed.text(), "some ");
        ed.handle_key(&press(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(ed.text(), "");
        assert_eq!(
            ed.handle_key(&press(KeyCode::Backspace, KeyModifiers::NONE)),
            EditOutcome::Ignored
        );
    }

    #[test]
    fn enter_accepts() {
        let mut ed = LineEditor::new();
        assert_eq!(
            ed.handle_key(&press(KeyCode::Enter, KeyModifiers::NONE)),
            EditOutcome::Accept
        );
        assert_eq!(
            ed.handle_key(&press(KeyCode::F(5), KeyModifiers::NONE)),
            EditOutcome::Ignored
        );
    }
}
