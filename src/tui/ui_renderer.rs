use super::line_editor::LineEditor;
use crate::matcher::MatchResults;
use crate::state::State;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

const MIN_COLUMN_WIDTH: u16 = 30;
const SEARCH_BAR_HEIGHT: u16 = 3;
const PROMPT: &str = "> ";

/// Result-list layout at the last render; key navigation moves over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderGeometry {
    pub num_matches: usize,
    pub slots_per_column: usize,
    pub num_columns: usize,
}

impl Default for RenderGeometry {
    fn default() -> Self {
        RenderGeometry {
            num_matches: 0,
            slots_per_column: 1,
            num_columns: 1,
        }
    }
}

impl RenderGeometry {
    pub fn page_size(&self) -> usize {
        self.slots_per_column * self.num_columns
    }
}

struct BrowseLayout {
    search_bar: Rect,
    results: Rect,
    help: Rect,
}

impl BrowseLayout {
    fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SEARCH_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        BrowseLayout {
            search_bar: chunks[0],
            results: chunks[1],
            help: chunks[2],
        }
    }
}

pub(super) fn draw_browse_content(
    frame: &mut Frame,
    state: &State,
    results: &MatchResults,
) -> RenderGeometry {
    let layout = BrowseLayout::new(frame.area());
    draw_search_bar(frame, state, layout.search_bar);
    let geometry = draw_results(frame, state, results, layout.results);
    draw_help_line(frame, state, layout.help);
    geometry
}

/// Second render phase: leave the terminal cursor at the end of the search text.
pub(super) fn place_search_cursor(frame: &mut Frame, state: &State) {
    let area = BrowseLayout::new(frame.area()).search_bar;
    let typed = Line::from(vec![Span::raw(PROMPT), Span::raw(state.search_text())]).width();
    let x = (area.x + 1).saturating_add(u16::try_from(typed).unwrap_or(u16::MAX));
    let x = x.min(area.right().saturating_sub(2));
    frame.set_cursor_position((x, area.y + 1));
}

fn draw_search_bar(frame: &mut Frame, state: &State, area: Rect) {
    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(Color::Cyan)),
        Span::raw(state.search_text()),
    ]);
    let search = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.current_dir().display())),
    );
    frame.render_widget(search, area);
}

fn draw_results(
    frame: &mut Frame,
    state: &State,
    results: &MatchResults,
    area: Rect,
) -> RenderGeometry {
    let matches = &results.matches;
    let title = match (matches.len(), results.in_progress) {
        (n, true) => format!(" Scanning… {n} matches so far "),
        (0, false) => " No matches ".to_string(),
        (1, false) => " 1 match ".to_string(),
        (n, false) => format!(" {n} matches "),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let slots_per_column = usize::from(inner.height).max(1);
    let needed_columns = matches.len().div_ceil(slots_per_column).max(1);
    let num_columns = usize::from((inner.width / MIN_COLUMN_WIDTH).max(1)).min(needed_columns);
    let geometry = RenderGeometry {
        num_matches: matches.len(),
        slots_per_column,
        num_columns,
    };
    if matches.is_empty() || inner.height == 0 {
        return geometry;
    }

    let column_width = inner.width / u16::try_from(num_columns).unwrap_or(1);
    let page = geometry.page_size();
    let current = state.current_index();
    let page_start = (current.min(matches.len() - 1) / page) * page;
    let page_end = (page_start + page).min(matches.len());

    for (offset, m) in matches[page_start..page_end].iter().enumerate() {
        let idx = page_start + offset;
        let (col, row) = (offset / slots_per_column, offset % slots_per_column);
        let cell = Rect {
            x: inner.x + column_width * u16::try_from(col).unwrap_or(0),
            y: inner.y + u16::try_from(row).unwrap_or(0),
            width: column_width,
            height: 1,
        };

        let marker = if state.selections().contains(&m.abspath) {
            "● "
        } else {
            "  "
        };
        let mut style = if m.is_dir {
            Style::default().fg(Color::Blue)
        } else {
            Style::default()
        };
        if idx == current {
            style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
        }
        let suffix = if m.is_dir { "/" } else { "" };
        let line = Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(format!("{}{suffix}", m.display_text), style),
        ]);
        frame.render_widget(Paragraph::new(line), cell);
    }
    geometry
}

fn draw_help_line(frame: &mut Frame, state: &State, area: Rect) {
    let toggle = if state.mode().allows_multiple_selection() {
        "Shift+Enter: Toggle | "
    } else {
        ""
    };
    let save_as = if state.mode().can_select_nonexistent() {
        "Ctrl+S: New name | "
    } else {
        ""
    };
    let help = format!(
        "Enter: Choose | {toggle}{save_as}Tab: Open dir | Shift+Tab: Parent dir | Esc: Quit"
    );
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

pub(super) fn draw_save_file_name_content(frame: &mut Frame, state: &State, editor: &LineEditor) {
    let area = save_editor_area(frame.area());
    let prompt = Paragraph::new(vec![
        Line::from(format!("Name to save in {}:", state.save_file_dir().display())),
        Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(Color::Cyan)),
            Span::raw(editor.text()),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.window_title())),
    );
    frame.render_widget(prompt, area);

    let help_area = Rect {
        y: area.bottom().min(frame.area().bottom().saturating_sub(1)),
        height: 1,
        ..area
    };
    frame.render_widget(
        Paragraph::new("Enter: Save | Esc: Cancel").style(Style::default().fg(Color::DarkGray)),
        help_area,
    );
}

/// Second render phase for the save screen: cursor inside the name editor.
pub(super) fn place_editor_cursor(frame: &mut Frame, editor: &LineEditor) {
    let area = save_editor_area(frame.area());
    let before: String = editor.text().chars().take(editor.cursor()).collect();
    let typed = Line::from(vec![Span::raw(PROMPT), Span::raw(before)]).width();
    let x = (area.x + 1).saturating_add(u16::try_from(typed).unwrap_or(u16::MAX));
    frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 2));
}

fn save_editor_area(area: Rect) -> Rect {
    Rect {
        height: area.height.min(4),
        ..area
    }
}
