use crossterm::{
    cursor::SetCursorStyle,
    event::{
        DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{
    Frame,
    prelude::{CrosstermBackend, Terminal},
};
use std::io::{self, Stdout, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenSize {
    pub width: u16,
    pub height: u16,
}

/// Everything the session needs from the terminal.
pub trait Frontend {
    fn size(&mut self) -> io::Result<ScreenSize>;

    /// Take over the terminal: raw mode, alternate screen, no line wrapping,
    /// bar cursor, bracketed paste.
    fn prepare(&mut self) -> io::Result<()>;

    fn set_window_title(&mut self, title: &str) -> io::Result<()>;

    /// Draw one frame as a single atomic screen update.
    fn draw<F: FnOnce(&mut Frame)>(&mut self, render: F) -> io::Result<()>;

    fn beep(&mut self) -> io::Result<()>;

    /// Invalidate anything cached about the previous screen geometry.
    fn resized(&mut self) -> io::Result<()>;
}

pub struct CrosstermFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    prepared: bool,
    keyboard_enhanced: bool,
}

impl CrosstermFrontend {
    /// Does not touch the terminal until [`Frontend::prepare`].
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(CrosstermFrontend {
            terminal: Terminal::new(backend)?,
            prepared: false,
            keyboard_enhanced: false,
        })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.prepared {
            return Ok(());
        }
        self.prepared = false;
        disable_raw_mode()?;
        let backend = self.terminal.backend_mut();
        if self.keyboard_enhanced {
            execute!(backend, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            backend,
            DisableBracketedPaste,
            EnableLineWrap,
            SetCursorStyle::DefaultUserShape,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()
    }
}

impl Frontend for CrosstermFrontend {
    fn size(&mut self) -> io::Result<ScreenSize> {
        let size = self.terminal.size()?;
        Ok(ScreenSize {
            width: size.width,
            height: size.height,
        })
    }

    fn prepare(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.prepared = true;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()?;
        // Lets shift+enter be told apart from enter on terminals that support it.
        self.keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        let backend = self.terminal.backend_mut();
        if self.keyboard_enhanced {
            queue!(
                backend,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        execute!(
            backend,
            DisableLineWrap,
            SetCursorStyle::SteadyBar,
            EnableBracketedPaste
        )
    }

    fn set_window_title(&mut self, title: &str) -> io::Result<()> {
        queue!(self.terminal.backend_mut(), SetTitle(title))
    }

    fn draw<F: FnOnce(&mut Frame)>(&mut self, render: F) -> io::Result<()> {
        queue!(self.terminal.backend_mut(), BeginSynchronizedUpdate)?;
        let drawn = self.terminal.draw(render).map(|_| ());
        execute!(self.terminal.backend_mut(), EndSynchronizedUpdate)?;
        drawn
    }

    fn beep(&mut self) -> io::Result<()> {
        let backend = self.terminal.backend_mut();
        backend.write_all(b"\x07")?;
        backend.flush()
    }

    fn resized(&mut self) -> io::Result<()> {
        self.terminal.autoresize()
    }
}
