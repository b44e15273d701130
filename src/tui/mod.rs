// The interactive picker: terminal setup, the event loop and the session controller.
mod event_handler;
mod frontend;
mod handler;
mod line_editor;
mod ui_renderer;

pub use handler::SessionOutcome;

pub use self::session::{SessionOptions, run_session};

mod session {
    use super::event_handler::{self, LoopEvent};
    use super::frontend::CrosstermFrontend;
    use super::handler::{Handler, SessionOutcome};
    use crate::matcher::{NucleoEngine, Waker};
    use crate::state::State;
    use anyhow::{Context, Result};
    use regex::Regex;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::mpsc::{self, Receiver, Sender};

    pub struct SessionOptions {
        pub max_depth: usize,
        pub exclude_directories: Vec<Regex>,
        /// Chosen before the terminal is taken over.
        pub preselect: Option<PathBuf>,
    }

    pub fn run_session(state: State, options: SessionOptions) -> Result<SessionOutcome> {
        let (tx, rx) = mpsc::channel();
        let wake_tx = tx.clone();
        let waker: Waker = Arc::new(move || {
            let _ = wake_tx.send(LoopEvent::Wakeup);
        });
        let engine = NucleoEngine::new(options.max_depth, options.exclude_directories, waker);
        let frontend = CrosstermFrontend::new().context("failed to open the terminal")?;
        let mut handler = Handler::new(state, engine, frontend);

        if let Some(path) = options.preselect {
            handler.preselect(path);
        }
        if handler.is_finished() {
            return Ok(handler.into_outcome());
        }

        install_signal_handler(tx.clone());
        let result = run_loop(&mut handler, tx, &rx);
        // Restore even when the loop failed, then report the loop's error first.
        let restored = handler.frontend_mut().restore();
        result?;
        restored.context("failed to restore the terminal")?;
        Ok(handler.into_outcome())
    }

    fn run_loop(
        handler: &mut Handler<NucleoEngine, CrosstermFrontend>,
        tx: Sender<LoopEvent>,
        rx: &Receiver<LoopEvent>,
    ) -> Result<()> {
        handler.on_initialize()?;
        event_handler::spawn_input_thread(tx).context("failed to start the input thread")?;
        while !handler.is_finished() {
            let event = rx.recv().context("event channel closed")?;
            handler.handle_event(event)?;
        }
        Ok(())
    }

    fn install_signal_handler(tx: Sender<LoopEvent>) {
        let installed = ctrlc::set_handler(move || {
            let _ = tx.send(LoopEvent::Terminated);
        });
        if let Err(e) = installed {
            log::warn!("failed to install signal handler: {e}");
        }
    }
}
