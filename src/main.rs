mod cli;
mod config;
mod file_scanner;
mod matcher;
mod mode;
mod score_rules;
mod selection;
mod state;
mod tui;
mod utils;
mod workflow;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::process::ExitCode;
use tui::SessionOutcome;

// Logs go to a file; the terminal belongs to the picker and stdout to the result.
fn init_logging(level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }
    let Some(dir) = dirs::cache_dir().map(|d| d.join("choose-files")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(dir.join("choose-files.log")) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

fn main() -> ExitCode {
    let cli_args = cli::Cli::parse();
    init_logging(cli_args.log_level.into());

    match workflow::run_choose_files(cli_args) {
        Ok(SessionOutcome::Accepted(_)) => ExitCode::SUCCESS,
        Ok(SessionOutcome::Aborted | SessionOutcome::Signalled) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
