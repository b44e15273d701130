use crate::config::ChooserConfig;
use crate::mode::Mode;
use crate::score_rules::ScoreRules;
use crate::state::State;
use crate::tui::{self, SessionOptions, SessionOutcome};
use crate::{cli, utils};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// The directory the session starts in: DIR with `~` expanded, or the working directory.
fn resolve_base_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => utils::expand_user(dir),
        None => env::current_dir().context("failed to read the current directory")?,
    };
    Ok(utils::absolutize(&dir))
}

// An existing suggested path of the kind the save mode asks for; anything else is ignored.
fn preselection(mode: Mode, suggested: Option<&Path>) -> Option<PathBuf> {
    let path = utils::absolutize(&utils::expand_user(suggested?));
    let right_kind = match mode {
        Mode::SaveFile => path.is_file(),
        Mode::SaveDir | Mode::SaveDirForFiles => path.is_dir(),
        Mode::SingleFile | Mode::MultipleFiles | Mode::SingleDir | Mode::MultipleDirs => {
            return None;
        }
    };
    right_kind.then_some(path)
}

fn write_outcome(out: &mut impl Write, outcome: &SessionOutcome) -> io::Result<()> {
    match outcome {
        SessionOutcome::Accepted(paths) => {
            let lines: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            write!(out, "{}", lines.join("\n"))?;
        }
        SessionOutcome::Aborted => {}
        SessionOutcome::Signalled => writeln!(out, "Killed by signal: SIGINT, SIGTERM or SIGHUP")?,
    }
    out.flush()
}

pub fn run_choose_files(cli_args: cli::Cli) -> Result<SessionOutcome> {
    let config = ChooserConfig::load(&cli_args.config, &cli_args.overrides)
        .context("failed to load configuration")?;
    let score_rules =
        ScoreRules::compile(&config.modify_score).context("invalid modify_score rule")?;
    let exclude_directories = config
        .exclude_patterns()
        .context("invalid exclude_directory pattern")?;

    let mode = Mode::from_config_str(&cli_args.mode);
    let base_dir = resolve_base_dir(cli_args.dir.as_deref())?;
    log::info!(
        "max_depth={} exclude_directory={:?} modify_score={:?}",
        config.max_depth,
        config.exclude_directory,
        config.modify_score
    );
    log::debug!("mode {mode:?} in {}", base_dir.display());

    let state = State::new(base_dir, mode, score_rules)
        .with_suggested_save_file_name(cli_args.suggested_save_file_name)
        .with_window_title(cli_args.title);
    let options = SessionOptions {
        max_depth: config.max_depth,
        exclude_directories,
        preselect: preselection(mode, cli_args.suggested_save_file_path.as_deref()),
    };

    let outcome = tui::run_session(state, options)?;
    log::info!("session outcome: {outcome:?}");
    write_outcome(&mut io::stdout().lock(), &outcome).context("failed to write the selection")?;
    Ok(outcome)
}
