use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// choose-files – pick files and directories with fuzzy search
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to start in (defaults to CWD)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// What to choose: file, files, save-file, dir, dirs, save-dir or dir-for-files.
    /// Unknown values fall back to choosing a single file.
    #[arg(long, value_name = "MODE", default_value = "file")]
    pub mode: String,

    /// Name to pre-fill when asking where to save a file
    #[arg(long, value_name = "NAME")]
    pub suggested_save_file_name: Option<String>,

    /// Existing path to pre-select in the save modes
    #[arg(long, value_name = "PATH")]
    pub suggested_save_file_path: Option<PathBuf>,

    /// Window title (defaults to one describing the mode)
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Configuration file to load instead of the default one.
    /// Can be repeated; the special value NONE disables loading config files.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Override a configuration option, e.g. -o max_depth=2.
    /// Can be repeated; list options such as exclude_directory are appended to.
    #[arg(short = 'o', long = "override", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Verbosity of the log file
    #[arg(long, value_enum, value_name = "LEVEL", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
