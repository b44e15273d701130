/// What kind of thing the user is picking. Fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    SingleFile,
    MultipleFiles,
    SaveFile,
    SaveDir,
    SingleDir,
    MultipleDirs,
    /// An existing directory to save one or more already-named files into.
    SaveDirForFiles,
}

impl Mode {
    /// Resolve a `--mode` string. Anything unrecognised picks a single file.
    pub fn from_config_str(s: &str) -> Self {
        match s {
            "file" => Mode::SingleFile,
            "files" => Mode::MultipleFiles,
            "save-file" => Mode::SaveFile,
            "dir" => Mode::SingleDir,
            "dirs" => Mode::MultipleDirs,
            "save-dir" => Mode::SaveDir,
            "dir-for-files" => Mode::SaveDirForFiles,
            _ => Mode::SingleFile,
        }
    }

    pub fn can_select_nonexistent(self) -> bool {
        match self {
            Mode::SaveFile | Mode::SaveDir => true,
            Mode::SingleFile
            | Mode::MultipleFiles
            | Mode::SingleDir
            | Mode::MultipleDirs
            | Mode::SaveDirForFiles => false,
        }
    }

    pub fn allows_multiple_selection(self) -> bool {
        match self {
            Mode::MultipleFiles | Mode::MultipleDirs => true,
            Mode::SingleFile
            | Mode::SaveFile
            | Mode::SaveDir
            | Mode::SingleDir
            | Mode::SaveDirForFiles => false,
        }
    }

    pub fn only_dirs(self) -> bool {
        match self {
            Mode::SingleDir | Mode::MultipleDirs | Mode::SaveDir | Mode::SaveDirForFiles => true,
            Mode::SingleFile | Mode::MultipleFiles | Mode::SaveFile => false,
        }
    }

    pub fn select_files(self) -> bool {
        match self {
            Mode::SingleFile | Mode::MultipleFiles | Mode::SaveFile => true,
            Mode::SaveDir | Mode::SingleDir | Mode::MultipleDirs | Mode::SaveDirForFiles => false,
        }
    }

    pub fn window_title(self) -> &'static str {
        match self {
            Mode::SingleFile => "Choose an existing file",
            Mode::MultipleFiles => "Choose one or more existing files",
            Mode::SaveFile => "Choose a file to save",
            Mode::SaveDir => "Choose a directory to save",
            Mode::SingleDir => "Choose an existing directory",
            Mode::MultipleDirs => "Choose one or more directories",
            Mode::SaveDirForFiles => "Choose a directory to save multiple files in",
        }
    }
}
