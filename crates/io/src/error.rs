use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    /// The file does not exist. Optional map layers treat this as a warning.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Read { path: PathBuf, message: String },
    /// The file was read but its contents could not be parsed.
    Parse { path: PathBuf, message: String },
    /// The file extension names no supported format.
    UnsupportedFormat(PathBuf),
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Read { path: path.to_path_buf(), message: err.to_string() }
        }
    }

    pub(crate) fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Parse { path: path.to_path_buf(), message: message.into() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "cannot parse {}: {message}", path.display())
            }
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported file format: {}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}
