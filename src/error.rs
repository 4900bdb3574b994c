use std::{fmt, io, path::PathBuf};
use zip::result::ZipError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    File(io::Error),
    Reqwest(reqwest::Error),
    SerdeJson(serde_json::Error),
    Zip(ZipError),
    /// The release has no archive for the running platform
    NoAsset(String),
    /// Extraction finished but the archive did not contain the executable
    MissingExecutable(PathBuf),
    InvalidTag(String),
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(err) => write!(f, "file error: {}", err),
            Self::Reqwest(err) => write!(f, "network error: {}", err),
            Self::SerdeJson(err) => write!(f, "invalid JSON: {}", err),
            Self::Zip(err) => write!(f, "archive error: {}", err),
            Self::NoAsset(tag) => write!(f, "release {} has no download for this platform", tag),
            Self::MissingExecutable(path) => {
                write!(f, "archive did not contain {}", path.display())
            }
            Self::InvalidTag(tag) => write!(f, "invalid version tag {:?}", tag),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(err) => Some(err),
            Self::Reqwest(err) => Some(err),
            Self::SerdeJson(err) => Some(err),
            Self::Zip(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::File(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Reqwest(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Self::Other(error.into())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Self::Other(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::SerdeJson(error)
    }
}

impl From<ZipError> for Error {
    fn from(error: ZipError) -> Self {
        Self::Zip(error)
    }
}
