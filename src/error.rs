use std::{io,fmt};
use std::convert::From;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    IO(io::Error),
    CSV(csv::Error),
    JSON(serde_json::Error),
    Fmt(fmt::Error),
    Reqwest(reqwest::Error),
    HttpError(reqwest::StatusCode),
    Schema(String),
    EmptyInput(&'static str),
    ScopeMismatch(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
	Self::IO(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
	let schema = match err.kind() {
	    csv::ErrorKind::Deserialize { pos, err: de } => Some(format!(
		"row {}: {}", pos.as_ref().map_or(0, |p| p.line()), de)),
	    _ => None
	};
	match schema {
	    Some(msg) => Self::Schema(msg),
	    None => Self::CSV(err)
	}
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
	Self::JSON(err)
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
	Self::Fmt(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
	Self::Reqwest(err)
    }
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Self::IO(err) => write!(f, "I/O error: {}", err),
	    Self::CSV(err) => write!(f, "CSV error: {}", err),
	    Self::JSON(err) => write!(f, "JSON error: {}", err),
	    Self::Fmt(err) => write!(f, "Formatting error: {}", err),
            Self::Reqwest(err) => write!(f, "Request error: {}", err),
	    Self::HttpError(err) => write!(f, "HTTP error: {}", err),
	    Self::Schema(msg) => write!(f, "Schema error: {}", msg),
	    Self::EmptyInput(what) => write!(f, "Empty input: {}", what),
	    Self::ScopeMismatch(scope) => write!(f, "Scope matches no records: {}", scope),
	}
    }
}

impl std::error::Error for Error {}
