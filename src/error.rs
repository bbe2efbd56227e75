use std::error::Error;
use std::fmt;
use std::io;

/// Fatal error taxonomy for a minimization run. Every variant aborts the run;
/// the checkpoint guard restores the polluter file before any of these reach
/// the caller.
#[derive(Debug)]
pub enum MinimizeError {
    /// The named function does not exist in the polluter module.
    FunctionNotFound { name: String, path: String },
    /// pytest could not be started, or its output carried no parsable
    /// outcome for the final selector.
    Oracle(String),
    /// A rendered candidate failed to re-parse as Python.
    Parse { path: String },
    Io(io::Error),
}

impl fmt::Display for MinimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimizeError::FunctionNotFound { name, path } => {
                write!(f, "function '{}' not found in {}", name, path)
            }
            MinimizeError::Oracle(msg) => write!(f, "oracle failure: {}", msg),
            MinimizeError::Parse { path } => {
                write!(f, "candidate for {} no longer parses as Python", path)
            }
            MinimizeError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl Error for MinimizeError {}

impl From<io::Error> for MinimizeError {
    fn from(e: io::Error) -> Self {
        MinimizeError::Io(e)
    }
}
