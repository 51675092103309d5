// ABOUTME: Error taxonomy for the mastering pipeline
// ABOUTME: Each variant maps to one failure class surfaced to the driver

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterError {
    /// Bad file name/extension or a local file that can't be opened
    InvalidInput(String),
    /// DNS, connect, timeout or HTTP-level failure
    Transport(String),
    /// Malformed gzip or JSON
    Decode(String),
    /// The service reported a failure
    Remote(String),
    Io(String),
    /// Polling exceeded the configured maximum wait
    Timeout(String),
}

impl MasterError {
    pub fn is_transport(&self) -> bool {
        matches!(self, MasterError::Transport(_))
    }
}

impl fmt::Display for MasterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MasterError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            MasterError::Transport(msg) => write!(f, "Transport error: {}", msg),
            MasterError::Decode(msg) => write!(f, "Decode error: {}", msg),
            MasterError::Remote(msg) => write!(f, "Remote error: {}", msg),
            MasterError::Io(msg) => write!(f, "IO error: {}", msg),
            MasterError::Timeout(msg) => write!(f, "Timeout: {}", msg),
        }
    }
}

impl std::error::Error for MasterError {}
