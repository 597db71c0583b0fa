use std::fmt;

/// Errors that can occur while setting up a breathing session
#[derive(Debug, Clone)]
pub enum BreathError {
    /// The configuration file could not be read
    ConfigUnreadable(String),
    /// The configuration is not valid JSON for a session
    ConfigMalformed(String),
    /// No breath pattern is registered under this name
    UnknownPattern(String),
}

impl fmt::Display for BreathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreathError::ConfigUnreadable(reason) => {
                write!(f, "Cannot read configuration: {reason}")
            }
            BreathError::ConfigMalformed(reason) => write!(f, "Malformed configuration: {reason}"),
            BreathError::UnknownPattern(name) => write!(f, "Unknown breath pattern {name:?}"),
        }
    }
}

impl std::error::Error for BreathError {}
