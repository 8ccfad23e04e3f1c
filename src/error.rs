use std::fmt;

use kleplate_board::Error as BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// CLI usage error (missing args, invalid flags).
    Usage = 1,
    /// Input error (missing file, unreadable layout, invalid job values).
    Input = 2,
    /// Processing error (no outline, geometry failure, host failure).
    Processing = 3,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<BoardError> for CliError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Layout(_) | BoardError::Validation(_) => CliError::input(err.to_string()),
            BoardError::Geometry(_) | BoardError::Host(_) | BoardError::Export(_) => {
                CliError::processing(err.to_string())
            }
        }
    }
}
