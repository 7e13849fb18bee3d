// Error taxonomy for draw session commands.

use thiserror::Error;

use crate::session::Phase;

/// A rejected draw command. The session is left untouched whenever one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("invalid value for `{field}`: {message}")]
    InvalidArgument { field: &'static str, message: String },

    #[error("`{command}` is not allowed while the draw is {phase}")]
    InvalidState { command: &'static str, phase: Phase },

    #[error("every participant has already won")]
    NoRemainingParticipants,
}

impl DrawError {
    pub(crate) fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        DrawError::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}
