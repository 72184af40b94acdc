//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// ConnectionId too long error
    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },

    /// Poll question validation error
    #[error("Poll question cannot be empty")]
    PollQuestionEmpty,

    /// Poll needs at least two options
    #[error("Poll needs at least {min} options (got {actual})")]
    PollOptionsTooFew { min: usize, actual: usize },

    /// Poll option text validation error
    #[error("Poll option {index} cannot be empty")]
    PollOptionEmpty { index: usize },

    /// Poll duration must be positive
    #[error("Poll duration must be at least 1 second")]
    PollDurationZero,

    /// Correct answer does not point at an option
    #[error("Correct answer {index} is out of range for {options} options")]
    CorrectAnswerOutOfRange { index: usize, options: usize },
}

/// Errors raised when a participant joins the session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// Another student already uses this username
    #[error("Username already taken")]
    DuplicateUsername(String),

    /// The requested username is not acceptable
    #[error(transparent)]
    InvalidUsername(#[from] ValueObjectError),
}

/// Errors raised when a student submits a poll response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// No poll has been created yet
    #[error("No active poll")]
    NoPoll,

    /// A poll exists but is not accepting responses
    #[error("Poll is not active")]
    PollNotActive,

    /// The connection is not a joined student
    #[error("Only joined students can respond")]
    NotAStudent,

    /// The student already answered in this poll cycle
    #[error("You have already responded to this poll")]
    AlreadyResponded,

    /// The option index does not exist in the current poll
    #[error("Option {index} does not exist in this poll")]
    InvalidOption { index: usize },
}
