//! CLI protocol errors.

use arbiter_core::{FenError, GameError, NotationError};

/// Errors that can occur while parsing or executing a protocol command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The first word of the line is not a known command.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The unrecognized command word.
        command: String,
    },

    /// A command was given too few arguments.
    #[error("missing argument for {command}")]
    MissingArgument {
        /// The command that needed more input.
        command: &'static str,
    },

    /// An argument could not be parsed as the kind of value its command takes.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Command or option the value was given to.
        name: String,
        /// The rejected text.
        value: String,
    },

    /// `set` named an option the session does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as typed.
        name: String,
    },

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Fen(#[from] FenError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    /// An I/O error occurred while reading commands or writing replies.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    /// Whether the error is a rejected destination, which the protocol
    /// reports with a plain `invalid move` line.
    pub fn is_invalid_move(&self) -> bool {
        matches!(
            self,
            CliError::Game(GameError::IllegalDestination { .. })
                | CliError::Notation(NotationError::Game(GameError::IllegalDestination { .. }))
                | CliError::Notation(NotationError::NoSuchMove { .. })
        )
    }
}
