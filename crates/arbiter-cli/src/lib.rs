//! Line-oriented text protocol for driving an arbiter game.

pub mod command;
pub mod error;
pub mod session;

pub use command::{Command, MoveInput, SessionOption};
pub use error::CliError;
pub use session::{Session, SessionConfig};
