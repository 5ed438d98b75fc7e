use std::io;

use tcat_session::SessionError;
use tcat_tlv::Tlv;
use tcat_transport::TransportError;

use crate::dataset::DatasetError;

/// What a command hands back to the loop for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    None,
    Tlv(Tlv),
}

impl CommandResult {
    /// `None` when the device did not answer.
    pub fn from_response(response: Option<Tlv>) -> Self {
        response.map_or(Self::None, Self::Tlv)
    }
}

/// Errors that can occur while executing a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("not connected to a device; run 'scan' first")]
    NotConnected,

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("console error: {0}")]
    Io(#[from] io::Error),
}

pub type CommandOutcome = Result<CommandResult, CommandError>;
