use thiserror::Error;

use crate::{key_value_store::StoreError, resp::RespValue};

/// Errors produced while validating or executing a single command.
///
/// All of these are recoverable per-command: they are surfaced to the
/// client as an error reply and the connection stays open. No command
/// error ever mutates store state, since validation completes before any
/// write is applied.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command")]
    UnknownCommand,
    #[error("wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(&'static str),
    #[error("invalid SET option")]
    InvalidSetOption,
    #[error("invalid PX value")]
    InvalidPxValue,
    #[error("invalid EX value")]
    InvalidExValue,
    #[error("invalid expire time")]
    InvalidExpireTime,
    #[error("start or stop index is not an integer")]
    InvalidRangeIndex,
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl CommandError {
    /// Converts the error into the reply sent back to the client.
    pub fn as_reply(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }
}
