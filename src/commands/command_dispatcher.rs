//! Maps decoded command names to their handlers.

use tracing::debug;

use crate::{
    commands::{command_error::CommandError, echo, get, lrange, ping, rpush_and_lpush, set},
    key_value_store::SharedStore,
    resp::RespValue,
};

/// A decoded command: uppercased name plus its arguments in wire order.
/// Immutable once constructed.
#[derive(Debug, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Builds a command from the elements of a decoded frame.
    ///
    /// Returns `None` for a frame with zero elements, which the caller
    /// must treat as a no-op rather than an error.
    pub fn from_parts(mut parts: Vec<String>) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }

        let args = parts.split_off(1);
        let name = parts.remove(0).to_uppercase();

        Some(Command { name, args })
    }
}

/// Dispatches a command to its handler and produces the reply to encode.
///
/// Command names are matched case-insensitively (they are uppercased at
/// decode time). Each handler validates its own argument count and shape;
/// handler errors are wrapped into an error reply here, never propagated
/// to the connection loop.
pub async fn dispatch(command: &Command, store: &SharedStore) -> RespValue {
    let args = command.args.clone();

    let result = match command.name.as_str() {
        "PING" => ping::ping(args),
        "ECHO" => echo::echo(args),
        "GET" => get::get(store, args).await,
        "SET" => set::set(store, args).await,
        "RPUSH" => rpush_and_lpush::rpush(store, args).await,
        "LPUSH" => rpush_and_lpush::lpush(store, args).await,
        "LRANGE" => lrange::lrange(store, args).await,
        _ => Err(CommandError::UnknownCommand),
    };

    match result {
        Ok(reply) => reply,
        Err(error) => {
            debug!(command = %command.name, %error, "command rejected");
            error.as_reply()
        }
    }
}
