use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the PING command.
///
/// With no argument, replies with the simple string `PONG`; with one
/// argument, echoes it back as a bulk string.
pub fn ping(mut arguments: Vec<String>) -> Result<RespValue, CommandError> {
    match arguments.len() {
        0 => Ok(RespValue::SimpleString("PONG".to_string())),
        1 => Ok(RespValue::BulkString(arguments.remove(0))),
        _ => Err(CommandError::WrongNumberOfArguments("PING")),
    }
}
