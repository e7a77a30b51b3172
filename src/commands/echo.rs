use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the ECHO command.
///
/// Returns the exact string provided as an argument, as a bulk string.
/// Requires exactly one argument.
pub fn echo(mut arguments: Vec<String>) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongNumberOfArguments("ECHO"));
    }

    Ok(RespValue::BulkString(arguments.remove(0)))
}
