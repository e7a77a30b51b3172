use crate::{
    commands::command_error::CommandError, key_value_store::SharedStore, resp::RespValue,
};

/// Represents the parsed arguments for the LRANGE command.
pub struct LrangeArguments {
    /// The key name to read from the store
    key: String,
    /// The starting index for the range (can be negative to count from the end)
    start_index: isize,
    /// The ending index for the range (can be negative to count from the end)
    end_index: isize,
}

impl LrangeArguments {
    /// Parses and validates the arguments for the LRANGE command.
    ///
    /// Requires exactly three arguments: the key, the start index and the
    /// end index, with both indices parsed as signed integers.
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::WrongNumberOfArguments("LRANGE"));
        }

        let Ok(start_index) = arguments[1].parse::<isize>() else {
            return Err(CommandError::InvalidRangeIndex);
        };

        let Ok(end_index) = arguments[2].parse::<isize>() else {
            return Err(CommandError::InvalidRangeIndex);
        };

        Ok(Self {
            key: arguments.remove(0),
            start_index,
            end_index,
        })
    }
}

/// Handles the LRANGE command.
///
/// Returns a range of elements from the list stored at a key as an array
/// of bulk strings. Negative indices count from the end of the list;
/// out-of-bounds indices are clamped rather than rejected, and an absent
/// key yields an empty array, never an error.
pub async fn lrange(
    store: &SharedStore,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let range = store_guard.lrange(
        &lrange_arguments.key,
        lrange_arguments.start_index,
        lrange_arguments.end_index,
    )?;

    Ok(RespValue::Array(
        range.into_iter().map(RespValue::BulkString).collect(),
    ))
}
