use crate::{
    commands::command_error::CommandError,
    key_value_store::{SharedStore, StoreError, StoredValue},
    resp::RespValue,
};

/// Handles the GET command.
///
/// Retrieves the scalar value stored at a key. The store performs its
/// lazy-expiry check as part of the lookup, so an expired key reads as
/// absent here.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The value, if the key holds a live scalar
/// * `Ok(RespValue::Null)` - If the key is absent or expired
/// * `Err(CommandError)` - Wrong argument count, or the key holds a list
pub async fn get(store: &SharedStore, arguments: Vec<String>) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongNumberOfArguments("GET"));
    }

    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments[0]) {
        Some(StoredValue::Scalar(value)) => Ok(RespValue::BulkString(value.clone())),
        Some(StoredValue::List(_)) => Err(CommandError::Store(StoreError::WrongType)),
        None => Ok(RespValue::Null),
    }
}
