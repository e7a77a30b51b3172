use std::time::Duration;

use tokio::time::Instant;

use crate::{
    commands::command_error::CommandError, key_value_store::SharedStore, resp::RespValue,
};

/// Represents the parsed arguments for the SET command.
pub struct SetArguments {
    /// The key name to write to the store
    key: String,
    /// The value to be stored under the given key
    value: String,
    /// Time-to-live for the key, if an expiring write was requested
    ttl: Option<Duration>,
}

impl SetArguments {
    /// Parses and validates the arguments for the SET command.
    ///
    /// The command requires at least a key and a value; any remaining
    /// arguments are scanned in pairs as trailing options. Two options are
    /// recognized, case-insensitively: `PX <milliseconds>` and
    /// `EX <seconds>`. A later option overrides an earlier one.
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed key, value and optional ttl
    /// * `Err(CommandError::WrongNumberOfArguments)` - Fewer than two arguments
    /// * `Err(CommandError::InvalidPxValue)` - PX value is not an integer
    /// * `Err(CommandError::InvalidExValue)` - EX value is not an integer
    /// * `Err(CommandError::InvalidExpireTime)` - The ttl is too large to
    ///   resolve to an expiration instant
    /// * `Err(CommandError::InvalidSetOption)` - Any unrecognized option
    ///   token, including `PX`/`EX` with no following value
    ///
    /// A non-positive ttl is treated as no expiration, which also clears
    /// any expiration a previous write left behind.
    fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("SET"));
        }

        let options = arguments.split_off(2);
        let value = arguments.remove(1);
        let key = arguments.remove(0);

        let mut ttl: Option<Duration> = None;
        let mut index = 0;

        while index < options.len() {
            match options[index].to_uppercase().as_str() {
                "PX" if index + 1 < options.len() => {
                    let milliseconds = options[index + 1]
                        .parse::<i64>()
                        .map_err(|_| CommandError::InvalidPxValue)?;

                    ttl = expiring_duration(milliseconds, Duration::from_millis)?;
                    index += 2;
                }
                "EX" if index + 1 < options.len() => {
                    let seconds = options[index + 1]
                        .parse::<i64>()
                        .map_err(|_| CommandError::InvalidExValue)?;

                    ttl = expiring_duration(seconds, Duration::from_secs)?;
                    index += 2;
                }
                _ => return Err(CommandError::InvalidSetOption),
            }
        }

        Ok(Self { key, value, ttl })
    }
}

/// Resolves a PX/EX amount to a time-to-live.
///
/// A non-positive amount means no expiration. An amount so large that no
/// expiration instant can represent it is rejected here, before the store
/// is touched.
fn expiring_duration(
    amount: i64,
    unit: fn(u64) -> Duration,
) -> Result<Option<Duration>, CommandError> {
    if amount <= 0 {
        return Ok(None);
    }

    let ttl = unit(amount as u64);

    if Instant::now().checked_add(ttl).is_none() {
        return Err(CommandError::InvalidExpireTime);
    }

    Ok(Some(ttl))
}

/// Handles the SET command.
///
/// Stores a scalar value at a key, overwriting any existing value of
/// either type, with an optional expiration given by the PX or EX option.
/// Option validation completes before the store is touched: a malformed
/// option aborts the whole command and the key is not written.
pub async fn set(store: &SharedStore, arguments: Vec<String>) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    store_guard.set_scalar(set_arguments.key, set_arguments.value, set_arguments.ttl);

    Ok(RespValue::SimpleString("OK".to_string()))
}
