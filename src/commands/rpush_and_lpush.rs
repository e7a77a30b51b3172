use crate::{
    commands::command_error::CommandError, key_value_store::SharedStore, resp::RespValue,
};

pub struct PushArguments {
    key: String,
    values: Vec<String>,
}

impl PushArguments {
    pub fn parse(
        mut arguments: Vec<String>,
        command_name: &'static str,
    ) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments(command_name));
        }

        let values = arguments.split_off(1);
        let key = arguments.remove(0);

        Ok(Self { key, values })
    }
}

/// Handles the RPUSH command: appends values, in order, to the end of the
/// list at a key, creating the list if the key is absent. Replies with
/// the resulting list length.
pub async fn rpush(store: &SharedStore, arguments: Vec<String>) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, "RPUSH")?;

    let mut store_guard = store.lock().await;
    let length = store_guard.rpush(push_arguments.key, push_arguments.values)?;

    Ok(RespValue::Integer(length as i64))
}

/// Handles the LPUSH command: prepends values to the front of the list at
/// a key, preserving the relative order of the supplied values (pushing
/// `[a, b]` yields `[a, b, ...existing]`). Replies with the resulting
/// list length.
pub async fn lpush(store: &SharedStore, arguments: Vec<String>) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, "LPUSH")?;

    let mut store_guard = store.lock().await;
    let length = store_guard.lpush(push_arguments.key, push_arguments.values)?;

    Ok(RespValue::Integer(length as i64))
}
