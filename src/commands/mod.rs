pub mod command_dispatcher;
pub mod command_error;
pub mod echo;
pub mod get;
pub mod lrange;
pub mod ping;
pub mod rpush_and_lpush;
pub mod set;

pub use command_dispatcher::{dispatch, Command};
pub use command_error::CommandError;
