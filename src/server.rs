//! Server bootstrap: command-line configuration, the listening socket and
//! the accept loop, plus spawning the background expiry sweeper.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

use crate::{
    connection::handle_connection,
    key_value_store::{run_expiry_sweeper, KeyValueStore, SharedStore},
};

/// Reference cadence for the background expiry sweeper.
const SWEEP_PERIOD: Duration = Duration::from_secs(1);

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("invalid command line flag value")]
    InvalidCommandLineFlagValue,
}

#[derive(Debug, PartialEq)]
pub struct ServerConfig {
    pub port: u32,
}

impl ServerConfig {
    /// Parses the server configuration from command line arguments.
    ///
    /// The first argument (the program name) is skipped. The only
    /// supported flag is `--port <n>`; the port defaults to 6379.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut port: Option<u32> = None;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" => {
                    let Some(port_str) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    };

                    let port_number = port_str
                        .parse::<u32>()
                        .map_err(|_| CliError::InvalidCommandLineFlagValue)?;

                    if port_number < 1 || port_number > 65535 {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    }

                    port = Some(port_number);
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        Ok(ServerConfig {
            port: port.unwrap_or(6379),
        })
    }
}

/// Binds the listening socket and serves connections for the process
/// lifetime.
///
/// Creates the shared store, spawns the expiry sweeper, then accepts
/// connections in a loop, one task per connection. Accept errors are
/// logged and do not stop the server.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, "server listening");

    let store: SharedStore = Arc::new(Mutex::new(KeyValueStore::new()));
    tokio::spawn(run_expiry_sweeper(Arc::clone(&store), SWEEP_PERIOD));

    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                info!(%address, "accepted connection");
                tokio::spawn(handle_connection(stream, address, Arc::clone(&store)));
            }
            Err(error) => {
                error!(%error, "error accepting connection");
            }
        }
    }
}
