//! Per-connection request loop.
//!
//! Each accepted connection runs one of these tasks: bytes are read into
//! an accumulation buffer, every complete frame in the buffer is decoded,
//! dispatched and answered, and only then does the task go back to waiting
//! on the socket. The store lock is never held across a socket await.

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{tcp::OwnedWriteHalf, TcpStream},
};
use tracing::{debug, warn};

use crate::{
    commands::{dispatch, Command},
    key_value_store::SharedStore,
    resp,
};

/// Drives one client connection until end-of-stream or a fatal error.
///
/// Framing errors and transport errors terminate the task (no reply is
/// guaranteed for the offending frame); command errors are answered with
/// an error reply and the connection stays open.
pub async fn handle_connection(stream: TcpStream, address: SocketAddr, store: SharedStore) {
    let (mut reader, mut writer) = stream.into_split();
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        // Drain every complete frame already buffered before reading again,
        // so pipelined commands are answered in order.
        loop {
            let parts = match resp::decode_command(&mut buffer) {
                Ok(Some(parts)) => parts,
                Ok(None) => break,
                Err(error) => {
                    warn!(%address, %error, "framing error, closing connection");
                    return;
                }
            };

            let Some(command) = Command::from_parts(parts) else {
                debug!(%address, "empty command received");
                continue;
            };

            let reply = dispatch(&command, &store).await;

            if let Err(error) = write_reply(&mut writer, &reply.encode()).await {
                warn!(%address, %error, "write error, closing connection");
                return;
            }
        }

        match reader.read_buf(&mut buffer).await {
            Ok(0) => {
                if buffer.is_empty() {
                    debug!(%address, "connection closed");
                } else {
                    warn!(%address, "connection closed mid-frame");
                }
                return;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%address, %error, "read error, closing connection");
                return;
            }
        }
    }
}

async fn write_reply(writer: &mut OwnedWriteHalf, reply: &str) -> tokio::io::Result<()> {
    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await
}
