use std::time::Duration;

use rudis::server::{self, CliError, ServerConfig};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::sleep,
};

/// Spawns the server on the given port and waits until it accepts
/// connections. Each test uses its own port so they can run in parallel.
async fn start_server(port: u32) -> TcpStream {
    tokio::spawn(server::run(ServerConfig { port }));

    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port as u16)).await {
            return stream;
        }

        sleep(Duration::from_millis(20)).await;
    }

    panic!("server did not start on port {}", port);
}

/// Writes a request and asserts the exact reply bytes.
async fn exec(stream: &mut TcpStream, request: &[u8], expected_reply: &str) {
    stream.write_all(request).await.unwrap();
    stream.flush().await.unwrap();

    let mut reply = vec![0u8; expected_reply.len()];
    stream.read_exact(&mut reply).await.unwrap();

    assert_eq!(
        String::from_utf8_lossy(&reply),
        expected_reply,
        "request {:?}",
        String::from_utf8_lossy(request)
    );
}

#[test]
fn test_server_config_from_args() {
    let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<String>>();

    assert_eq!(
        ServerConfig::new(args(&["rudis"])),
        Ok(ServerConfig { port: 6379 })
    );
    assert_eq!(
        ServerConfig::new(args(&["rudis", "--port", "41851"])),
        Ok(ServerConfig { port: 41851 })
    );
    assert_eq!(
        ServerConfig::new(args(&["rudis", "--port"])),
        Err(CliError::InvalidCommandLineFlagValue)
    );
    assert_eq!(
        ServerConfig::new(args(&["rudis", "--port", "0"])),
        Err(CliError::InvalidCommandLineFlagValue)
    );
    assert_eq!(
        ServerConfig::new(args(&["rudis", "--port", "high"])),
        Err(CliError::InvalidCommandLineFlagValue)
    );
    assert_eq!(
        ServerConfig::new(args(&["rudis", "--replicaof", "x"])),
        Err(CliError::InvalidCommandLineFlag)
    );
}

#[tokio::test]
async fn test_set_then_get_scenario() {
    let mut stream = start_server(41851).await;

    exec(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n",
        "+OK\r\n",
    )
    .await;
    exec(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n", "$1\r\nv\r\n").await;
}

#[tokio::test]
async fn test_echo_scenarios() {
    let mut stream = start_server(41852).await;

    exec(
        &mut stream,
        b"*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n",
        "$2\r\nhi\r\n",
    )
    .await;
    exec(
        &mut stream,
        b"*1\r\n$4\r\nECHO\r\n",
        "-Err wrong number of arguments for 'ECHO' command\r\n",
    )
    .await;

    // The connection stays open after a command error.
    exec(&mut stream, b"*1\r\n$4\r\nPING\r\n", "+PONG\r\n").await;
}

#[tokio::test]
async fn test_inline_command_fallback() {
    let mut stream = start_server(41853).await;

    exec(&mut stream, b"PING\r\n", "+PONG\r\n").await;
    exec(&mut stream, b"SET k v\r\n", "+OK\r\n").await;
    exec(&mut stream, b"GET k\r\n", "$1\r\nv\r\n").await;
}

#[tokio::test]
async fn test_pipelined_commands_are_answered_in_order() {
    let mut stream = start_server(41854).await;

    exec(
        &mut stream,
        b"*1\r\n$4\r\nPING\r\n*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n",
        "+PONG\r\n$2\r\nhi\r\n",
    )
    .await;
}

#[tokio::test]
async fn test_set_with_px_expires_over_the_wire() {
    let mut stream = start_server(41855).await;

    exec(
        &mut stream,
        b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nPX\r\n$3\r\n100\r\n",
        "+OK\r\n",
    )
    .await;

    sleep(Duration::from_millis(150)).await;

    exec(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n", "$-1\r\n").await;
}

#[tokio::test]
async fn test_unknown_command_keeps_connection_open() {
    let mut stream = start_server(41856).await;

    exec(
        &mut stream,
        b"*1\r\n$7\r\nUNKNOWN\r\n",
        "-Err unknown command\r\n",
    )
    .await;
    exec(&mut stream, b"*1\r\n$4\r\nPING\r\n", "+PONG\r\n").await;
}

#[tokio::test]
async fn test_rejected_set_option_does_not_write_the_key() {
    let mut stream = start_server(41857).await;

    exec(
        &mut stream,
        b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nXX\r\n$1\r\n1\r\n",
        "-Err invalid SET option\r\n",
    )
    .await;
    exec(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n", "$-1\r\n").await;
}

#[tokio::test]
async fn test_concurrent_pushes_interleave_at_whole_call_granularity() {
    let _server = start_server(41858).await;

    let mut tasks = Vec::new();

    for connection in 0..4 {
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(("127.0.0.1", 41858)).await.unwrap();

            for i in 0..10 {
                let value = format!("c{}-{}", connection, i);
                let request = format!(
                    "*3\r\n$5\r\nRPUSH\r\n$6\r\nshared\r\n${}\r\n{}\r\n",
                    value.len(),
                    value
                );

                stream.write_all(request.as_bytes()).await.unwrap();

                // Every push returns some integer; the exact value depends
                // on the interleaving, so only the reply shape is checked.
                let mut reply = [0u8; 1];
                stream.read_exact(&mut reply).await.unwrap();
                assert_eq!(reply[0], b':');

                let mut byte = [0u8; 1];
                loop {
                    stream.read_exact(&mut byte).await.unwrap();
                    if byte[0] == b'\n' {
                        break;
                    }
                }
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    // All 40 pushed elements must be present exactly once.
    let mut stream = TcpStream::connect(("127.0.0.1", 41858)).await.unwrap();
    stream
        .write_all(b"*4\r\n$6\r\nLRANGE\r\n$6\r\nshared\r\n$1\r\n0\r\n$2\r\n-1\r\n")
        .await
        .unwrap();

    // Every value is 4 characters, so the reply size is fixed:
    // "*40\r\n" plus 40 occurrences of "$4\r\ncX-Y\r\n".
    let mut reply = vec![0u8; 5 + 40 * 10];
    stream.read_exact(&mut reply).await.unwrap();

    assert!(reply.starts_with(b"*40\r\n"));

    let text = String::from_utf8_lossy(&reply);

    for connection in 0..4 {
        let mut previous = None;

        for i in 0..10 {
            let position = text
                .find(&format!("c{}-{}\r\n", connection, i))
                .unwrap_or_else(|| panic!("missing element c{}-{}", connection, i));

            // Pushes on one connection are sequential, so their relative
            // order must survive any interleaving with other connections.
            if let Some(previous) = previous {
                assert!(position > previous, "out-of-order push for c{}", connection);
            }

            previous = Some(position);
        }
    }
}
