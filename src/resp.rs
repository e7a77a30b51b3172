//! RESP protocol codec.
//!
//! Decodes the raw byte stream of a connection into command frames and
//! encodes typed reply values back into RESP wire format. This module has
//! no knowledge of command semantics; it only deals with framing.

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Errors that can occur while decoding a RESP frame.
///
/// All of these are fatal to the connection: once framing is lost there is
/// no reliable way to resynchronize with the client.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("line does not end with CRLF")]
    MissingCrlf,
    #[error("invalid array length")]
    InvalidArrayLength,
    #[error("expected bulk string")]
    ExpectedBulkString,
    #[error("invalid bulk string length")]
    InvalidBulkStringLength,
    #[error("bulk string does not end with CRLF")]
    BulkStringMissingCrlf,
}

/// A typed reply value, encoded once per command.
#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    BulkString(String),
    Null,
    Integer(i64),
    Error(String),
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Encodes the reply into its RESP wire representation.
    ///
    /// Encoding is total over the variant set. Note that `Error` carries
    /// only the message; the encoder adds the `Err` prefix so that the
    /// wire format is `-Err <message>\r\n`.
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::BulkString(s) => format!("${}\r\n{}\r\n", s.len(), s),
            RespValue::Null => "$-1\r\n".to_string(),
            RespValue::Integer(n) => format!(":{}\r\n", n),
            RespValue::Error(msg) => format!("-Err {}\r\n", msg),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());

                for element in elements {
                    encoded.push_str(&element.encode());
                }

                encoded
            }
        }
    }
}

/// Attempts to decode one command frame from the front of `buffer`.
///
/// Two framing modes are supported, selected by the first byte:
///
/// - *Array mode* (`*`): a `*<N>\r\n` header followed by N bulk strings,
///   each a `$<L>\r\n` header plus exactly L payload bytes and a CRLF.
///   A declared length of -1 decodes to an empty-string element with no
///   payload bytes.
/// - *Inline mode* (anything else): a single CRLF-terminated line split on
///   whitespace, as a fallback for manual text clients.
///
/// # Returns
///
/// * `Ok(Some(parts))` - A complete frame was decoded and its bytes were
///   consumed from the buffer. `parts` may be empty (e.g. a blank inline
///   line), which the caller must treat as a no-op.
/// * `Ok(None)` - The buffer does not yet hold a complete frame; nothing
///   was consumed. The caller should read more bytes and retry.
/// * `Err(RespError)` - The frame is malformed; the connection should be
///   terminated.
pub fn decode_command(buffer: &mut BytesMut) -> Result<Option<Vec<String>>, RespError> {
    if buffer.is_empty() {
        return Ok(None);
    }

    let decoded = if buffer[0] == b'*' {
        decode_array(buffer)?
    } else {
        decode_inline(buffer)?
    };

    match decoded {
        Some((parts, frame_length)) => {
            buffer.advance(frame_length);
            Ok(Some(parts))
        }
        None => Ok(None),
    }
}

fn decode_array(buffer: &[u8]) -> Result<Option<(Vec<String>, usize)>, RespError> {
    let Some((header, mut position)) = read_line(buffer, 0)? else {
        return Ok(None);
    };

    let count = header[1..]
        .parse::<i64>()
        .map_err(|_| RespError::InvalidArrayLength)?;

    // A negative count is a null array; it decodes to zero elements.
    let count = count.max(0) as usize;

    // Preallocation is bounded by the bytes actually buffered, so a
    // declared count cannot force a huge allocation on its own.
    let mut parts = Vec::with_capacity(count.min(buffer.len()));

    while parts.len() < count {
        let Some((element_header, after_header)) = read_line(buffer, position)? else {
            return Ok(None);
        };

        if !element_header.starts_with('$') {
            return Err(RespError::ExpectedBulkString);
        }

        let length = element_header[1..]
            .parse::<i64>()
            .map_err(|_| RespError::InvalidBulkStringLength)?;

        // A null bulk string has no payload bytes at all.
        if length < 0 {
            parts.push(String::new());
            position = after_header;
            continue;
        }

        let length = length as usize;

        if buffer.len() < after_header + length + 2 {
            return Ok(None);
        }

        if &buffer[after_header + length..after_header + length + 2] != b"\r\n" {
            return Err(RespError::BulkStringMissingCrlf);
        }

        let payload = std::str::from_utf8(&buffer[after_header..after_header + length])
            .map_err(|_| RespError::InvalidUtf8)?;

        parts.push(payload.to_string());
        position = after_header + length + 2;
    }

    Ok(Some((parts, position)))
}

fn decode_inline(buffer: &[u8]) -> Result<Option<(Vec<String>, usize)>, RespError> {
    let Some((line, position)) = read_line(buffer, 0)? else {
        return Ok(None);
    };

    let parts = line
        .split_whitespace()
        .map(|s| s.to_string())
        .collect::<Vec<String>>();

    Ok(Some((parts, position)))
}

/// Reads one CRLF-terminated line starting at `from`.
///
/// Returns the line without its terminator and the offset of the byte
/// after the terminator, `Ok(None)` if no full line is buffered yet, or an
/// error if the line ends in a bare `\n` or is not valid UTF-8.
fn read_line(buffer: &[u8], from: usize) -> Result<Option<(&str, usize)>, RespError> {
    let Some(newline_offset) = buffer[from..].iter().position(|&b| b == b'\n') else {
        return Ok(None);
    };

    let newline = from + newline_offset;

    if newline == from || buffer[newline - 1] != b'\r' {
        return Err(RespError::MissingCrlf);
    }

    let line = std::str::from_utf8(&buffer[from..newline - 1])
        .map_err(|_| RespError::InvalidUtf8)?;

    Ok(Some((line, newline + 1)))
}
