//! Reply parsing
//!
//! [`parse`] is a pure function of `(buffer, offset)`. It returns
//! `Ok(None)` whenever the buffer ends before a complete value, and the caller
//! retries from the same offset once more bytes have arrived. Nested arrays are
//! re-parsed from their first byte on every retry; nothing is carried between
//! calls.

use super::{RedisError, RespValue};

/// Parse one value starting at `offset`
///
/// Returns the value and the offset just past it, or `None` if more bytes are
/// needed. A `-` error reply is raised as [`RedisError::Server`] rather than
/// returned. An unknown type byte, an unparsable length, or a bulk string
/// without its trailing CRLF is a [`RedisError::Protocol`].
pub fn parse(buf: &[u8], offset: usize) -> Result<Option<(RespValue, usize)>, RedisError> {
    let Some(&kind) = buf.get(offset) else {
        return Ok(None);
    };

    let Some(line_end) = find_crlf(buf, offset + 1) else {
        return match kind {
            b'+' | b'-' | b':' | b'$' | b'*' => Ok(None),
            other => Err(unknown_type(other)),
        };
    };
    let line = &buf[offset + 1..line_end];
    let next = line_end + 2;

    match kind {
        b'+' => Ok(Some((RespValue::SimpleString(utf8(line, "simple string")?), next))),
        b'-' => Err(RedisError::Server(String::from_utf8_lossy(line).into_owned())),
        b':' => Ok(Some((RespValue::Integer(parse_int(line, "integer")?), next))),
        b'$' => {
            let len = parse_int(line, "bulk string length")?;
            if len == -1 {
                return Ok(Some((RespValue::BulkString(None), next)));
            }
            let len = usize::try_from(len)
                .map_err(|_| RedisError::Protocol(format!("invalid bulk string length: {len}")))?;

            let body_end = next
                .checked_add(len)
                .ok_or_else(|| RedisError::Protocol(format!("invalid bulk string length: {len}")))?;
            if buf.len() < body_end + 2 {
                return Ok(None);
            }
            if &buf[body_end..body_end + 2] != b"\r\n" {
                return Err(RedisError::Protocol(
                    "bulk string missing trailing CRLF".to_string(),
                ));
            }
            let body = utf8(&buf[next..body_end], "bulk string")?;
            Ok(Some((RespValue::BulkString(Some(body)), body_end + 2)))
        }
        b'*' => {
            let count = parse_int(line, "array length")?;
            if count == -1 {
                return Ok(Some((RespValue::Array(None), next)));
            }
            let count = usize::try_from(count)
                .map_err(|_| RedisError::Protocol(format!("invalid array length: {count}")))?;

            // Each element takes at least 3 bytes
            let mut items = Vec::with_capacity(count.min((buf.len() - next) / 3));
            let mut cursor = next;
            for _ in 0..count {
                match parse(buf, cursor)? {
                    Some((value, after)) => {
                        items.push(value);
                        cursor = after;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((RespValue::Array(Some(items)), cursor)))
        }
        other => Err(unknown_type(other)),
    }
}

fn unknown_type(byte: u8) -> RedisError {
    RedisError::Protocol(format!("unknown RESP type byte: 0x{byte:02x}"))
}

fn find_crlf(buf: &[u8], start: usize) -> Option<usize> {
    buf.get(start..)?
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|i| start + i)
}

fn parse_int(line: &[u8], what: &str) -> Result<i64, RedisError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            RedisError::Protocol(format!(
                "invalid {what}: {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

fn utf8(bytes: &[u8], what: &str) -> Result<String, RedisError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| RedisError::Protocol(format!("invalid UTF-8 in {what}")))
}
