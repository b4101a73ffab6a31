//! Minimal RESP2 client
//!
//! Only what a session store needs: URL resolution, command encoding, reply
//! parsing and a one-shot connection executor. Every call opens its own socket,
//! pipelines `AUTH`/`SELECT` ahead of the target command, and closes the socket
//! once the target reply is in.

mod encode;
mod executor;
mod parse;
mod url;

pub use encode::{encode_command, encode_command_into};
pub use executor::{exchange, Executor};
pub use parse::parse;
pub use url::ConnectionConfig;

use std::io;

/// Errors raised by the RESP client
#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    /// The connection string could not be split into scheme/host/port/db
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),
    /// Scheme other than `redis` or `rediss`
    #[error("unsupported redis scheme: {0}")]
    UnsupportedScheme(String),
    /// The connection string carries no host
    #[error("redis url is missing a host")]
    MissingHost,
    /// Port is not a valid u16
    #[error("invalid port: {0}")]
    InvalidPort(String),
    /// Path is not a numeric database index
    #[error("invalid database index: {0}")]
    InvalidDatabase(String),
    /// Socket level failure (connect, read, write, TLS handshake)
    #[error("redis transport error: {0}")]
    Io(#[from] io::Error),
    /// Host cannot be used as a TLS server name
    #[error("invalid TLS server name: {0}")]
    InvalidDnsName(String),
    /// Peer closed the socket before the target reply arrived
    #[error("redis connection closed before the reply was received")]
    ConnectionClosed,
    /// `-` reply from the server
    #[error("redis error: {0}")]
    Server(String),
    /// Byte stream that is not valid RESP2
    #[error("redis protocol error: {0}")]
    Protocol(String),
}

/// A decoded RESP2 value
///
/// Null bulk strings and null arrays are `None`, distinct from empty ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:1000\r\n`
    Integer(i64),
    /// `$6\r\nfoobar\r\n`, or `$-1\r\n` for null
    BulkString(Option<String>),
    /// `*2\r\n...`, or `*-1\r\n` for null
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Encode this value to the wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf);
        buf
    }

    /// Encode this value into an existing buffer
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => push_line(buf, b'+', s),
            RespValue::Error(e) => push_line(buf, b'-', e),
            RespValue::Integer(n) => push_line(buf, b':', &n.to_string()),
            RespValue::BulkString(Some(s)) => {
                push_line(buf, b'$', &s.len().to_string());
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(b"\r\n");
            }
            RespValue::BulkString(None) => buf.extend_from_slice(b"$-1\r\n"),
            RespValue::Array(Some(items)) => {
                push_line(buf, b'*', &items.len().to_string());
                for item in items {
                    item.encode_into(buf);
                }
            }
            RespValue::Array(None) => buf.extend_from_slice(b"*-1\r\n"),
        }
    }

    /// `true` for the `+OK` acknowledgement
    pub fn is_ok(&self) -> bool {
        matches!(self, RespValue::SimpleString(s) if s == "OK")
    }

    /// Integer payload, if this is an integer reply
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Bulk payload; `Err(self)` when the value is not a bulk string
    pub fn into_bulk(self) -> Result<Option<String>, RespValue> {
        match self {
            RespValue::BulkString(s) => Ok(s),
            other => Err(other),
        }
    }
}

fn push_line(buf: &mut Vec<u8>, kind: u8, text: &str) {
    buf.push(kind);
    buf.extend_from_slice(text.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_values() {
        assert_eq!(RespValue::SimpleString("OK".into()).encode(), b"+OK\r\n");
        assert_eq!(RespValue::Error("ERR bad".into()).encode(), b"-ERR bad\r\n");
        assert_eq!(RespValue::Integer(-3).encode(), b":-3\r\n");
        assert_eq!(RespValue::BulkString(None).encode(), b"$-1\r\n");
        assert_eq!(RespValue::BulkString(Some(String::new())).encode(), b"$0\r\n\r\n");
        assert_eq!(RespValue::Array(None).encode(), b"*-1\r\n");

        let nested = RespValue::Array(Some(vec![
            RespValue::Integer(1),
            RespValue::BulkString(Some("héllo".into())),
        ]));
        assert_eq!(nested.encode(), b"*2\r\n:1\r\n$6\r\nh\xc3\xa9llo\r\n");
    }

    #[test]
    fn test_helpers() {
        assert!(RespValue::SimpleString("OK".into()).is_ok());
        assert!(!RespValue::SimpleString("QUEUED".into()).is_ok());
        assert_eq!(RespValue::Integer(7).as_integer(), Some(7));
        assert_eq!(RespValue::BulkString(None).as_integer(), None);
        assert_eq!(
            RespValue::BulkString(Some("x".into())).into_bulk(),
            Ok(Some("x".to_string()))
        );
        assert_eq!(
            RespValue::Integer(1).into_bulk(),
            Err(RespValue::Integer(1))
        );
    }
}
