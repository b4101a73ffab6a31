//! Connection string resolution

use std::fmt;
use std::str::FromStr;

use super::RedisError;

const DEFAULT_PORT: u16 = 6379;

/// Endpoint and setup parameters resolved from a `redis[s]://` URL
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Host name or IP address (IPv6 without brackets)
    pub host: String,
    /// TCP port, 6379 unless the URL says otherwise
    pub port: u16,
    /// Password sent with `AUTH`, percent-decoded
    pub password: Option<String>,
    /// Logical database sent with `SELECT` when non-zero
    pub db: u32,
    /// `rediss://` endpoints are wrapped in TLS
    pub tls: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .field("tls", &self.tls)
            .finish()
    }
}

impl ConnectionConfig {
    /// Parse `redis[s]://[:password@]host[:port][/db]`
    ///
    /// Query strings and fragments are accepted and ignored. A user name in the
    /// user-info section is ignored; only the password is used.
    pub fn from_url(url: &str) -> Result<Self, RedisError> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| RedisError::InvalidUrl(url.to_string()))?;

        let tls = match scheme.to_ascii_lowercase().as_str() {
            "redis" => false,
            "rediss" => true,
            _ => return Err(RedisError::UnsupportedScheme(scheme.to_string())),
        };

        // Drop query and fragment
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };

        let (userinfo, host_port) = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => (Some(userinfo), host_port),
            None => (None, authority),
        };

        let password = match userinfo.and_then(|u| u.split_once(':')) {
            Some((_, raw)) if !raw.is_empty() => Some(
                urlencoding::decode(raw)
                    .map_err(|_| RedisError::InvalidUrl("password is not valid UTF-8".to_string()))?
                    .into_owned(),
            ),
            _ => None,
        };

        let (host, port) = split_host_port(host_port)?;
        if host.is_empty() {
            return Err(RedisError::MissingHost);
        }

        let db = if path.is_empty() {
            0
        } else {
            path.parse()
                .map_err(|_| RedisError::InvalidDatabase(path.to_string()))?
        };

        Ok(Self {
            host: host.to_string(),
            port,
            password,
            db,
            tls,
        })
    }

    /// `(host, port)` pair for `TcpStream::connect`
    pub fn address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl FromStr for ConnectionConfig {
    type Err = RedisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_url(s)
    }
}

fn split_host_port(host_port: &str) -> Result<(&str, u16), RedisError> {
    // [::1]:6380
    if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| RedisError::InvalidUrl(host_port.to_string()))?;
        let port = match after.strip_prefix(':') {
            Some(port) => parse_port(port)?,
            None if after.is_empty() => DEFAULT_PORT,
            None => return Err(RedisError::InvalidUrl(host_port.to_string())),
        };
        return Ok((host, port));
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) => Ok((host, parse_port(port)?)),
        None => Ok((host_port, DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, RedisError> {
    if port.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    port.parse()
        .map_err(|_| RedisError::InvalidPort(port.to_string()))
}
