//! One-shot connection executor
//!
//! Each call to [`Executor::execute`] opens a fresh TCP (or TLS) connection,
//! writes `AUTH`/`SELECT`/target in a single pipelined burst, reads until the
//! target reply is parsed and closes the connection again.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::debug;

use super::{encode_command_into, parse, ConnectionConfig, RedisError, RespValue};

const READ_CHUNK: usize = 8 * 1024;

/// Runs single commands against the endpoint described by a [`ConnectionConfig`]
#[derive(Clone)]
pub struct Executor {
    config: Arc<ConnectionConfig>,
    tls: Option<(TlsConnector, ServerName<'static>)>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

impl Executor {
    /// Create an executor
    ///
    /// `tls_config` is only consulted for `rediss://` endpoints; when it is
    /// `None` a client config trusting the webpki root bundle is used.
    pub fn new(
        config: ConnectionConfig,
        tls_config: Option<Arc<ClientConfig>>,
    ) -> Result<Self, RedisError> {
        let tls = if config.tls {
            let server_name = ServerName::try_from(config.host.clone())
                .map_err(|_| RedisError::InvalidDnsName(config.host.clone()))?;
            let connector = TlsConnector::from(tls_config.unwrap_or_else(default_tls_config));
            Some((connector, server_name))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            tls,
        })
    }

    /// The resolved connection config
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Execute `command` and return its reply
    ///
    /// Setup replies (`AUTH`, `SELECT`) are discarded, but an error reply to
    /// any of them fails the call.
    pub async fn execute<S: AsRef<str>>(&self, command: &[S]) -> Result<RespValue, RedisError> {
        let mut request = Vec::new();
        let mut replies = 1;

        if let Some(password) = &self.config.password {
            encode_command_into(&mut request, &["AUTH", password.as_str()]);
            replies += 1;
        }
        if self.config.db != 0 {
            let db = self.config.db.to_string();
            encode_command_into(&mut request, &["SELECT", db.as_str()]);
            replies += 1;
        }
        encode_command_into(&mut request, command);

        let name: &str = command.first().map(|c| c.as_ref()).unwrap_or("");
        debug!(
            command = name,
            host = %self.config.host,
            port = self.config.port,
            pipelined = replies,
            "executing redis command"
        );

        let mut stream = self.connect().await?;
        let result = exchange(&mut stream, &request, replies).await;

        if let Err(e) = stream.shutdown().await {
            debug!("redis connection shutdown failed: {}", e);
        }
        result
    }

    async fn connect(&self) -> Result<MaybeTlsStream, RedisError> {
        let tcp = TcpStream::connect(self.config.address()).await?;
        tcp.set_nodelay(true)?;

        match &self.tls {
            None => Ok(MaybeTlsStream::Plain(tcp)),
            Some((connector, server_name)) => {
                let stream = connector.connect(server_name.clone(), tcp).await?;
                Ok(MaybeTlsStream::Tls(Box::new(stream)))
            }
        }
    }
}

/// Write a pipelined `request` and return the `replies`-th reply
///
/// `replies` is the number of commands encoded in `request` and must be at
/// least one. Replies before the last are parsed and dropped; a parse failure
/// or server error reply on any of them is returned immediately.
pub async fn exchange<S>(
    stream: &mut S,
    request: &[u8],
    replies: usize,
) -> Result<RespValue, RedisError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug_assert!(replies > 0);

    stream.write_all(request).await?;
    stream.flush().await?;

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let mut cursor = 0;
    let mut received = 0;

    loop {
        while let Some((value, next)) = parse(&buf, cursor)? {
            cursor = next;
            received += 1;
            if received == replies {
                return Ok(value);
            }
        }

        buf.reserve(READ_CHUNK);
        if stream.read_buf(&mut buf).await? == 0 {
            return Err(RedisError::ConnectionClosed);
        }
    }
}

fn default_tls_config() -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

enum MaybeTlsStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_flush(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}
