//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::{CertificateDer, ServerName};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

/// Deadlines applied to connection setup and to every read or write after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP connect deadline.
    pub connect: Duration,
    /// Deadline for each read, write and the TLS handshake.
    pub io: Duration,
}

impl Timeouts {
    /// Same deadline for connect and I/O.
    #[must_use]
    pub const fn uniform(limit: Duration) -> Self {
        Self {
            connect: limit,
            io: limit,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(30))
    }
}

enum Transport<IO> {
    Plain(BufReader<IO>),
    Tls(Box<BufReader<TlsStream<IO>>>),
    Closed,
}

/// SMTP stream, plaintext until upgraded in place by STARTTLS.
pub struct SmtpStream<IO = TcpStream> {
    transport: Transport<IO>,
    io_timeout: Duration,
    tls_config: Option<Arc<ClientConfig>>,
}

impl<IO> fmt::Debug for SmtpStream<IO> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.transport {
            Transport::Plain(_) => "plain",
            Transport::Tls(_) => "tls",
            Transport::Closed => "closed",
        };
        f.debug_struct("SmtpStream")
            .field("transport", &state)
            .field("io_timeout", &self.io_timeout)
            .field("custom_tls_config", &self.tls_config.is_some())
            .finish()
    }
}

impl<IO> SmtpStream<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an established plaintext connection.
    pub fn new(io: IO, io_timeout: Duration) -> Self {
        Self {
            transport: Transport::Plain(BufReader::new(io)),
            io_timeout,
            tls_config: None,
        }
    }

    /// Uses `config` for the STARTTLS handshake instead of the Mozilla
    /// root set.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Returns true once STARTTLS has completed.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self.transport, Transport::Tls(_))
    }

    /// Reads one line, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails, times out, or the server closed
    /// the connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match &mut self.transport {
            Transport::Plain(reader) => {
                within(self.io_timeout, "reading reply", reader.read_line(&mut line)).await?
            }
            Transport::Tls(reader) => {
                within(self.io_timeout, "reading reply", reader.read_line(&mut line)).await?
            }
            Transport::Closed => return Err(Error::InvalidState("connection closed")),
        };

        if read == 0 {
            return Err(Error::Protocol("Connection closed by server".into()));
        }
        Ok(line.trim_end().to_string())
    }

    /// Writes and flushes data.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let limit = self.io_timeout;
        match &mut self.transport {
            Transport::Plain(reader) => {
                let io = reader.get_mut();
                within(limit, "writing command", async {
                    io.write_all(data).await?;
                    io.flush().await
                })
                .await
            }
            Transport::Tls(reader) => {
                let io = reader.get_mut();
                within(limit, "writing command", async {
                    io.write_all(data).await?;
                    io.flush().await
                })
                .await
            }
            Transport::Closed => Err(Error::InvalidState("connection closed")),
        }
    }

    /// Upgrades the plaintext connection to TLS, verifying `hostname`.
    ///
    /// Bytes the server sent ahead of the handshake are treated as an
    /// injection attempt and abort the upgrade.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not plaintext, the hostname is
    /// invalid, or the handshake fails or times out.
    pub async fn upgrade_to_tls(&mut self, hostname: &str) -> Result<()> {
        let reader = match std::mem::replace(&mut self.transport, Transport::Closed) {
            Transport::Plain(reader) => reader,
            other => {
                self.transport = other;
                return Err(Error::InvalidState("STARTTLS requires a plaintext connection"));
            }
        };

        if !reader.buffer().is_empty() {
            return Err(Error::Protocol(
                "Server sent data before the TLS handshake".into(),
            ));
        }

        let server_name = ServerName::try_from(hostname.to_string())
            .map_err(|_| Error::InvalidHostname(hostname.to_string()))?;

        let config = self.tls_config.clone().unwrap_or_else(default_tls_config);
        let tls_stream = tokio::time::timeout(
            self.io_timeout,
            TlsConnector::from(config).connect(server_name, reader.into_inner()),
        )
        .await
        .map_err(|_| Error::Timeout("negotiating TLS"))?
        .map_err(handshake_error)?;

        self.transport = Transport::Tls(Box::new(BufReader::new(tls_stream)));
        Ok(())
    }

    /// Certificates presented by the server, leaf first.
    #[must_use]
    pub fn peer_certificates(&self) -> Option<&[CertificateDer<'static>]> {
        match &self.transport {
            Transport::Tls(reader) => reader.get_ref().get_ref().1.peer_certificates(),
            Transport::Plain(_) | Transport::Closed => None,
        }
    }

    /// Shuts the connection down. Later reads and writes fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails or times out.
    pub async fn shutdown(&mut self) -> Result<()> {
        let limit = self.io_timeout;
        match std::mem::replace(&mut self.transport, Transport::Closed) {
            Transport::Plain(mut reader) => {
                within(limit, "closing connection", reader.get_mut().shutdown()).await
            }
            Transport::Tls(mut reader) => {
                within(limit, "closing connection", reader.get_mut().shutdown()).await
            }
            Transport::Closed => Ok(()),
        }
    }
}

impl SmtpStream<TcpStream> {
    /// Local address of the underlying socket, if still known.
    #[must_use]
    pub fn local_ip(&self) -> Option<IpAddr> {
        let tcp = match &self.transport {
            Transport::Plain(reader) => reader.get_ref(),
            Transport::Tls(reader) => reader.get_ref().get_ref().0,
            Transport::Closed => return None,
        };
        tcp.local_addr().ok().map(|addr| addr.ip())
    }
}

/// Connects to an SMTP server over plain TCP, ready for STARTTLS.
///
/// # Errors
///
/// Returns an error if the connection fails or exceeds the connect timeout.
pub async fn connect(hostname: &str, port: u16, timeouts: Timeouts) -> Result<SmtpStream> {
    let stream = within(
        timeouts.connect,
        "connecting",
        TcpStream::connect((hostname, port)),
    )
    .await?;
    Ok(SmtpStream::new(stream, timeouts.io))
}

async fn within<T>(
    limit: Duration,
    what: &'static str,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(what))?
        .map_err(Error::from)
}

/// Client configuration trusting the Mozilla root set.
fn default_tls_config() -> Arc<ClientConfig> {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    )
}

/// tokio-rustls reports TLS failures as I/O errors wrapping a rustls error.
fn handshake_error(err: io::Error) -> Error {
    match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        Some(tls) => Error::Tls(tls.clone()),
        None => Error::Io(err),
    }
}
