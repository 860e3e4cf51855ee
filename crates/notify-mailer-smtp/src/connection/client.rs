//! SMTP submission session.
//!
//! A [`Client`] is a plain session object: each method performs one
//! protocol step and returns the server reply, or an error when the reply is
//! not the one the step requires. Sequencing, logging and the decision to
//! abort belong to the caller, which always ends with [`Client::disconnect`].

use super::stream::{SmtpStream, Timeouts, connect};
use super::{ServerInfo, helo_name, verify_hostname};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::ClientConfig;

/// Upper bound on reply lines, so a misbehaving server cannot grow a reply
/// without limit.
const MAX_REPLY_LINES: usize = 512;

/// SMTP client session over one connection.
#[derive(Debug)]
pub struct Client<IO = TcpStream> {
    stream: SmtpStream<IO>,
    server_info: ServerInfo,
    helo: String,
}

impl Client<TcpStream> {
    /// Opens a TCP connection to `hostname:port`.
    ///
    /// The EHLO identity is derived from the local socket address. The
    /// greeting is not read yet; call [`Client::read_greeting`] next.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or times out.
    pub async fn connect(hostname: &str, port: u16, timeouts: Timeouts) -> Result<Self> {
        let stream = connect(hostname, port, timeouts).await?;
        let helo = helo_name(stream.local_ip());
        Ok(Self::new(stream, helo))
    }
}

impl<IO> Client<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a session over an established stream.
    pub fn new(stream: SmtpStream<IO>, helo: impl Into<String>) -> Self {
        Self {
            stream,
            server_info: ServerInfo::default(),
            helo: helo.into(),
        }
    }

    /// Uses `config` for STARTTLS instead of the Mozilla root set.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.stream = self.stream.with_tls_config(config);
        self
    }

    /// EHLO identity this session announces.
    #[must_use]
    pub fn helo(&self) -> &str {
        &self.helo
    }

    /// Capabilities learned so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once STARTTLS has completed.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }

    /// Reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the greeting is not 2xx.
    pub async fn read_greeting(&mut self) -> Result<Reply> {
        let greeting = Self::expect_success(self.read_reply().await?)?;

        self.server_info.hostname = greeting
            .first_line()
            .split_whitespace()
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(greeting)
    }

    /// Sends EHLO and replaces the known capabilities with the reply's.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 2xx.
    pub async fn ehlo(&mut self) -> Result<Reply> {
        let cmd = Command::Ehlo {
            hostname: self.helo.clone(),
        };
        let reply = Self::expect_success(self.send_command(&cmd).await?)?;

        // First line is the server's greeting, the rest are extensions.
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect::<HashSet<_>>();

        Ok(reply)
    }

    /// Requests STARTTLS and performs the TLS handshake against `hostname`.
    ///
    /// Capabilities are cleared; the caller must verify the peer and send
    /// EHLO again before continuing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already encrypted, the server
    /// rejects the command, or the handshake fails.
    pub async fn starttls(&mut self, hostname: &str) -> Result<Reply> {
        if self.stream.is_tls() {
            return Err(Error::InvalidState("TLS already active"));
        }

        let reply = Self::expect_success(self.send_command(&Command::StartTls).await?)?;

        self.stream.upgrade_to_tls(hostname).await?;
        self.server_info.extensions.clear();
        Ok(reply)
    }

    /// Checks the certificate the server presented against `hostname`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not encrypted or the certificate
    /// does not cover `hostname`.
    pub fn verify_peer_hostname(&self, hostname: &str) -> Result<()> {
        if !self.stream.is_tls() {
            return Err(Error::InvalidState("no TLS session to verify"));
        }
        verify_hostname(hostname, self.stream.peer_certificates())
    }

    /// Authenticates with `AUTH PLAIN` and an initial response.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 2xx.
    pub async fn auth_plain(&mut self, username: &str, password: &str) -> Result<Reply> {
        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(encoded),
        };
        Self::expect_success(self.send_command(&cmd).await?)
    }

    /// Starts a mail transaction.
    ///
    /// `BODY=8BITMIME` is added when the server advertises it, and
    /// `SIZE=` when it advertises SIZE and `size` is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 2xx.
    pub async fn mail_from(&mut self, from: &Address, size: Option<usize>) -> Result<Reply> {
        let cmd = Command::MailFrom {
            from: from.clone(),
            body: self.server_info.supports_8bitmime().then_some("8BITMIME"),
            size: size.filter(|_| self.server_info.supports_size()),
        };
        Self::expect_success(self.send_command(&cmd).await?)
    }

    /// Adds a recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 2xx.
    pub async fn rcpt_to(&mut self, to: &Address) -> Result<Reply> {
        let cmd = Command::RcptTo { to: to.clone() };
        Self::expect_success(self.send_command(&cmd).await?)
    }

    /// Opens the data phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 354.
    pub async fn data(&mut self) -> Result<Reply> {
        let reply = self.send_command(&Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(reply)
    }

    /// Streams the message and the terminating `.` line.
    ///
    /// Line endings are normalized to CRLF and lines starting with `.` are
    /// dot-stuffed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the server rejects the message.
    pub async fn send_message(&mut self, message: &[u8]) -> Result<Reply> {
        self.stream.write_all(&encode_data(message)).await?;
        Self::expect_success(self.read_reply().await?)
    }

    /// Sends QUIT.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is not 2xx.
    pub async fn quit(&mut self) -> Result<Reply> {
        Self::expect_success(self.send_command(&Command::Quit).await?)
    }

    /// Closes the connection, whatever state the session is in.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport could not be shut down cleanly.
    pub async fn disconnect(mut self) -> Result<()> {
        self.stream.shutdown().await
    }

    async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        tracing::debug!(command = cmd.verb(), ">>");
        self.stream.write_all(&cmd.serialize()).await?;
        self.read_reply().await
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.stream.read_line().await?;
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(Error::Protocol("Reply has too many lines".into()));
            }
        }

        let reply = parse_reply(&lines)?;
        tracing::debug!(code = reply.code.as_u16(), "<< {}", reply.first_line());
        Ok(reply)
    }

    fn expect_success(reply: Reply) -> Result<Reply> {
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()))
        }
    }
}

/// Encodes message text for the data phase, including the final `.` line.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);

    let body = message.strip_suffix(b"\n").unwrap_or(message);
    if !message.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::io::{Builder, Mock};

    fn client(mock: Mock) -> Client<Mock> {
        Client::new(SmtpStream::new(mock, Duration::from_secs(30)), "[192.0.2.7]")
    }

    #[test]
    fn data_encoding_normalizes_and_stuffs() {
        assert_eq!(encode_data(b"A: b\r\n\r\n"), b"A: b\r\n\r\n.\r\n");
        assert_eq!(encode_data(b"one\ntwo"), b"one\r\ntwo\r\n.\r\n");
        assert_eq!(encode_data(b".hidden\r\n"), b"..hidden\r\n.\r\n");
        assert_eq!(encode_data(b""), b".\r\n");
    }

    #[tokio::test]
    async fn greeting_records_server_name() {
        let mut client = client(Builder::new().read(b"220 mx.example.net ESMTP\r\n").build());
        let reply = client.read_greeting().await.unwrap();
        assert_eq!(reply.code, ReplyCode::SERVICE_READY);
        assert_eq!(client.server_info().hostname, "mx.example.net");
    }

    #[tokio::test]
    async fn negative_greeting_fails() {
        let mut client = client(Builder::new().read(b"554 go away\r\n").build());
        let err = client.read_greeting().await.unwrap_err();
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn ehlo_uses_address_literal_and_parses_extensions() {
        let mock = Builder::new()
            .write(b"EHLO [192.0.2.7]\r\n")
            .read(b"250-mx.example.net\r\n250-STARTTLS\r\n250-8BITMIME\r\n250 SIZE 1000\r\n")
            .build();
        let mut client = client(mock);
        client.ehlo().await.unwrap();
        assert!(client.server_info().supports_starttls());
        assert!(client.server_info().supports_8bitmime());
        assert_eq!(client.server_info().max_message_size(), Some(1000));
    }

    #[tokio::test]
    async fn rejected_starttls_keeps_plaintext() {
        let mock = Builder::new()
            .write(b"STARTTLS\r\n")
            .read(b"454 TLS not available\r\n")
            .build();
        let mut client = client(mock);
        let err = client.starttls("mx.example.net").await.unwrap_err();
        assert!(err.is_transient());
        assert!(!client.is_tls());
        assert!(matches!(
            client.verify_peer_hostname("mx.example.net"),
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn auth_plain_sends_initial_response() {
        let mock = Builder::new()
            .write(b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n")
            .read(b"235 2.7.0 Accepted\r\n")
            .build();
        let reply = client(mock).auth_plain("user", "pass").await.unwrap();
        assert_eq!(reply.code, ReplyCode::AUTH_SUCCEEDED);
    }

    #[tokio::test]
    async fn mail_from_adds_advertised_parameters() {
        let mock = Builder::new()
            .write(b"EHLO [192.0.2.7]\r\n")
            .read(b"250-mx.example.net\r\n250-8BITMIME\r\n250 SIZE\r\n")
            .write(b"MAIL FROM:<phone@example.com> BODY=8BITMIME SIZE=300\r\n")
            .read(b"250 OK\r\n")
            .build();
        let mut client = client(mock);
        client.ehlo().await.unwrap();
        let from = Address::new("phone@example.com").unwrap();
        client.mail_from(&from, Some(300)).await.unwrap();
    }

    #[tokio::test]
    async fn mail_from_without_extensions_is_bare() {
        let mock = Builder::new()
            .write(b"MAIL FROM:<phone@example.com>\r\n")
            .read(b"250 OK\r\n")
            .build();
        let from = Address::new("phone@example.com").unwrap();
        client(mock).mail_from(&from, Some(300)).await.unwrap();
    }

    #[tokio::test]
    async fn data_requires_354() {
        let mock = Builder::new()
            .write(b"DATA\r\n")
            .read(b"250 OK\r\n")
            .build();
        let err = client(mock).data().await.unwrap_err();
        assert!(matches!(err, Error::SmtpError { code: 250, .. }));
    }

    #[tokio::test]
    async fn message_is_terminated_and_acknowledged() {
        let mock = Builder::new()
            .write(b"DATA\r\n")
            .read(b"354 End data with <CR><LF>.<CR><LF>\r\n")
            .write(b"Subject: hi\r\n\r\n.\r\n")
            .read(b"250 2.0.0 queued as 1234\r\n")
            .build();
        let mut client = client(mock);
        client.data().await.unwrap();
        let reply = client.send_message(b"Subject: hi\r\n\r\n").await.unwrap();
        assert_eq!(reply.first_line(), "2.0.0 queued as 1234");
    }

    #[tokio::test]
    async fn quit_and_disconnect() {
        let mock = Builder::new()
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();
        let mut client = client(mock);
        assert_eq!(client.quit().await.unwrap().code, ReplyCode::CLOSING);
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn truncated_reply_is_a_protocol_error() {
        let mock = Builder::new()
            .write(b"QUIT\r\n")
            .read(b"221-still talking\r\n")
            .build();
        let err = client(mock).quit().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
