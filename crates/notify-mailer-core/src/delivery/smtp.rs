//! SMTP delivery sequence.
//!
//! One attempt runs: greeting, EHLO, STARTTLS, hostname check, EHLO, AUTH
//! PLAIN, MAIL FROM, RCPT TO for each recipient, DATA, QUIT. The first
//! failing step aborts the attempt. The connection is always closed
//! afterwards, and a failed QUIT does not fail a message the server has
//! already accepted.

use super::task::DeliveryTask;
use crate::config::ConfigSnapshot;
use crate::error::Result;
use crate::message::MessageComposer;
use notify_mailer_smtp::rustls::ClientConfig;
use notify_mailer_smtp::{Address, Client, Reply, Timeouts};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{error, info, warn};

/// Sends one delivery task.
pub trait Mailer: Send + Sync {
    /// Makes one delivery attempt.
    fn send(&self, task: &DeliveryTask) -> impl Future<Output = Result<()>> + Send;
}

/// Mailer that submits over SMTP with STARTTLS.
#[derive(Debug, Clone, Default)]
pub struct SmtpMailer {
    timeouts: Timeouts,
    tls_config: Option<Arc<ClientConfig>>,
}

impl SmtpMailer {
    /// Creates a mailer with custom timeouts.
    #[must_use]
    pub const fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            tls_config: None,
        }
    }

    /// Trusts the roots in `config` for STARTTLS instead of the Mozilla set.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, task: &DeliveryTask) -> Result<()> {
        let config = task.config();
        let message = MessageComposer::new(config.device.clone()).compose(
            task.subject(),
            task.event_time(),
            &config.sender,
            &config.recipients,
        )?;

        let mut client = match Client::<TcpStream>::connect(&config.host, config.port, self.timeouts).await {
            Ok(client) => client,
            Err(e) => {
                error!(step = "CONNECT", host = %config.host, port = config.port, "{e}");
                return Err(e.into());
            }
        };
        if let Some(tls) = &self.tls_config {
            client = client.with_tls_config(Arc::clone(tls));
        }

        deliver(client, config, &message).await
    }
}

/// Runs the session on a connected client and always disconnects.
///
/// # Errors
///
/// Returns the error of the first step that failed.
pub async fn deliver<IO>(mut client: Client<IO>, config: &ConfigSnapshot, message: &str) -> Result<()>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let outcome = transact(&mut client, config, message).await;

    if let Err(e) = client.disconnect().await {
        error!(step = "DISCONNECT", "{e}");
    }

    outcome
}

async fn transact<IO>(client: &mut Client<IO>, config: &ConfigSnapshot, message: &str) -> Result<()>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let sender = logged_parse("MAIL", &config.sender)?;
    let recipients = config
        .recipients
        .iter()
        .map(|r| logged_parse("RCPT", r))
        .collect::<Result<Vec<_>>>()?;

    logged("CONNECT", client.read_greeting().await)?;
    logged("EHLO", client.ehlo().await)?;
    logged("STARTTLS", client.starttls(&config.host).await)?;

    if let Err(e) = client.verify_peer_hostname(&config.host) {
        error!(step = "VERIFY", host = %config.host, "{e}");
        return Err(e.into());
    }
    info!(step = "VERIFY", host = %config.host, "Certificate matches host");

    logged("EHLO", client.ehlo().await)?;
    logged("AUTH", client.auth_plain(&config.username, &config.password).await)?;
    logged("MAIL", client.mail_from(&sender, Some(message.len())).await)?;
    for recipient in &recipients {
        logged("RCPT", client.rcpt_to(recipient).await)?;
    }
    logged("DATA", client.data().await)?;
    logged("DATA", client.send_message(message.as_bytes()).await)?;

    match client.quit().await {
        Ok(reply) => info!(step = "QUIT", code = reply.code.as_u16(), "{}", reply.first_line()),
        Err(e) => warn!(step = "QUIT", "{e}"),
    }

    Ok(())
}

fn logged(step: &'static str, result: notify_mailer_smtp::Result<Reply>) -> Result<Reply> {
    match result {
        Ok(reply) => {
            info!(step, code = reply.code.as_u16(), "{}", reply.first_line());
            Ok(reply)
        }
        Err(e) => {
            error!(step, "{e}");
            Err(e.into())
        }
    }
}

fn logged_parse(step: &'static str, address: &str) -> Result<Address> {
    Address::new(address).map_err(|e| {
        error!(step, "{e}");
        e.into()
    })
}
