//! Endpoint identity check for the certificate presented after STARTTLS.
//!
//! rustls already rejects a handshake whose certificate does not name the
//! requested server. The session client repeats that check explicitly on
//! the leaf certificate once the handshake is done, so endpoint identity
//! never depends on how a particular verifier was configured.

use crate::error::{Error, Result};
use rustls::pki_types::{CertificateDer, ServerName};

/// Verifies that the leaf of `certificates` is valid for `hostname`.
///
/// # Errors
///
/// Returns [`Error::InvalidHostname`] if `hostname` is not a DNS name or IP
/// address, [`Error::NoPeerCertificate`] if no certificate was presented,
/// and [`Error::HostnameMismatch`] if the certificate cannot be parsed or
/// does not cover `hostname`.
pub fn verify_hostname(hostname: &str, certificates: Option<&[CertificateDer<'_>]>) -> Result<()> {
    let server_name =
        ServerName::try_from(hostname).map_err(|_| Error::InvalidHostname(hostname.to_string()))?;

    let leaf = certificates
        .and_then(<[CertificateDer<'_>]>::first)
        .ok_or(Error::NoPeerCertificate)?;

    let mismatch = |reason: webpki::Error| Error::HostnameMismatch {
        host: hostname.to_string(),
        reason: format!("{reason:?}"),
    };

    webpki::EndEntityCert::try_from(leaf)
        .map_err(mismatch)?
        .verify_is_valid_for_subject_name(&server_name)
        .map_err(mismatch)
}
