//! Envelope header parsing.
//!
//! A Sentry envelope is newline-delimited: the first line is a JSON header,
//! everything after it is a sequence of items we never look at.

use serde::Deserialize;
use thiserror::Error;

/// Reasons an envelope cannot be routed.
///
/// The `Display` text is sent back to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// No header line, or the header line is not a JSON object.
    #[error("invalid envelope format")]
    InvalidFormat,
    /// Header decoded but carries no DSN.
    #[error("missing DSN in envelope header")]
    MissingDsn,
    /// DSN present but has no trailing project segment.
    #[error("invalid DSN format")]
    InvalidDsn,
}

/// The envelope header line. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(default)]
    pub dsn: Option<String>,
}

/// Extract the project id from a raw envelope body.
pub fn parse_project_id(body: &[u8]) -> Result<String, EnvelopeError> {
    let newline = body
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(EnvelopeError::InvalidFormat)?;

    // A `null` header decodes to no header at all, which has no DSN.
    let header: Option<EnvelopeHeader> =
        serde_json::from_slice(&body[..newline]).map_err(|_| EnvelopeError::InvalidFormat)?;

    match header.and_then(|h| h.dsn).as_deref() {
        None | Some("") => Err(EnvelopeError::MissingDsn),
        Some(dsn) => project_id_from_dsn(dsn).map(str::to_owned),
    }
}

/// The project id is whatever follows the last `/` of the DSN.
fn project_id_from_dsn(dsn: &str) -> Result<&str, EnvelopeError> {
    match dsn.rfind('/') {
        Some(idx) if idx + 1 < dsn.len() => Ok(&dsn[idx + 1..]),
        _ => Err(EnvelopeError::InvalidDsn),
    }
}
