use domain_name_query_types::NameQuery;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`], one per failure phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Encoding,
    Connection,
    Transport,
    Protocol,
    NotFound,
    KeyFormat,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("building DNS query {query} failed: {source}")]
    Encoding {
        query: NameQuery,
        #[source]
        source: dns::Error,
    },

    #[error("invalid hostname {0:?}")]
    InvalidHostname(String),

    #[error("connecting to resolver failed: {0}")]
    Connection(#[source] transport::Error),

    #[error("exchanging {query} with resolver failed: {source}")]
    Transport {
        query: NameQuery,
        #[source]
        source: transport::Error,
    },

    #[error("cannot process {query} response: {source}")]
    Protocol {
        query: NameQuery,
        #[source]
        source: dns::Error,
    },

    #[error("no {} record for {}", .query.q_type, .query.name)]
    NotFound { query: NameQuery },

    #[error("bad ESNI keys for {host}: {source}")]
    KeyFormat {
        host: String,
        #[source]
        source: KeyError,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Encoding { .. } | Error::InvalidHostname(_) => ErrorKind::Encoding,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::KeyFormat { .. } => ErrorKind::KeyFormat,
        }
    }

    /// Splits a response decoding failure into not-found and protocol errors.
    pub(crate) fn from_decode(query: &NameQuery, source: dns::Error) -> Self {
        if source.is_not_found() {
            Error::NotFound {
                query: query.clone(),
            }
        } else {
            Error::Protocol {
                query: query.clone(),
                source,
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("TXT payload is not base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("truncated ESNIKeys: {0}")]
    Truncated(#[from] std::io::Error),

    #[error("unsupported ESNIKeys version {0:#06x}")]
    UnsupportedVersion(u16),

    #[error("ESNIKeys checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid ESNIKeys: {0}")]
    Invalid(&'static str),
}
