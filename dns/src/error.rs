use crate::header::ResponseCode;
use domain_name_query_types::QType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid domain name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    #[error("DNS query failed, rcode={0}")]
    ResponseCode(ResponseCode),

    #[error("truncated message: {0}")]
    Truncated(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("no {0} record found")]
    NotFound(QType),
}

impl Error {
    /// Errors raised while building a query, as opposed to reading a response.
    #[cfg(test)]
    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::InvalidName { .. } | Error::MessageTooLong(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
