use std::io;
use std::net::SocketAddr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid resolver server name {0:?}")]
    InvalidServerName(String),

    #[error("connecting to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to write query: {0}")]
    Write(#[source] io::Error),

    #[error("cannot read response: {0}")]
    Read(#[source] io::Error),

    #[error("connection closed with {buffered} bytes of an incomplete response buffered")]
    Closed { buffered: usize },

    #[error("failed to close connection: {0}")]
    Shutdown(#[source] io::Error),
}
