//! DNS-over-TLS transport (RFC 7858).

mod connection;
mod connector;
mod error;
mod framing;
mod keylog;

pub use connection::DotConnection;
pub use connector::{client_config, DotConnector, TlsConnection};
pub use error::{Error, Result};
pub use framing::FrameBuffer;
pub use keylog::{KeyLogSink, KEYLOG_ENV};
