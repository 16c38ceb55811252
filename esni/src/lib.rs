//! ESNI key retrieval over DNS-over-TLS.
//!
//! [`EsniResolver`] fetches the base64 `ESNIKeys` published at
//! `_esni.<host>.` (and optionally the host's A record) over one resolver
//! connection. [`ClientConfigBuilder`] turns the result into an
//! [`EsniClientConfig`] bound to the host.

mod error;
pub mod keys;
mod resolve;
mod tls_config;

pub use configuration::EsniMode;
pub use error::{Error, ErrorKind, KeyError, Result};
pub use keys::EsniKeys;
pub use resolve::{lookup_ipv4, EsniResolver, Lookup, Resolution};
pub use tls_config::{ClientConfigBuilder, EsniClientConfig};
