use crate::error::{Error, ErrorKind, Result};
use crate::keys::EsniKeys;
use crate::resolve::EsniResolver;
use configuration::EsniMode;
use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Everything a TLS client needs to open an ESNI connection to one host.
#[derive(Debug)]
pub struct EsniClientConfig {
    pub server_name: ServerName<'static>,
    /// `None` only when ESNI is optional and the keys could not be used.
    pub esni_keys: Option<EsniKeys>,
    pub tls: Arc<ClientConfig>,
}

pub struct ClientConfigBuilder {
    resolver: EsniResolver,
    tls: Arc<ClientConfig>,
    mode: EsniMode,
}

impl ClientConfigBuilder {
    pub fn new(resolver: EsniResolver, tls: Arc<ClientConfig>) -> Self {
        Self {
            resolver,
            tls,
            mode: EsniMode::default(),
        }
    }

    pub fn mode(mut self, mode: EsniMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolves keys and address for `host` and binds them into a config.
    pub async fn build(&self, host: &str) -> Result<(EsniClientConfig, Option<Ipv4Addr>)> {
        let host = host.trim_end_matches('.');
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| Error::InvalidHostname(host.to_string()))?;

        let optional = self.mode == EsniMode::Optional;

        let (raw_keys, ipv4) = match self.resolver.resolve_keys_and_ipv4(host).await {
            Ok(found) => found,
            Err(e) if optional && e.kind() != ErrorKind::Encoding => {
                warn!(host = %host, "ESNI unavailable, continuing without it: {}", e);

                let ipv4 = match self.resolver.resolve_ipv4(host).await {
                    Ok(addr) => Some(addr),
                    Err(e) => {
                        warn!(host = %host, "IPv4 lookup failed: {}", e);
                        None
                    }
                };
                return Ok((self.config(server_name, None), ipv4));
            }
            Err(e) => return Err(e),
        };

        let ipv4 = match ipv4 {
            Ok(addr) => Some(addr),
            Err(e) if optional => {
                warn!(host = %host, "IPv4 lookup failed: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let keys = match parse_keys(host, &raw_keys) {
            Ok(keys) => Some(keys),
            Err(e) if optional => {
                warn!(host = %host, "ESNI unavailable, continuing without it: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok((self.config(server_name, keys), ipv4))
    }

    fn config(
        &self,
        server_name: ServerName<'static>,
        esni_keys: Option<EsniKeys>,
    ) -> EsniClientConfig {
        EsniClientConfig {
            server_name,
            esni_keys,
            tls: self.tls.clone(),
        }
    }
}

fn parse_keys(host: &str, raw: &[u8]) -> Result<EsniKeys> {
    let keys = EsniKeys::parse(raw).map_err(|source| Error::KeyFormat {
        host: host.to_string(),
        source,
    })?;
    if !keys.is_valid_at(unix_now()) {
        warn!(
            host = %host,
            not_before = keys.not_before,
            not_after = keys.not_after,
            "ESNI keys outside their validity window"
        );
    }

    Ok(keys)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
