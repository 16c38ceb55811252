use crate::connection::DotConnection;
use crate::error::{Error, Result};
use configuration::ResolverConfig;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, KeyLog, RootCertStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

pub type TlsConnection = DotConnection<TlsStream<TcpStream>>;

/// Client config trusting the webpki roots, with an optional key log sink.
pub fn client_config(key_log: Option<Arc<dyn KeyLog>>) -> ClientConfig {
    let root_store: RootCertStore = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let mut config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    if let Some(key_log) = key_log {
        config.key_log = key_log;
    }

    config
}

/// Dials DNS-over-TLS connections to a single resolver.
pub struct DotConnector {
    addr: SocketAddr,
    server_name: ServerName<'static>,
    tls: TlsConnector,
}

impl DotConnector {
    pub fn new(resolver: &ResolverConfig, key_log: Option<Arc<dyn KeyLog>>) -> Result<Self> {
        Self::with_client_config(resolver, Arc::new(client_config(key_log)))
    }

    pub fn with_client_config(
        resolver: &ResolverConfig,
        config: Arc<ClientConfig>,
    ) -> Result<Self> {
        let name = resolver.server_name();
        let server_name =
            ServerName::try_from(name.clone()).map_err(|_| Error::InvalidServerName(name))?;

        Ok(Self {
            addr: resolver.address,
            server_name,
            tls: TlsConnector::from(config),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// TCP connect followed by the TLS handshake.
    pub async fn connect(&self) -> Result<TlsConnection> {
        let addr = self.addr;

        let tcp = TcpStream::connect(addr)
            .await
            .map_err(|source| Error::Connect { addr, source })?;
        tcp.set_nodelay(true)
            .map_err(|source| Error::Connect { addr, source })?;

        let stream = self
            .tls
            .connect(self.server_name.clone(), tcp)
            .await
            .map_err(|source| Error::Handshake { addr, source })?;

        debug!(server = %addr, server_name = ?self.server_name, "TLS connection established");
        Ok(DotConnection::new(stream))
    }
}
