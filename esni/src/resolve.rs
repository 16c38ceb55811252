use crate::error::{Error, KeyError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dns::RecordData;
use domain_name_query_types::NameQuery;
use std::net::Ipv4Addr;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;
use transport::{DotConnection, DotConnector, TlsConnection};

/// Raw ESNI key bytes and, when asked for, the host's IPv4 address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub keys: Vec<u8>,
    pub ipv4: Option<Ipv4Addr>,
}

/// The TXT (and optional A) exchange for one host, with the TXT query
/// already encoded.
#[derive(Debug)]
pub struct Lookup {
    host: String,
    txt_query: NameQuery,
    txt_request: Vec<u8>,
}

impl Lookup {
    pub fn new(host: &str) -> Result<Self> {
        let host = host.trim_end_matches('.').to_string();
        let txt_query = NameQuery::esni_keys(&host);
        let txt_request = encode(&txt_query)?;

        Ok(Self {
            host,
            txt_query,
            txt_request,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Runs the exchanges in order over `conn`. The A query is only sent
    /// after the TXT response has been fully decoded.
    pub async fn run<S>(&self, conn: &mut DotConnection<S>, with_ipv4: bool) -> Result<Resolution>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let keys = self.fetch_keys(conn).await?;

        let ipv4 = if with_ipv4 {
            Some(lookup_ipv4(conn, &self.host).await?)
        } else {
            None
        };

        Ok(Resolution { keys, ipv4 })
    }

    /// The TXT exchange alone: returns the base64-decoded key bytes.
    pub async fn fetch_keys<S>(&self, conn: &mut DotConnection<S>) -> Result<Vec<u8>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let txt = match exchange(conn, &self.txt_query, &self.txt_request).await? {
            RecordData::Txt(txt) => txt,
            other => return Err(unexpected(&self.txt_query, other)),
        };
        let keys = STANDARD
            .decode(txt.as_bytes())
            .map_err(|e| Error::KeyFormat {
                host: self.host.clone(),
                source: KeyError::Base64(e),
            })?;
        debug!(host = %self.host, keys_len = keys.len(), "ESNI keys retrieved");

        Ok(keys)
    }
}

/// Sends one A query for `host` over `conn`.
pub async fn lookup_ipv4<S>(conn: &mut DotConnection<S>, host: &str) -> Result<Ipv4Addr>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let query = NameQuery::a_record(host);
    let request = encode(&query)?;

    match exchange(conn, &query, &request).await? {
        RecordData::A(addr) => {
            debug!(host = %host, %addr, "IPv4 address resolved");
            Ok(addr)
        }
        other => Err(unexpected(&query, other)),
    }
}

fn encode(query: &NameQuery) -> Result<Vec<u8>> {
    dns::encode_query(query).map_err(|source| Error::Encoding {
        query: query.clone(),
        source,
    })
}

async fn exchange<S>(
    conn: &mut DotConnection<S>,
    query: &NameQuery,
    request: &[u8],
) -> Result<RecordData>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = conn
        .query(request)
        .await
        .map_err(|source| Error::Transport {
            query: query.clone(),
            source,
        })?;

    dns::decode_answer(&response, query).map_err(|e| Error::from_decode(query, e))
}

fn unexpected(query: &NameQuery, data: RecordData) -> Error {
    Error::Protocol {
        query: query.clone(),
        source: dns::Error::Malformed(format!("unexpected record data {:?}", data)),
    }
}

/// Resolves ESNI keys against one DoT resolver, opening a fresh connection
/// per call.
pub struct EsniResolver {
    connector: DotConnector,
}

impl EsniResolver {
    pub fn new(connector: DotConnector) -> Self {
        Self { connector }
    }

    pub async fn resolve(&self, host: &str, with_ipv4: bool) -> Result<Resolution> {
        let lookup = Lookup::new(host)?;

        let mut conn = self.connect(&lookup).await?;
        let result = lookup.run(&mut conn, with_ipv4).await;
        close(conn).await;

        result
    }

    /// Keys then address over one connection. A failed A exchange is
    /// returned alongside the keys instead of discarding them.
    pub async fn resolve_keys_and_ipv4(&self, host: &str) -> Result<(Vec<u8>, Result<Ipv4Addr>)> {
        let lookup = Lookup::new(host)?;

        let mut conn = self.connect(&lookup).await?;
        let result = match lookup.fetch_keys(&mut conn).await {
            Ok(keys) => Ok((keys, lookup_ipv4(&mut conn, lookup.host()).await)),
            Err(e) => Err(e),
        };
        close(conn).await;

        result
    }

    /// Plain A lookup, used when ESNI is optional and the keys are unusable.
    pub async fn resolve_ipv4(&self, host: &str) -> Result<Ipv4Addr> {
        let mut conn = self.connector.connect().await.map_err(Error::Connection)?;

        let result = lookup_ipv4(&mut conn, host.trim_end_matches('.')).await;
        close(conn).await;

        result
    }

    async fn connect(&self, lookup: &Lookup) -> Result<TlsConnection> {
        let conn = self.connector.connect().await.map_err(Error::Connection)?;
        debug!(server = %self.connector.addr(), host = %lookup.host(), "resolving ESNI keys");
        Ok(conn)
    }
}

async fn close(conn: TlsConnection) {
    if let Err(e) = conn.close().await {
        debug!("closing resolver connection: {}", e);
    }
}
