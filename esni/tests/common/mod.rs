#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use configuration::ResolverConfig;
use esni::keys::{EsniKeys, KeyShareEntry, ESNI_VERSION};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, KeyLog, RootCertStore, ServerConfig};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

pub const TYPE_A: u16 = 1;
pub const TYPE_CNAME: u16 = 5;
pub const TYPE_TXT: u16 = 16;

pub struct Answer {
    rtype: u16,
    rdata: Vec<u8>,
}

impl Answer {
    pub fn txt(text: &str) -> Self {
        let mut rdata = vec![text.len() as u8];
        rdata.extend_from_slice(text.as_bytes());
        Self {
            rtype: TYPE_TXT,
            rdata,
        }
    }

    pub fn a(octets: [u8; 4]) -> Self {
        Self {
            rtype: TYPE_A,
            rdata: octets.to_vec(),
        }
    }

    pub fn other(rtype: u16, rdata: &[u8]) -> Self {
        Self {
            rtype,
            rdata: rdata.to_vec(),
        }
    }
}

/// What the mock resolver does with the next request it reads.
pub enum Step {
    Respond { rcode: u8, answers: Vec<Answer> },
    /// Read the request, then drop the connection without answering.
    Close,
}

impl Step {
    pub fn answer(answers: Vec<Answer>) -> Self {
        Step::Respond { rcode: 0, answers }
    }

    pub fn rcode(rcode: u8) -> Self {
        Step::Respond {
            rcode,
            answers: vec![],
        }
    }
}

/// A question seen by the mock resolver.
#[derive(Debug, PartialEq)]
pub struct Seen {
    pub name: String,
    pub qtype: u16,
}

/// Echoes the question and appends answers whose owner name points back
/// at it (offset 12).
pub fn response_for(request: &[u8], rcode: u8, answers: &[Answer]) -> Vec<u8> {
    let mut msg = vec![request[0], request[1], 0x81, 0x80 | rcode, 0, 1];
    msg.extend_from_slice(&(answers.len() as u16).to_be_bytes());
    msg.extend_from_slice(&[0, 0, 0, 0]);
    msg.extend_from_slice(&request[12..]);
    for answer in answers {
        msg.extend_from_slice(&[0xc0, 12]);
        msg.extend_from_slice(&answer.rtype.to_be_bytes());
        msg.extend_from_slice(&[0, 1]);
        msg.extend_from_slice(&60u32.to_be_bytes());
        msg.extend_from_slice(&(answer.rdata.len() as u16).to_be_bytes());
        msg.extend_from_slice(&answer.rdata);
    }
    msg
}

fn question_of(request: &[u8]) -> Seen {
    let mut labels = Vec::new();
    let mut pos = 12;
    while request[pos] != 0 {
        let len = request[pos] as usize;
        labels.push(String::from_utf8_lossy(&request[pos + 1..pos + 1 + len]).to_string());
        pos += 1 + len;
    }
    let qtype = u16::from_be_bytes([request[pos + 1], request[pos + 2]]);

    Seen {
        name: format!("{}.", labels.join(".")),
        qtype,
    }
}

/// Plays `script` against one client connection.
pub async fn serve<S>(mut stream: S, script: Vec<Step>) -> io::Result<Vec<Seen>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut seen = Vec::new();

    for step in script {
        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let mut request = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        stream.read_exact(&mut request).await?;
        seen.push(question_of(&request));

        match step {
            Step::Respond { rcode, answers } => {
                let response = response_for(&request, rcode, &answers);
                stream
                    .write_all(&(response.len() as u16).to_be_bytes())
                    .await?;
                stream.write_all(&response).await?;
                stream.flush().await?;
            }
            Step::Close => return Ok(seen),
        }
    }

    Ok(seen)
}

pub fn sample_keys() -> EsniKeys {
    EsniKeys {
        version: ESNI_VERSION,
        checksum: [0; 4],
        keys: vec![KeyShareEntry {
            group: 0x001d,
            key_exchange: vec![7; 32],
        }],
        cipher_suites: vec![0x1301, 0x1303],
        padded_length: 260,
        not_before: 0,
        not_after: u64::MAX,
        extensions: vec![],
    }
}

pub fn sample_keys_base64() -> String {
    STANDARD.encode(sample_keys().to_bytes())
}

/// A DoT resolver on localhost with a self-signed certificate.
pub struct MockDot {
    pub resolver: ResolverConfig,
    roots: RootCertStore,
    pub handle: JoinHandle<Vec<Vec<Seen>>>,
}

impl MockDot {
    /// Serves one connection per script, in accept order.
    pub async fn spawn(connections: Vec<Vec<Step>>) -> Self {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

        let server_config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], key)
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(server_config));

        let mut roots = RootCertStore::empty();
        roots.add(cert.der().clone()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut resolver = ResolverConfig::new(listener.local_addr().unwrap());
        resolver.server_name = Some("localhost".to_string());

        let handle = tokio::spawn(async move {
            let mut all = Vec::new();
            for script in connections {
                let (tcp, _) = listener.accept().await.unwrap();
                let tls = acceptor.accept(tcp).await.unwrap();
                all.push(serve(tls, script).await.unwrap());
            }
            all
        });

        Self {
            resolver,
            roots,
            handle,
        }
    }

    pub fn client_config(&self, key_log: Option<Arc<dyn KeyLog>>) -> Arc<ClientConfig> {
        let mut config = ClientConfig::builder()
            .with_root_certificates(self.roots.clone())
            .with_no_client_auth();
        if let Some(key_log) = key_log {
            config.key_log = key_log;
        }
        Arc::new(config)
    }
}

/// In-memory key log destination.
#[derive(Clone, Default)]
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut *self.0.lock().unwrap(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
