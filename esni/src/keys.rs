//! `ESNIKeys` as published in `_esni` TXT records (draft-ietf-tls-esni-02).
//!
//! ```text
//! struct {
//!     uint16 version;
//!     uint8 checksum[4];
//!     KeyShareEntry keys<4..2^16-1>;
//!     CipherSuite cipher_suites<2..2^16-2>;
//!     uint16 padded_length;
//!     uint64 not_before;
//!     uint64 not_after;
//!     Extension extensions<0..2^16-1>;
//! } ESNIKeys;
//! ```

use crate::error::KeyError;
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};

pub const ESNI_VERSION: u16 = 0xff01;

const CHECKSUM_OFFSET: usize = 2;
const CHECKSUM_LEN: usize = 4;

type Result<T> = std::result::Result<T, KeyError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyShareEntry {
    pub group: u16,
    pub key_exchange: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Extension {
    pub ext_type: u16,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EsniKeys {
    pub version: u16,
    pub checksum: [u8; CHECKSUM_LEN],
    pub keys: Vec<KeyShareEntry>,
    pub cipher_suites: Vec<u16>,
    pub padded_length: u16,
    pub not_before: u64,
    pub not_after: u64,
    pub extensions: Vec<Extension>,
}

impl EsniKeys {
    /// Parses and checksum-verifies raw `ESNIKeys` bytes. The result always
    /// holds at least one key share and one cipher suite.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut rdr = Cursor::new(bytes);

        let version = rdr.read_u16::<BE>()?;
        if version != ESNI_VERSION {
            return Err(KeyError::UnsupportedVersion(version));
        }

        let mut checksum = [0u8; CHECKSUM_LEN];
        rdr.read_exact(&mut checksum)?;
        if checksum != compute_checksum(bytes) {
            return Err(KeyError::ChecksumMismatch);
        }

        let mut keys = Vec::new();
        let mut keys_rdr = Cursor::new(read_vector(&mut rdr)?);
        while !at_end(&keys_rdr) {
            let group = keys_rdr.read_u16::<BE>()?;
            let key_exchange = read_vector(&mut keys_rdr)?;
            if key_exchange.is_empty() {
                return Err(KeyError::Invalid("empty key_exchange"));
            }
            keys.push(KeyShareEntry {
                group,
                key_exchange: key_exchange.to_vec(),
            });
        }
        if keys.is_empty() {
            return Err(KeyError::Invalid("no key shares"));
        }

        let suites = read_vector(&mut rdr)?;
        if suites.is_empty() || suites.len() % 2 != 0 {
            return Err(KeyError::Invalid("bad cipher_suites length"));
        }
        let cipher_suites = suites
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        let padded_length = rdr.read_u16::<BE>()?;
        let not_before = rdr.read_u64::<BE>()?;
        let not_after = rdr.read_u64::<BE>()?;

        let mut extensions = Vec::new();
        let mut ext_rdr = Cursor::new(read_vector(&mut rdr)?);
        while !at_end(&ext_rdr) {
            let ext_type = ext_rdr.read_u16::<BE>()?;
            let data = read_vector(&mut ext_rdr)?.to_vec();
            extensions.push(Extension { ext_type, data });
        }

        if !at_end(&rdr) {
            return Err(KeyError::Invalid("trailing bytes"));
        }

        Ok(Self {
            version,
            checksum,
            keys,
            cipher_suites,
            padded_length,
            not_before,
            not_after,
            extensions,
        })
    }

    /// Serializes with a freshly computed checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut keys = Vec::new();
        for key in &self.keys {
            put_u16(&mut keys, key.group);
            put_vector(&mut keys, &key.key_exchange);
        }
        let mut suites = Vec::new();
        for suite in &self.cipher_suites {
            put_u16(&mut suites, *suite);
        }
        let mut extensions = Vec::new();
        for ext in &self.extensions {
            put_u16(&mut extensions, ext.ext_type);
            put_vector(&mut extensions, &ext.data);
        }

        let mut bytes = Vec::new();
        put_u16(&mut bytes, self.version);
        bytes.extend_from_slice(&[0; CHECKSUM_LEN]);
        put_vector(&mut bytes, &keys);
        put_vector(&mut bytes, &suites);
        put_u16(&mut bytes, self.padded_length);
        bytes.extend_from_slice(&self.not_before.to_be_bytes());
        bytes.extend_from_slice(&self.not_after.to_be_bytes());
        put_vector(&mut bytes, &extensions);

        let checksum = compute_checksum(&bytes);
        bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN].copy_from_slice(&checksum);
        bytes
    }

    /// Whether `unix_secs` falls inside `[not_before, not_after]`.
    pub fn is_valid_at(&self, unix_secs: u64) -> bool {
        self.not_before <= unix_secs && unix_secs <= self.not_after
    }
}

/// First four bytes of SHA-256 over the structure with the checksum zeroed.
fn compute_checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(&bytes[..CHECKSUM_OFFSET]);
    hasher.update([0u8; CHECKSUM_LEN]);
    hasher.update(bytes.get(CHECKSUM_OFFSET + CHECKSUM_LEN..).unwrap_or_default());
    let digest = hasher.finalize();

    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&digest[..CHECKSUM_LEN]);
    checksum
}

fn read_vector<'a>(rdr: &mut Cursor<&'a [u8]>) -> Result<&'a [u8]> {
    let len = rdr.read_u16::<BE>()? as usize;
    let data: &'a [u8] = *rdr.get_ref();
    let start = rdr.position() as usize;
    let vector = data
        .get(start..start + len)
        .ok_or(KeyError::Invalid("vector runs past end of data"))?;
    rdr.set_position((start + len) as u64);
    Ok(vector)
}

fn at_end(rdr: &Cursor<&[u8]>) -> bool {
    rdr.position() as usize >= rdr.get_ref().len()
}

fn put_u16(bytes: &mut Vec<u8>, v: u16) {
    // Vec<u8> writes are infallible
    let _ = bytes.write_u16::<BE>(v);
}

fn put_vector(bytes: &mut Vec<u8>, data: &[u8]) {
    put_u16(bytes, data.len() as u16);
    bytes.extend_from_slice(data);
}
