use crate::error::{Error, Result};
use crate::header::Header;
use crate::question::Question;
use domain_name_query_types::NameQuery;

// Length prefix for DNS over a stream transport, RFC 1035 4.2.2 / RFC 7858.
pub const LENGTH_PREFIX_LEN: usize = 2;

pub struct RequestMessage {
    header: Header,
    question: Question,
}

impl RequestMessage {
    pub fn new(query: &NameQuery) -> Self {
        let header = Header::query(0);
        let question = Question::new(query);

        Self { header, question }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        self.header.to_bytes(bytes)?;
        self.question.to_bytes(bytes)?;

        Ok(())
    }

    /// Packs the message behind its 2-byte big-endian length.
    pub fn to_framed_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; LENGTH_PREFIX_LEN];
        self.to_bytes(&mut bytes)?;

        let len = bytes.len() - LENGTH_PREFIX_LEN;
        let prefix = u16::try_from(len).map_err(|_| Error::MessageTooLong(len))?;
        bytes[..LENGTH_PREFIX_LEN].copy_from_slice(&prefix.to_be_bytes());

        Ok(bytes)
    }
}
