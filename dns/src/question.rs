use crate::error::Result;
use crate::utils::{domain_to_qname, read_name};
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use domain_name_query_types::NameQuery;
use std::io::Cursor;

pub const CLASS_IN: u16 = 1;

#[derive(Debug)]
pub struct Question {
    domain: String,
    qtype: u16,
    qclass: u16,
}

impl Question {
    pub fn new(query: &NameQuery) -> Self {
        Self {
            domain: query.name.clone(),
            qtype: query.q_type.code(),
            qclass: CLASS_IN,
        }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        let qname = domain_to_qname(&self.domain)?;
        bytes.extend_from_slice(&qname);

        bytes.write_u16::<BE>(self.qtype)?;
        bytes.write_u16::<BE>(self.qclass)?;

        Ok(())
    }

    pub fn parse_from_reader(rdr: &mut Cursor<&[u8]>) -> Result<Self> {
        let domain = read_name(rdr)?;
        let qtype = rdr.read_u16::<BE>()?;
        let qclass = rdr.read_u16::<BE>()?;

        let q = Self {
            domain,
            qtype,
            qclass,
        };

        Ok(q)
    }

    #[cfg(test)]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[cfg(test)]
    pub fn qtype(&self) -> u16 {
        self.qtype
    }

    #[cfg(test)]
    pub fn qclass(&self) -> u16 {
        self.qclass
    }
}
