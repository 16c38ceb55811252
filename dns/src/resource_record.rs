use crate::error::{Error, Result};
use crate::utils::read_name;
use byteorder::{ReadBytesExt, BE};
use std::io::Cursor;
use std::net::Ipv4Addr;

#[derive(Debug)]
pub struct ResourceRecord<'a> {
    domain: String,
    rtype: u16,
    rclass: u16,
    ttl: u32,
    rdata: &'a [u8],
}

impl<'a> ResourceRecord<'a> {
    pub fn parse_from_reader(rdr: &mut Cursor<&'a [u8]>) -> Result<Self> {
        let domain = read_name(rdr)?;
        let rtype = rdr.read_u16::<BE>()?;
        let rclass = rdr.read_u16::<BE>()?;
        let ttl = rdr.read_u32::<BE>()?;
        let rdlength = rdr.read_u16::<BE>()?;

        let message: &'a [u8] = *rdr.get_ref();
        let start = rdr.position() as usize;
        let end = start + rdlength as usize;
        let rdata = message.get(start..end).ok_or_else(|| {
            Error::Malformed(format!(
                "record {} declares {} bytes of data, {} available",
                domain,
                rdlength,
                message.len().saturating_sub(start)
            ))
        })?;
        rdr.set_position(end as u64);

        let record = Self {
            domain,
            rtype,
            rclass,
            ttl,
            rdata,
        };

        Ok(record)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn rtype(&self) -> u16 {
        self.rtype
    }

    pub fn rclass(&self) -> u16 {
        self.rclass
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// First character-string of a TXT record.
    pub fn txt(&self) -> Result<String> {
        let (&len, rest) = self
            .rdata
            .split_first()
            .ok_or_else(|| Error::Malformed("TXT record has no strings".to_string()))?;
        let text = rest
            .get(..len as usize)
            .ok_or_else(|| Error::Malformed("TXT string runs past record data".to_string()))?;

        String::from_utf8(text.to_vec())
            .map_err(|e| Error::Malformed(format!("TXT string is not UTF-8: {}", e)))
    }

    pub fn ipv4(&self) -> Result<Ipv4Addr> {
        let octets: [u8; 4] = self.rdata.try_into().map_err(|_| {
            Error::Malformed(format!("A record data is {} bytes", self.rdata.len()))
        })?;

        Ok(Ipv4Addr::from(octets))
    }
}
