use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use std::fmt;
use std::io::Cursor;

const FLAG_RD: u16 = 0x0100;
const RCODE_MASK: u16 = 0x000f;

// 12 bytes
#[derive(Debug)]
pub struct Header {
    id: u16,
    flags: u16,
    qdcount: u16, // always 1 for queries we send
    ancount: u16,
    nscount: u16,
    arcount: u16,
}

impl Header {
    /// Recursive query header: the resolver does the walk, we only ask once.
    pub fn query(id: u16) -> Self {
        Self {
            id,
            flags: FLAG_RD,
            qdcount: 1,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> std::io::Result<()> {
        bytes.write_u16::<BE>(self.id)?;
        bytes.write_u16::<BE>(self.flags)?;
        bytes.write_u16::<BE>(self.qdcount)?;
        bytes.write_u16::<BE>(self.ancount)?;
        bytes.write_u16::<BE>(self.nscount)?;
        bytes.write_u16::<BE>(self.arcount)?;

        Ok(())
    }

    pub fn parse_from_reader(rdr: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let id = rdr.read_u16::<BE>()?;
        let flags = rdr.read_u16::<BE>()?;
        let qdcount = rdr.read_u16::<BE>()?;
        let ancount = rdr.read_u16::<BE>()?;
        let nscount = rdr.read_u16::<BE>()?;
        let arcount = rdr.read_u16::<BE>()?;

        let h = Self {
            id,
            flags,
            qdcount,
            ancount,
            nscount,
            arcount,
        };

        Ok(h)
    }

    #[cfg(test)]
    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RD != 0
    }

    pub fn response_code(&self) -> ResponseCode {
        ResponseCode((self.flags & RCODE_MASK) as u8)
    }

    pub fn qd_count(&self) -> u16 {
        self.qdcount
    }

    pub fn answer_count(&self) -> u16 {
        self.ancount
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseCode(pub u8);

impl ResponseCode {
    pub const NO_ERROR: ResponseCode = ResponseCode(0);

    pub fn is_success(&self) -> bool {
        *self == Self::NO_ERROR
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.0 {
            0 => "NOERROR",
            1 => "FORMERR",
            2 => "SERVFAIL",
            3 => "NXDOMAIN",
            4 => "NOTIMP",
            5 => "REFUSED",
            n => return write!(f, "RCODE{}", n),
        };
        f.write_str(name)
    }
}
