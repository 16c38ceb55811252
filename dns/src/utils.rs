use crate::error::{Error, Result};
use byteorder::ReadBytesExt;
use std::io::Cursor;

// https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

const POINTER_MASK: u8 = 0xc0;
// Enough for any legal name; anything deeper is a pointer loop.
const MAX_POINTER_JUMPS: usize = 64;

/// Converts a fully-qualified name (`www.example.com.`) to its wire form.
pub fn domain_to_qname(domain: &str) -> Result<Vec<u8>> {
    let invalid = |reason| Error::InvalidName {
        name: domain.to_string(),
        reason,
    };

    let relative = domain
        .strip_suffix('.')
        .ok_or_else(|| invalid("name is not fully qualified"))?;

    let mut qname: Vec<u8> = Vec::with_capacity(domain.len() + 1);
    if !relative.is_empty() {
        for label in relative.split('.') {
            if label.is_empty() {
                return Err(invalid("empty label"));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(invalid("label exceeds 63 bytes"));
            }
            if !label
                .bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
            {
                return Err(invalid("invalid character in label"));
            }

            qname.push(label.len() as u8);
            qname.extend_from_slice(label.as_bytes());
        }
    }
    qname.push(0);

    if qname.len() > MAX_NAME_LEN {
        return Err(invalid("name exceeds 255 bytes"));
    }

    Ok(qname)
}

/// Reads a possibly compressed name starting at the cursor position and
/// leaves the cursor just past it. Returned names carry a trailing dot.
pub fn read_name(rdr: &mut Cursor<&[u8]>) -> Result<String> {
    let message: &[u8] = *rdr.get_ref();
    let mut labels: Vec<String> = Vec::new();
    let mut resume_at: Option<u64> = None;
    let mut jumps = 0;

    loop {
        let len = rdr.read_u8()?;

        if len & POINTER_MASK == POINTER_MASK {
            let low = rdr.read_u8()?;
            let offset = (u64::from(len & !POINTER_MASK) << 8) | u64::from(low);

            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return Err(Error::Malformed("name compression loop".to_string()));
            }
            if offset as usize >= message.len() {
                return Err(Error::Malformed(format!(
                    "compression pointer {} out of range",
                    offset
                )));
            }
            if resume_at.is_none() {
                resume_at = Some(rdr.position());
            }
            rdr.set_position(offset);
            continue;
        }
        if len & POINTER_MASK != 0 {
            return Err(Error::Malformed(format!("unsupported label type {:#x}", len)));
        }
        if len == 0 {
            break;
        }

        let start = rdr.position() as usize;
        let end = start + len as usize;
        let label = message
            .get(start..end)
            .ok_or_else(|| Error::Malformed("label runs past end of message".to_string()))?;
        labels.push(String::from_utf8_lossy(label).to_string());
        rdr.set_position(end as u64);
    }

    if let Some(pos) = resume_at {
        rdr.set_position(pos);
    }

    let mut name = labels.join(".");
    name.push('.');
    Ok(name)
}
