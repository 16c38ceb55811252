use bytes::{Buf, Bytes, BytesMut};

const LENGTH_PREFIX_LEN: usize = 2;

/// Accumulates stream reads and hands out one length-prefixed DNS message at
/// a time. Bytes past the first complete frame stay buffered for the next.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Pops the next complete frame, without its length prefix.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        if self.buf.len() < LENGTH_PREFIX_LEN {
            return None;
        }

        let declared = u16::from_be_bytes([self.buf[0], self.buf[1]]) as usize;
        if self.buf.len() < LENGTH_PREFIX_LEN + declared {
            return None;
        }

        self.buf.advance(LENGTH_PREFIX_LEN);
        Some(self.buf.split_to(declared).freeze())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_declared_length() {
        let mut frames = FrameBuffer::new();

        frames.extend(&[0]);
        assert!(frames.next_frame().is_none());
        frames.extend(&[3, 1, 2]);
        assert!(frames.next_frame().is_none());
        frames.extend(&[3]);

        assert_eq!(frames.next_frame().unwrap().as_ref(), [1, 2, 3]);
        assert!(frames.is_empty());
    }

    #[test]
    fn keeps_remainder_for_next_frame() {
        let mut frames = FrameBuffer::new();
        frames.extend(&[0, 1, 9, 0, 2, 7]);

        assert_eq!(frames.next_frame().unwrap().as_ref(), [9]);
        assert!(frames.next_frame().is_none());
        assert_eq!(frames.len(), 3);

        frames.extend(&[8, 0, 0]);
        assert_eq!(frames.next_frame().unwrap().as_ref(), [7, 8]);
        assert_eq!(frames.next_frame().unwrap().len(), 0);
        assert!(frames.is_empty());
    }
}
