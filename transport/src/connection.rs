use crate::error::{Error, Result};
use crate::framing::FrameBuffer;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const READ_CHUNK_SIZE: usize = 4096;

/// One resolver connection carrying strictly sequential query/response
/// pairs. Responses are not matched by id, so only one query may be in
/// flight at a time.
pub struct DotConnection<S> {
    stream: S,
    frames: FrameBuffer,
}

impl<S> DotConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            frames: FrameBuffer::new(),
        }
    }

    /// Sends an already framed request and returns the next response body,
    /// length prefix stripped.
    pub async fn query(&mut self, request: &[u8]) -> Result<Bytes> {
        self.stream.write_all(request).await.map_err(Error::Write)?;
        self.stream.flush().await.map_err(Error::Write)?;
        debug!(request_len = request.len(), "query sent");

        let response = self.read_frame().await?;
        debug!(response_len = response.len(), "response received");

        Ok(response)
    }

    async fn read_frame(&mut self) -> Result<Bytes> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(frame) = self.frames.next_frame() {
                return Ok(frame);
            }

            let n = self.stream.read(&mut chunk).await.map_err(Error::Read)?;
            if n == 0 {
                return Err(Error::Closed {
                    buffered: self.frames.len(),
                });
            }
            self.frames.extend(&chunk[..n]);
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(Error::Shutdown)
    }
}
