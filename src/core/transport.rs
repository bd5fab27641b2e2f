use crate::domain::error::PromptComResult;

/// A blocking byte-stream endpoint to the target device.
///
/// Implementations own exactly one underlying connection. Every call
/// blocks the calling thread until it completes or the connection's read
/// timeout expires. A read timeout is reported as "no data" rather than
/// an error so the caller decides what starvation means.
pub trait Transport: Send {
    /// Read a single byte. Returns `None` when the read timeout expired
    /// with no data available.
    fn read_byte(&mut self) -> PromptComResult<Option<u8>>;

    /// Read up to `buf.len()` bytes, returning the number actually read.
    /// A timeout with no data reads as zero bytes.
    fn read_chunk(&mut self, buf: &mut [u8]) -> PromptComResult<usize>;

    /// Write the whole buffer to the device.
    fn write_all(&mut self, data: &[u8]) -> PromptComResult<()>;

    /// Endpoint label for log messages.
    fn describe(&self) -> String;
}
