use tracing::trace;

use crate::core::transport::Transport;
use crate::domain::error::{PromptComError, PromptComResult};

/// Read single bytes from `transport` until the accumulated buffer ends
/// with one of `terminators`.
///
/// Candidates are compared against the buffer's tail after every byte,
/// in declared order; the first exact suffix match wins and the call
/// returns `(matched_terminator, full_buffer)` on that byte. A match is
/// byte-for-byte over the candidate's full length, so a candidate found
/// at the tail of otherwise malformed noise still counts.
///
/// A read that yields no data within the transport's timeout ends the
/// scan with `PromptComError::Timeout`; no further reads are attempted
/// and the partial buffer is dropped.
///
/// At least one candidate is required and every candidate must be
/// non-empty; violating either is a caller bug.
pub fn read_until<'t>(
    transport: &mut dyn Transport,
    terminators: &[&'t [u8]],
) -> PromptComResult<(&'t [u8], Vec<u8>)> {
    assert!(!terminators.is_empty(), "at least one terminator required");
    for terminator in terminators {
        assert!(!terminator.is_empty(), "terminator must be non-empty");
    }

    let mut buffer = Vec::new();
    loop {
        match transport.read_byte()? {
            Some(byte) => {
                buffer.push(byte);
                for &terminator in terminators {
                    if buffer.ends_with(terminator) {
                        trace!(received = buffer.len(), "terminator matched");
                        return Ok((terminator, buffer));
                    }
                }
            }
            None => return Err(PromptComError::Timeout),
        }
    }
}
