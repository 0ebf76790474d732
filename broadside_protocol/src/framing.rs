// Length-delimited message framing over TCP.
//
// Wire format: a 4-byte big-endian length prefix followed by a
// JSON-serialized message payload. Both `write_message` and `read_message`
// operate on raw `&[u8]` / `Vec<u8>` — the caller handles JSON separately,
// keeping this module format-agnostic.
//
// Because the prefix always describes exactly one payload, a payload that
// fails JSON parsing does not desync the stream: the next frame starts at a
// known offset, so the server can answer with an error and keep reading.

use std::io::{self, Read, Write};

/// Maximum allowed message size (64 KB). Protects against unbounded
/// allocation from malformed length prefixes. The largest real message is a
/// board snapshot, which is a few kilobytes of JSON.
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

/// Write a length-delimited message: 4-byte big-endian length, then payload.
pub fn write_message<W: Write>(writer: &mut W, msg: &[u8]) -> io::Result<()> {
    let len = msg.len();
    if len > MAX_MESSAGE_SIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("message too large: {len} bytes (max {MAX_MESSAGE_SIZE})"),
        ));
    }
    #[expect(clippy::cast_possible_truncation)]
    let len_bytes = (len as u32).to_be_bytes();
    writer.write_all(&len_bytes)?;
    writer.write_all(msg)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-delimited message: 4-byte big-endian length, then payload.
///
/// Returns `UnexpectedEof` if the stream closes cleanly before or during a
/// message. Returns `InvalidData` if the length exceeds `MAX_MESSAGE_SIZE`.
pub fn read_message<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large: {len} bytes (max {MAX_MESSAGE_SIZE})"),
        ));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
