use std::io::Read;

use crate::error::{Error, Result};

/// the flush packet: end-of-section marker with no payload
pub const FLUSH_PKT: &[u8] = b"0000";

/// encode one pkt-line frame: 4 hex digits of total length, then the line
pub fn pkt_line(line: &str) -> Vec<u8> {
    format!("{:04x}{}", line.len() + 4, line).into_bytes()
}

/// read the next pkt-line frame
///
/// returns `Ok(None)` for a flush packet, `Ok(Some(payload))` otherwise.
pub fn read_pkt_line<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut prefix = [0u8; 4];
    reader
        .read_exact(&mut prefix)
        .map_err(|_| Error::MalformedPktLine("short read on length prefix".to_string()))?;

    let prefix = std::str::from_utf8(&prefix)
        .map_err(|_| Error::MalformedPktLine("length prefix not ascii".to_string()))?;
    let frame_len = usize::from_str_radix(prefix, 16)
        .map_err(|_| Error::MalformedPktLine(format!("bad length prefix: {prefix}")))?;

    if frame_len == 0 {
        return Ok(None);
    }
    if frame_len < 4 {
        return Err(Error::MalformedPktLine(format!(
            "frame length {frame_len} below minimum"
        )));
    }

    let mut payload = vec![0u8; frame_len - 4];
    reader
        .read_exact(&mut payload)
        .map_err(|_| Error::MalformedPktLine("short read on payload".to_string()))?;

    Ok(Some(payload))
}
