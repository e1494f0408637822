use std::collections::HashMap;
use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::{sha1_digest, ObjectId};
use crate::object::{Kind, Object};
use crate::transport::delta::apply_delta;

/// in-memory index of parsed objects, keyed by id
///
/// owned by one clone operation; reference-deltas resolve their bases here.
pub type PackIndex = HashMap<ObjectId, Object>;

const PACK_MAGIC: &[u8] = b"PACK";
const PACK_VERSION: u32 = 2;
const HEADER_LEN: usize = 12;
const TRAILER_LEN: usize = 20;

// entry type tags as they appear in the header varint
const TYPE_COMMIT: u8 = 1;
const TYPE_TREE: u8 = 2;
const TYPE_BLOB: u8 = 3;
const TYPE_TAG: u8 = 4;
const TYPE_OFS_DELTA: u8 = 6;
const TYPE_REF_DELTA: u8 = 7;

/// parse a packfile into an object index
///
/// verifies the trailing SHA-1 over the whole stream before touching any
/// entry, then walks the declared number of entries. each entry's zlib
/// stream is consumed by a streaming inflater so the cursor lands exactly on
/// the next entry's first byte.
pub fn parse_pack(data: &[u8]) -> Result<PackIndex> {
    if data.len() < HEADER_LEN + TRAILER_LEN {
        return Err(Error::CorruptPack(format!(
            "too small: {} bytes",
            data.len()
        )));
    }

    if &data[..4] != PACK_MAGIC {
        return Err(Error::CorruptPack("bad magic".to_string()));
    }

    let version = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if version != PACK_VERSION {
        return Err(Error::CorruptPack(format!("unsupported version {version}")));
    }

    let count = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);

    let body_end = data.len() - TRAILER_LEN;
    let computed = sha1_digest(&data[..body_end]);
    if computed.as_bytes() != &data[body_end..] {
        return Err(Error::CorruptPack("trailer digest mismatch".to_string()));
    }

    let mut index = PackIndex::with_capacity(count as usize);
    let mut pos = HEADER_LEN;

    for _ in 0..count {
        if pos >= body_end {
            return Err(Error::CorruptPack("entries overrun trailer".to_string()));
        }
        let (tag, declared_len) = read_entry_header(data, &mut pos)?;

        let obj = match tag {
            TYPE_COMMIT | TYPE_TREE | TYPE_BLOB | TYPE_TAG => {
                let payload = inflate_entry(data, &mut pos)?;
                if payload.len() != declared_len {
                    return Err(Error::CorruptPack(format!(
                        "entry length mismatch: declared {declared_len}, inflated {}",
                        payload.len()
                    )));
                }
                let kind = match tag {
                    TYPE_COMMIT => Kind::Commit,
                    TYPE_TREE => Kind::Tree,
                    TYPE_BLOB => Kind::Blob,
                    _ => Kind::Tag,
                };
                Object::new(kind, payload)
            }

            TYPE_REF_DELTA => {
                if pos + 20 > body_end {
                    return Err(Error::CorruptPack("truncated delta base id".to_string()));
                }
                let base_id = ObjectId::from_slice(&data[pos..pos + 20])?;
                pos += 20;

                let delta = inflate_entry(data, &mut pos)?;
                if delta.len() != declared_len {
                    return Err(Error::CorruptPack(format!(
                        "delta length mismatch: declared {declared_len}, inflated {}",
                        delta.len()
                    )));
                }

                let (base_kind, payload) = {
                    let base = index
                        .get(&base_id)
                        .ok_or(Error::DeltaBaseMissing(base_id))?;
                    (base.kind, apply_delta(&base.payload, &delta)?)
                };
                Object::new(base_kind, payload)
            }

            TYPE_OFS_DELTA => return Err(Error::UnsupportedPack("offset-delta")),

            other => {
                return Err(Error::CorruptPack(format!("bad entry type {other}")));
            }
        };

        index.insert(obj.id(), obj);
    }

    if pos != body_end {
        return Err(Error::CorruptPack(format!(
            "{} stray bytes after last entry",
            body_end - pos
        )));
    }

    debug!(objects = index.len(), "parsed packfile");

    Ok(index)
}

/// read an entry header varint: 3-bit type tag plus a little-endian length
///
/// the first byte carries the tag in bits 4..6 and only 4 length bits;
/// continuation bytes contribute 7 bits each.
fn read_entry_header(data: &[u8], pos: &mut usize) -> Result<(u8, usize)> {
    let mut byte = next_byte(data, pos)?;
    let tag = (byte >> 4) & 0x7;
    let mut len = (byte & 0x0F) as usize;
    let mut shift = 4;

    while byte & 0x80 != 0 {
        byte = next_byte(data, pos)?;
        if shift >= usize::BITS {
            return Err(Error::CorruptPack("entry length varint too long".to_string()));
        }
        len |= ((byte & 0x7F) as usize) << shift;
        shift += 7;
    }

    Ok((tag, len))
}

/// inflate exactly one zlib stream starting at `pos`
///
/// the stream ends at its own terminator, not at any declared byte count;
/// the inflater reports how much compressed input it consumed and the cursor
/// advances by that amount.
fn inflate_entry(data: &[u8], pos: &mut usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(&data[*pos..]);
    let mut payload = Vec::new();
    decoder
        .read_to_end(&mut payload)
        .map_err(|e| Error::CorruptPack(format!("zlib stream: {e}")))?;
    *pos += decoder.total_in() as usize;
    Ok(payload)
}

fn next_byte(data: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *data
        .get(*pos)
        .ok_or_else(|| Error::CorruptPack("truncated entry header".to_string()))?;
    *pos += 1;
    Ok(byte)
}
