use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::object::{Kind, Object};
use crate::repo::Repo;

/// get the filesystem path an object is stored at
pub fn object_path(repo: &Repo, id: &ObjectId) -> PathBuf {
    let (dir, file) = id.to_path_components();
    repo.objects_path().join(dir).join(file)
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, id: &ObjectId) -> bool {
    object_path(repo, id).exists()
}

/// write an object to the store
///
/// the serialized form (`"<kind> <len>\0"` followed by the payload) is
/// deflated as a single zlib stream into a temp file, then renamed into
/// place. the rename is the commit point: a crash never leaves a partial
/// object at its final name, and an already-present object is a no-op.
pub fn write_object(repo: &Repo, obj: &Object) -> Result<ObjectId> {
    let id = obj.id();

    let (dir, file) = id.to_path_components();
    let obj_dir = repo.objects_path().join(&dir);
    let obj_path = obj_dir.join(&file);

    // deduplication: content addressing means an existing file is this object
    if obj_path.exists() {
        return Ok(id);
    }

    fs::create_dir_all(&obj_dir).with_path(&obj_dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&obj_dir).with_path(&obj_dir)?;
    {
        let mut encoder = ZlibEncoder::new(&mut tmp, Compression::default());
        encoder
            .write_all(format!("{} {}\0", obj.kind.as_str(), obj.payload.len()).as_bytes())
            .with_path(&obj_path)?;
        encoder.write_all(&obj.payload).with_path(&obj_path)?;
        encoder.finish().with_path(&obj_path)?;
    }
    tmp.as_file().sync_all().with_path(&obj_path)?;

    tmp.persist(&obj_path).map_err(|e| Error::Io {
        path: obj_path.clone(),
        source: e.error,
    })?;

    tracing::trace!(id = %id, kind = %obj.kind, "stored object");

    Ok(id)
}

/// read an object from the store
///
/// the payload is stream-inflated; the header length must match the number
/// of payload bytes actually present, and the content must hash back to the
/// id it was requested under.
pub fn read_object(repo: &Repo, id: &ObjectId) -> Result<Object> {
    let path = object_path(repo, id);

    let file = File::open(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*id)
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    let mut reader = BufReader::new(ZlibDecoder::new(file));

    // header runs up to the first NUL: "<kind> <len>\0"
    let mut header = Vec::new();
    reader.read_until(0, &mut header).with_path(&path)?;
    if header.pop() != Some(0) {
        return Err(corrupt(id, "missing header terminator"));
    }

    let header = std::str::from_utf8(&header).map_err(|_| corrupt(id, "header not utf-8"))?;
    let (kind_str, len_str) = header
        .split_once(' ')
        .ok_or_else(|| corrupt(id, "missing space in header"))?;

    let kind = Kind::from_str(kind_str)?;
    let len: usize = len_str
        .parse()
        .map_err(|_| corrupt(id, &format!("bad length: {len_str}")))?;

    let mut payload = Vec::with_capacity(len);
    reader.read_to_end(&mut payload).with_path(&path)?;
    if payload.len() != len {
        return Err(corrupt(
            id,
            &format!("length mismatch: header says {}, got {}", len, payload.len()),
        ));
    }

    let obj = Object::new(kind, payload);
    if obj.id() != *id {
        return Err(corrupt(id, "content does not hash to its address"));
    }

    Ok(obj)
}

fn corrupt(id: &ObjectId, reason: &str) -> Error {
    Error::CorruptObject {
        id: *id,
        reason: reason.to_string(),
    }
}
